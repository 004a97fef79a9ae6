//! Configuration for the ingest and playback loops.

use std::time::Duration;

/// Configuration for pump loop behavior.
#[derive(Debug, Clone)]
pub struct PumpConfig {
    /// Sleep between polls once spinning and yielding found no work.
    ///
    /// Default: 1ms
    pub poll_interval: Duration,

    /// Largest chunk the ingest loop pushes in one transfer.
    ///
    /// Further capped by the storage device's own transfer limit.
    ///
    /// Default: 2048 (SPI DMA limit)
    pub max_transfer: usize,

    /// Largest chunk the playback loop hands to the decoder.
    ///
    /// Further capped by the decoder's `max_chunk()`.
    ///
    /// Default: 32 (decoder FIFO)
    pub decode_chunk: usize,
}

impl Default for PumpConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1),
            max_transfer: 2048,
            decode_chunk: 32,
        }
    }
}

impl PumpConfig {
    /// Creates a low-latency configuration with a shorter poll interval and
    /// smaller transfers.
    pub fn low_latency() -> Self {
        Self {
            poll_interval: Duration::from_micros(100),
            max_transfer: 512,
            decode_chunk: 32,
        }
    }

    /// Creates a high-throughput configuration with larger decoder chunks.
    pub fn high_throughput() -> Self {
        Self {
            poll_interval: Duration::from_millis(5),
            max_transfer: 2048,
            decode_chunk: 512,
        }
    }

    /// Sets the poll interval.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Sets the ingest transfer size.
    pub fn with_max_transfer(mut self, max_transfer: usize) -> Self {
        self.max_transfer = max_transfer;
        self
    }

    /// Sets the decoder chunk size.
    pub fn with_decode_chunk(mut self, decode_chunk: usize) -> Self {
        self.decode_chunk = decode_chunk;
        self
    }
}
