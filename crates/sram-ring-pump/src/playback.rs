//! Consumer loop: moves bytes from the ring buffer into a decoder.

use crate::{Decoder, PumpConfig, PumpError, ShutdownSignal};
use sram_ring::{Backoff, RingBuffer, StorageDevice};
use std::sync::Arc;
use tracing::{debug, info};

/// Pulls buffered bytes in decoder-sized chunks, never more than
/// `available()` at a time, polling while the buffer is empty.
///
/// The loop ends once `ingest_finished` is raised and the buffer is empty.
/// That signal must only be raised after the producer's last push has
/// returned, otherwise bytes still on the bus are left behind. Pass
/// [`Ingest::finished`](crate::Ingest::finished), not the producer's stop
/// request.
pub struct Playback<S> {
    ring: Arc<RingBuffer<S>>,
    ingest_finished: ShutdownSignal,
    config: PumpConfig,
}

impl<S: StorageDevice> Playback<S> {
    pub fn new(
        ring: Arc<RingBuffer<S>>,
        config: PumpConfig,
        ingest_finished: ShutdownSignal,
    ) -> Self {
        Self {
            ring,
            ingest_finished,
            config,
        }
    }

    /// Feeds `decoder` until the producer has finished and the buffer is
    /// drained, then calls `finish`. Returns the number of bytes decoded.
    ///
    /// A `decode_chunk` of zero is treated as one byte.
    ///
    /// # Panics
    ///
    /// If `decoder.max_chunk()` is zero.
    pub fn run<D: Decoder>(&self, decoder: &mut D) -> Result<u64, PumpError> {
        let max_chunk = decoder.max_chunk();
        assert!(max_chunk > 0, "decoder max_chunk must be non-zero");

        let device_max = self.ring.with_storage(|device| device.max_transfer()) as usize;
        let chunk_len = self
            .config
            .decode_chunk
            .max(1)
            .min(max_chunk)
            .min(device_max);

        let chunk_cap = u32::try_from(chunk_len).unwrap_or(u32::MAX);
        let mut chunk = vec![0u8; chunk_len];
        let mut backoff = Backoff::with_poll_interval(self.config.poll_interval);
        let mut decoded = 0u64;

        loop {
            let available = self.ring.available();
            if available == 0 {
                // Emptiness is re-read after the flag so a push that completed
                // before it was raised is still drained.
                if self.ingest_finished.is_shutdown() && self.ring.is_empty() {
                    break;
                }
                backoff.snooze();
                continue;
            }

            let n = available.min(chunk_cap);
            self.ring.pull(n, &mut chunk)?;
            decoder
                .decode(&chunk[..n as usize])
                .map_err(|e| PumpError::Decoder(Box::new(e)))?;
            decoded += u64::from(n);
            backoff.reset();
        }

        decoder
            .finish()
            .map_err(|e| PumpError::Decoder(Box::new(e)))?;
        debug!(chunk_len, "playback drained");
        info!(decoded, "playback finished");
        Ok(decoded)
    }
}
