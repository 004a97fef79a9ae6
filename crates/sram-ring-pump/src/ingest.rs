//! Producer loop: moves bytes from a source into the ring buffer.

use crate::shutdown::RaiseOnDrop;
use crate::{PumpConfig, PumpError, ShutdownSignal};
use sram_ring::{Backoff, RingBuffer, StorageDevice};
use std::io::{self, Cursor, Read};
use std::sync::Arc;
use tracing::{debug, info};

/// Pushes source bytes into the ring buffer, never more than `free()` at a
/// time, polling while the buffer is full.
///
/// `shutdown` stops the loop. The [`finished`](Ingest::finished) signal is
/// raised once `run` or `run_repeat` has returned (or unwound), after the
/// last push completed; it is the signal to hand to [`Playback`](crate::Playback).
pub struct Ingest<S> {
    ring: Arc<RingBuffer<S>>,
    shutdown: ShutdownSignal,
    finished: ShutdownSignal,
    transfer: usize,
    config: PumpConfig,
}

impl<S: StorageDevice> Ingest<S> {
    pub fn new(ring: Arc<RingBuffer<S>>, config: PumpConfig, shutdown: ShutdownSignal) -> Self {
        let device_max = ring.with_storage(|device| device.max_transfer()) as usize;
        let transfer = config.max_transfer.min(device_max).max(1);
        Self {
            ring,
            shutdown,
            finished: ShutdownSignal::new(),
            transfer,
            config,
        }
    }

    /// Bytes moved per push at most.
    pub fn transfer(&self) -> usize {
        self.transfer
    }

    /// Raised when this producer will push no more.
    pub fn finished(&self) -> ShutdownSignal {
        self.finished.clone()
    }

    /// Runs until `source` reaches end of input or shutdown is signalled.
    ///
    /// Returns the number of bytes pushed.
    pub fn run<R: Read>(&self, source: R) -> Result<u64, PumpError> {
        let _finished = RaiseOnDrop(&self.finished);
        self.pump(source)
    }

    /// Pushes `clip` over and over until shutdown is signalled.
    ///
    /// An empty clip returns immediately.
    pub fn run_repeat(&self, clip: &[u8]) -> Result<u64, PumpError> {
        let _finished = RaiseOnDrop(&self.finished);
        let mut pushed = 0u64;
        if clip.is_empty() {
            return Ok(pushed);
        }
        while !self.shutdown.is_shutdown() {
            pushed += self.pump(Cursor::new(clip))?;
        }
        info!(pushed, "repeat ingest stopped");
        Ok(pushed)
    }

    fn pump<R: Read>(&self, mut source: R) -> Result<u64, PumpError> {
        let mut scratch = vec![0u8; self.transfer];
        let mut backoff = Backoff::with_poll_interval(self.config.poll_interval);
        let mut pushed = 0u64;

        loop {
            if self.shutdown.is_shutdown() {
                debug!(pushed, "ingest stopped by shutdown");
                return Ok(pushed);
            }

            let room = self.transfer.min(self.ring.free() as usize);
            if room == 0 {
                backoff.snooze();
                continue;
            }

            let n = match source.read(&mut scratch[..room]) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };

            self.ring.push(&scratch[..n])?;
            pushed += n as u64;
            backoff.reset();
        }

        info!(pushed, "ingest reached end of source");
        Ok(pushed)
    }
}
