//! Runs ingest and playback on their own threads over a shared buffer.

use crate::{Decoder, Ingest, Playback, PumpConfig, PumpError, ShutdownSignal};
use sram_ring::{Metrics, RingBuffer, StorageDevice};
use std::io::{self, Read};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::info;

/// Outcome of a completed pipeline.
#[derive(Debug)]
pub struct PipelineReport<D> {
    pub pushed: u64,
    pub decoded: u64,
    pub decoder: D,
    pub metrics: Metrics,
}

/// Handle to a running pipeline.
///
/// Ingest runs until end of source or [`Pipeline::shutdown`]. Playback then
/// drains what is left in the buffer and finishes the decoder.
pub struct Pipeline<S, D> {
    ring: Arc<RingBuffer<S>>,
    shutdown: ShutdownSignal,
    ingest: JoinHandle<Result<u64, PumpError>>,
    playback: JoinHandle<Result<(u64, D), PumpError>>,
}

/// Spawns the `ingest` and `playback` threads.
pub fn spawn_pipeline<S, R, D>(
    ring: Arc<RingBuffer<S>>,
    source: R,
    mut decoder: D,
    config: PumpConfig,
) -> io::Result<Pipeline<S, D>>
where
    S: StorageDevice + Send + 'static,
    R: Read + Send + 'static,
    D: Decoder + Send + 'static,
{
    let shutdown = ShutdownSignal::new();
    let ingest = Ingest::new(Arc::clone(&ring), config.clone(), shutdown.clone());
    // Raised by `Ingest::run` on return or unwind, after its last push.
    let ingest_finished = ingest.finished();

    let ingest = thread::Builder::new()
        .name("ingest".into())
        .spawn(move || ingest.run(source))?;

    let playback = Playback::new(Arc::clone(&ring), config, ingest_finished);
    let playback = match thread::Builder::new()
        .name("playback".into())
        .spawn(move || playback.run(&mut decoder).map(|decoded| (decoded, decoder)))
    {
        Ok(handle) => handle,
        Err(e) => {
            shutdown.shutdown();
            let _ = ingest.join();
            return Err(e);
        }
    };

    info!(capacity = ring.capacity(), "pipeline started");
    Ok(Pipeline {
        ring,
        shutdown,
        ingest,
        playback,
    })
}

impl<S: StorageDevice, D> Pipeline<S, D> {
    /// Stops ingest. Playback drains the buffer and exits.
    pub fn shutdown(&self) {
        self.shutdown.shutdown();
    }

    /// Returns a clone of the signal that stops ingest.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn ring(&self) -> &Arc<RingBuffer<S>> {
        &self.ring
    }

    /// Returns `true` once both threads have exited.
    pub fn is_finished(&self) -> bool {
        self.ingest.is_finished() && self.playback.is_finished()
    }

    /// Waits for both threads.
    ///
    /// An ingest error is reported ahead of a playback error. A failing
    /// playback thread stops ingest so the join cannot hang on a full buffer.
    pub fn join(self) -> Result<PipelineReport<D>, PumpError> {
        let playback = self
            .playback
            .join()
            .map_err(|_| PumpError::Panicked("playback"));
        if !matches!(playback, Ok(Ok(_))) {
            self.shutdown.shutdown();
        }

        let pushed = self
            .ingest
            .join()
            .map_err(|_| PumpError::Panicked("ingest"))??;
        let (decoded, decoder) = playback??;

        let metrics = self.ring.metrics();
        info!(pushed, decoded, "pipeline finished");
        Ok(PipelineReport {
            pushed,
            decoded,
            decoder,
            metrics,
        })
    }
}
