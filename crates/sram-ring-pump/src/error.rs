//! Error types for pump loops.

use sram_ring::RingError;
use std::error::Error;
use std::io;
use thiserror::Error;

type BoxError = Box<dyn Error + Send + Sync + 'static>;

/// Errors that stop an ingest or playback loop.
#[derive(Debug, Error)]
pub enum PumpError {
    /// The ring buffer's storage device failed a transaction.
    ///
    /// The buffer must be reset before it is used again.
    #[error("ring buffer: {0}")]
    Ring(BoxError),

    /// Reading the ingest source failed.
    #[error("source read failed: {0}")]
    Source(#[from] io::Error),

    /// The decoder rejected a chunk.
    #[error("decoder failed: {0}")]
    Decoder(BoxError),

    /// A pump thread panicked.
    #[error("{0} thread panicked")]
    Panicked(&'static str),
}

impl<E> From<RingError<E>> for PumpError
where
    E: Error + Send + Sync + 'static,
{
    fn from(err: RingError<E>) -> Self {
        Self::Ring(Box::new(err))
    }
}

impl PumpError {
    /// Returns `true` if the ring buffer needs a `reset()` before reuse.
    #[inline]
    pub fn needs_reset(&self) -> bool {
        matches!(self, Self::Ring(_))
    }
}
