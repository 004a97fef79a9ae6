//! Shutdown signalling between the pump loops.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// A cloneable one-shot flag shared between threads.
///
/// Used two ways: as the stop request for [`Ingest`](crate::Ingest), which
/// stops at its next poll, and as [`Ingest::finished`](crate::Ingest::finished),
/// which tells [`Playback`](crate::Playback) that no more pushes will come.
///
/// Multiple clones of this handle can trigger shutdown - only the first
/// one has effect, subsequent calls are no-ops.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    initiated: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Triggers shutdown.
    pub fn shutdown(&self) {
        if !self.initiated.swap(true, Ordering::AcqRel) {
            debug!("pump shutdown initiated");
        }
    }

    /// Returns `true` if shutdown has been initiated.
    #[inline]
    pub fn is_shutdown(&self) -> bool {
        self.initiated.load(Ordering::Acquire)
    }
}

/// Raises the signal when dropped, unwinding included.
pub(crate) struct RaiseOnDrop<'a>(pub(crate) &'a ShutdownSignal);

impl Drop for RaiseOnDrop<'_> {
    fn drop(&mut self) {
        self.0.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shutdown_is_shared_and_idempotent() {
        let signal = ShutdownSignal::new();
        let clone = signal.clone();
        assert!(!signal.is_shutdown());

        clone.shutdown();
        assert!(signal.is_shutdown());

        signal.shutdown();
        assert!(clone.is_shutdown());
    }

    #[test]
    fn test_raise_on_drop_fires_during_unwind() {
        let signal = ShutdownSignal::new();
        let guarded = signal.clone();
        let result = std::panic::catch_unwind(move || {
            let _raise = RaiseOnDrop(&guarded);
            panic!("source failed");
        });
        assert!(result.is_err());
        assert!(signal.is_shutdown());
    }
}
