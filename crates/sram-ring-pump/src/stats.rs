//! Periodic buffer statistics.

use sram_ring::{Metrics, RingBuffer, StorageDevice};
use tracing::info;

/// Logs buffer counters and their change since the previous sample.
#[derive(Debug, Default)]
pub struct StatsSampler {
    previous: Metrics,
}

impl StatsSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot, logs it, and returns the delta since the last call.
    pub fn sample<S: StorageDevice>(&mut self, ring: &RingBuffer<S>) -> Metrics {
        let now = ring.metrics();
        let delta = now.delta(&self.previous);
        info!(
            push_count = now.push_operations,
            push_count_delta = delta.push_operations,
            push_bytes = now.bytes_pushed,
            push_bytes_delta = delta.bytes_pushed,
            pull_count = now.pull_operations,
            pull_count_delta = delta.pull_operations,
            pull_bytes = now.bytes_pulled,
            pull_bytes_delta = delta.bytes_pulled,
            usage = now.available,
            usage_percent = now.usage_percent(),
            "ring buffer statistics"
        );
        self.previous = now;
        delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sram_ring::SMALL_CONFIG;
    use std::io;
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::fmt::MakeWriter;

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = Captured;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn test_sample_reports_deltas() {
        let ring = RingBuffer::open(&SMALL_CONFIG).unwrap();
        let mut sampler = StatsSampler::new();

        ring.push(&[0u8; 64]).unwrap();
        let d = sampler.sample(&ring);
        assert_eq!(d.push_operations, 1);
        assert_eq!(d.bytes_pushed, 64);
        assert_eq!(d.available, 64);

        let mut out = [0u8; 32];
        ring.pull(32, &mut out).unwrap();
        ring.push(&[0u8; 8]).unwrap();
        let d = sampler.sample(&ring);
        assert_eq!(d.push_operations, 1);
        assert_eq!(d.bytes_pushed, 8);
        assert_eq!(d.pull_operations, 1);
        assert_eq!(d.bytes_pulled, 32);
    }

    #[test]
    fn test_sample_logs_cumulative_bytes_and_deltas() {
        let ring = RingBuffer::open(&SMALL_CONFIG).unwrap();
        let mut sampler = StatsSampler::new();
        ring.push(&[0u8; 100]).unwrap();
        sampler.sample(&ring);

        let mut out = [0u8; 40];
        ring.pull(40, &mut out).unwrap();
        ring.push(&[0u8; 20]).unwrap();

        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(captured.clone())
            .with_ansi(false)
            .finish();
        tracing::subscriber::with_default(subscriber, || sampler.sample(&ring));

        let line = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        assert!(line.contains("push_bytes=120"), "{line}");
        assert!(line.contains("push_bytes_delta=20"), "{line}");
        assert!(line.contains("pull_bytes=40"), "{line}");
        assert!(line.contains("pull_bytes_delta=40"), "{line}");
        assert!(line.contains("usage_percent=31"), "{line}");
    }
}
