/// Snapshot of a ring buffer's usage counters.
///
/// Counters are cumulative since `begin()` or the last `reset()`. They are
/// for observation only; the push/pull protocol never reads them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Metrics {
    pub bytes_pushed: u64,
    pub bytes_pulled: u64,
    pub push_operations: u64,
    pub pull_operations: u64,
    /// Bytes buffered when the snapshot was taken.
    pub available: u32,
    pub capacity: u32,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Buffer fill level, 0–100.
    pub fn usage_percent(&self) -> u32 {
        if self.capacity == 0 {
            return 0;
        }
        (u64::from(self.available) * 100 / u64::from(self.capacity)) as u32
    }

    /// Counter increments since `previous`; `available` and `capacity` are
    /// taken from `self`.
    ///
    /// A `reset()` between the two snapshots makes the counters go backwards;
    /// the difference then wraps, so callers sampling across a reset should
    /// start over from a fresh snapshot.
    pub fn delta(&self, previous: &Metrics) -> Metrics {
        Metrics {
            bytes_pushed: self.bytes_pushed.wrapping_sub(previous.bytes_pushed),
            bytes_pulled: self.bytes_pulled.wrapping_sub(previous.bytes_pulled),
            push_operations: self.push_operations.wrapping_sub(previous.push_operations),
            pull_operations: self.pull_operations.wrapping_sub(previous.pull_operations),
            available: self.available,
            capacity: self.capacity,
        }
    }
}
