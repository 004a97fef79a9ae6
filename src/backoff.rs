use std::hint;
use std::thread;
use std::time::Duration;

/// Polling backoff for callers waiting on free space or buffered data.
///
/// Progressively increases wait time: spin with PAUSE → yield to OS → sleep
/// for the poll interval. The ring buffer never waits internally; producer and
/// consumer loops own this policy.
#[derive(Debug)]
pub struct Backoff {
    step: u32,
    poll_interval: Duration,
}

impl Backoff {
    const SPIN_LIMIT: u32 = 6; // 2^6 = 64 spins max before yielding
    const YIELD_LIMIT: u32 = 10; // Then sleep

    /// Creates a backoff that sleeps 1 ms once spinning and yielding are exhausted.
    #[inline]
    pub fn new() -> Self {
        Self::with_poll_interval(Duration::from_millis(1))
    }

    /// Creates a backoff with a custom sleep interval.
    #[inline]
    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            step: 0,
            poll_interval,
        }
    }

    /// Light spin with PAUSE hints.
    #[inline]
    pub fn spin(&mut self) {
        let spins = 1 << self.step.min(Self::SPIN_LIMIT);
        for _ in 0..spins {
            hint::spin_loop();
        }
        if self.step <= Self::SPIN_LIMIT {
            self.step += 1;
        }
    }

    /// Wait once: spin, then yield, then sleep the poll interval.
    #[inline]
    pub fn snooze(&mut self) {
        if self.step <= Self::SPIN_LIMIT {
            self.spin();
        } else if self.step <= Self::YIELD_LIMIT {
            thread::yield_now();
            self.step += 1;
        } else {
            thread::sleep(self.poll_interval);
        }
    }

    /// Check if we've moved on to sleeping.
    #[inline]
    pub fn is_sleeping(&self) -> bool {
        self.step > Self::YIELD_LIMIT
    }

    /// Reset after progress was made.
    #[inline]
    pub fn reset(&mut self) {
        self.step = 0;
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_progression() {
        let mut b = Backoff::with_poll_interval(Duration::from_micros(10));

        // Should start at step 0
        assert_eq!(b.step, 0);

        // Spin should increment
        b.spin();
        assert!(b.step > 0);

        // Should eventually sleep
        while !b.is_sleeping() {
            b.snooze();
        }
        assert!(b.step > Backoff::YIELD_LIMIT);

        // Sleeping does not advance further
        let step = b.step;
        b.snooze();
        assert_eq!(b.step, step);

        // Reset
        b.reset();
        assert_eq!(b.step, 0);
        assert!(!b.is_sleeping());
    }
}
