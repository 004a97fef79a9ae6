//! Loom-based concurrency tests for sram-ring.
//!
//! Run with: `cargo test --features loom --test loom_tests --release`
//!
//! Loom exhaustively explores all possible thread interleavings to find
//! concurrency bugs that might only occur under specific scheduling.

#![cfg(feature = "loom")]

use loom::sync::{Arc, Mutex};
use loom::thread;

/// Simplified model of the ring buffer's two-lock protocol.
///
/// `cursors` plays the state lock, `bus` plays the storage device behind the
/// bus lock. Capacity is tiny to keep loom's state space manageable.
struct LoomRing {
    /// (write, read)
    cursors: Mutex<(u32, u32)>,
    bus: Mutex<[u8; 4]>,
    capacity: u32,
}

impl LoomRing {
    fn new() -> Self {
        Self {
            cursors: Mutex::new((0, 0)),
            bus: Mutex::new([0; 4]),
            capacity: 4,
        }
    }

    fn mask(&self) -> u32 {
        self.capacity - 1
    }

    fn free(&self) -> u32 {
        let (write, read) = *self.cursors.lock().unwrap();
        self.capacity - write.wrapping_sub(read)
    }

    fn available(&self) -> u32 {
        let (write, read) = *self.cursors.lock().unwrap();
        write.wrapping_sub(read)
    }

    /// Producer: check and address under the state lock, transfer under the
    /// bus lock, publish under the state lock.
    fn push(&self, data: &[u8]) {
        let address = {
            let (write, read) = *self.cursors.lock().unwrap();
            assert!(data.len() as u32 <= self.capacity - write.wrapping_sub(read));
            write & self.mask()
        };

        {
            let mut bus = self.bus.lock().unwrap();
            for (i, &byte) in data.iter().enumerate() {
                bus[((address + i as u32) & self.mask()) as usize] = byte;
            }
        }

        let mut cursors = self.cursors.lock().unwrap();
        cursors.0 = cursors.0.wrapping_add(data.len() as u32);
        assert!(cursors.0.wrapping_sub(cursors.1) <= self.capacity);
    }

    /// Consumer: mirror image of `push`.
    fn pull(&self, out: &mut [u8]) {
        let address = {
            let (write, read) = *self.cursors.lock().unwrap();
            assert!(out.len() as u32 <= write.wrapping_sub(read));
            read & self.mask()
        };

        {
            let bus = self.bus.lock().unwrap();
            for (i, byte) in out.iter_mut().enumerate() {
                *byte = bus[((address + i as u32) & self.mask()) as usize];
            }
        }

        let mut cursors = self.cursors.lock().unwrap();
        cursors.1 = cursors.1.wrapping_add(out.len() as u32);
        assert!(cursors.0.wrapping_sub(cursors.1) <= self.capacity);
    }
}

/// Bytes arrive in order and never before they were written.
#[test]
fn loom_spsc_order() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());
        let ring2 = Arc::clone(&ring);

        let producer = thread::spawn(move || {
            ring2.push(&[1, 2]);
            ring2.push(&[3]);
        });

        let consumer = thread::spawn(move || {
            let mut received = Vec::new();
            for _ in 0..6 {
                let n = ring.available().min(2) as usize;
                if n > 0 {
                    let mut out = [0u8; 2];
                    ring.pull(&mut out[..n]);
                    received.extend_from_slice(&out[..n]);
                }
                if received.len() == 3 {
                    break;
                }
                thread::yield_now();
            }
            received
        });

        producer.join().unwrap();
        let received = consumer.join().unwrap();

        // Whatever prefix arrived must be in order
        let expected = [1u8, 2, 3];
        assert_eq!(&received[..], &expected[..received.len()]);
    });
}

/// The producer wraps over bytes only after the consumer released them.
#[test]
fn loom_wrap_does_not_clobber_unread() {
    loom::model(|| {
        let ring = Arc::new(LoomRing::new());
        ring.push(&[10, 11, 12]);

        let ring2 = Arc::clone(&ring);
        let producer = thread::spawn(move || {
            // Free space is 1 until the consumer pulls
            let n = ring2.free().min(3) as usize;
            let data = [20u8, 21, 22];
            ring2.push(&data[..n]);
            n
        });

        let consumer = thread::spawn(move || {
            let mut out = [0u8; 2];
            ring.pull(&mut out);
            out
        });

        let pushed = producer.join().unwrap();
        let pulled = consumer.join().unwrap();

        assert_eq!(pulled, [10, 11]);
        assert!(pushed == 1 || pushed == 3);
    });
}
