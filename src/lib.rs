//! sram-ring - SPSC Byte Ring Buffer over External Serial SRAM
//!
//! A single-producer single-consumer byte ring buffer whose bytes live in an
//! external serial memory chip (23LC1024 and similar) instead of local RAM.
//! Built for audio streaming firmware: an ingest task pushes compressed audio,
//! a playback task pulls it and feeds a hardware decoder.
//!
//! # Key Features
//!
//! - Unbounded u32 cursors: `write - read` is the buffered count, no full/empty
//!   ambiguity, no reserved slot
//! - Power-of-two capacity: storage address is `cursor & mask`
//! - One bus transaction per push/pull, wrap-around carried by the device's
//!   sequential mode
//! - Short-hold cursor lock separate from the bus lock: status queries never
//!   wait on storage I/O
//! - Usage counters for observability
//!
//! # Example
//!
//! ```
//! use sram_ring::{RingBuffer, SMALL_CONFIG};
//!
//! let ring = RingBuffer::open(&SMALL_CONFIG).unwrap();
//!
//! // Producer: check free space, then push
//! let chunk = [1u8, 2, 3, 4];
//! if ring.free() as usize >= chunk.len() {
//!     ring.push(&chunk).unwrap();
//! }
//!
//! // Consumer: check available, then pull
//! let mut out = [0u8; 4];
//! let n = ring.available().min(4);
//! ring.pull(n, &mut out).unwrap();
//! assert_eq!(out, chunk);
//! ```

mod backoff;
mod config;
mod error;
mod invariants;
mod memory;
mod metrics;
mod ring;
pub mod storage;

pub use backoff::Backoff;
pub use config::{Config, SMALL_CONFIG, SRAM_23LC1024_CONFIG};
pub use error::{RingError, StorageError};
pub use memory::MemoryDevice;
pub use metrics::Metrics;
pub use ring::RingBuffer;
pub use storage::{StorageConfig, StorageDevice, TransferMode};
