//! Producer and consumer loops for an [`sram_ring::RingBuffer`].
//!
//! The buffer sits between a bursty byte source (a network or file reader
//! pushing up to one DMA transfer at a time) and a decoder that accepts small
//! fixed-size chunks. This crate provides both sides:
//!
//! - [`Ingest`] reads the source and pushes at most `free()` bytes per step
//! - [`Playback`] pulls at most `available()` bytes per step into a [`Decoder`]
//! - [`spawn_pipeline`] runs both on named threads
//! - [`StatsSampler`] logs per-interval buffer statistics
//!
//! # Example
//!
//! ```
//! use sram_ring::{RingBuffer, SMALL_CONFIG};
//! use sram_ring_pump::{spawn_pipeline, CollectingDecoder, PumpConfig};
//! use std::io::Cursor;
//! use std::sync::Arc;
//!
//! let ring = Arc::new(RingBuffer::open(&SMALL_CONFIG).unwrap());
//! let clip: Vec<u8> = (0..4096u32).map(|i| i as u8).collect();
//!
//! let pipeline = spawn_pipeline(
//!     ring,
//!     Cursor::new(clip.clone()),
//!     CollectingDecoder::new(32),
//!     PumpConfig::default(),
//! )
//! .unwrap();
//!
//! let report = pipeline.join().unwrap();
//! assert_eq!(report.decoder.bytes(), &clip[..]);
//! ```

mod config;
mod decoder;
mod error;
mod ingest;
mod pipeline;
mod playback;
mod shutdown;
mod stats;

pub use config::PumpConfig;
pub use decoder::{CollectingDecoder, Decoder};
pub use error::PumpError;
pub use ingest::Ingest;
pub use pipeline::{spawn_pipeline, Pipeline, PipelineReport};
pub use playback::Playback;
pub use shutdown::ShutdownSignal;
pub use stats::StatsSampler;
