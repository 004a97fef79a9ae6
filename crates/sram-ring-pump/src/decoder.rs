//! The decoder seam of the playback loop.

use std::convert::Infallible;

/// Downstream consumer of pulled audio bytes, typically a hardware decoder
/// fed over its data bus.
pub trait Decoder {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Largest chunk accepted by one `decode` call.
    fn max_chunk(&self) -> usize;

    /// Feeds one chunk of at most `max_chunk()` bytes.
    fn decode(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Called once after the last chunk.
    fn finish(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Decoder that keeps every byte it is fed.
#[derive(Debug, Clone)]
pub struct CollectingDecoder {
    bytes: Vec<u8>,
    max_chunk: usize,
    chunks: u64,
    finished: bool,
}

impl CollectingDecoder {
    pub fn new(max_chunk: usize) -> Self {
        Self {
            bytes: Vec::new(),
            max_chunk,
            chunks: 0,
            finished: false,
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Number of `decode` calls.
    pub fn chunks(&self) -> u64 {
        self.chunks
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Decoder for CollectingDecoder {
    type Error = Infallible;

    fn max_chunk(&self) -> usize {
        self.max_chunk
    }

    fn decode(&mut self, data: &[u8]) -> Result<(), Infallible> {
        debug_assert!(data.len() <= self.max_chunk);
        self.bytes.extend_from_slice(data);
        self.chunks += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), Infallible> {
        self.finished = true;
        Ok(())
    }
}
