//! Destination for received audio bytes.

use std::sync::atomic::{AtomicU64, Ordering};

/// Consumer of the encoded audio received by the HTTP engine.
///
/// Decoding and device output live behind this trait. Called from the
/// engine's network task; implementations must not block.
pub trait AudioOutput: Send + Sync {
    fn write(&self, chunk: &[u8]);

    /// A new stream starts; drop anything buffered for the previous one.
    fn reset(&self) {}
}

/// Output that throws audio away and counts it.
#[derive(Debug, Default)]
pub struct DiscardOutput {
    bytes: AtomicU64,
}

impl DiscardOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes.load(Ordering::Relaxed)
    }
}

impl AudioOutput for DiscardOutput {
    fn write(&self, chunk: &[u8]) {
        self.bytes.fetch_add(chunk.len() as u64, Ordering::Relaxed);
    }

    fn reset(&self) {
        self.bytes.store(0, Ordering::Relaxed);
    }
}
