use crate::error::{ChunkerError, Result};
use serde::{Deserialize, Serialize};

/// Characters per token in the size approximation
pub const CHARS_PER_TOKEN: usize = 4;

/// Configuration for chunk segmentation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmenterConfig {
    /// Target chunk size in tokens
    pub chunk_size: usize,

    /// Overlap between consecutive chunks in tokens; also the boundary search window
    pub chunk_overlap: usize,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            chunk_size: 6000,
            chunk_overlap: 500,
        }
    }
}

impl SegmenterConfig {
    /// Chunk threshold in characters
    #[must_use]
    pub const fn chunk_chars(&self) -> usize {
        self.chunk_size * CHARS_PER_TOKEN
    }

    /// Overlap window in characters
    #[must_use]
    pub const fn overlap_chars(&self) -> usize {
        self.chunk_overlap * CHARS_PER_TOKEN
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ChunkerError::invalid_config("chunk_size must be > 0"));
        }

        // Each cut must consume more than the retained overlap
        if self.chunk_size < self.chunk_overlap.saturating_mul(2) {
            return Err(ChunkerError::invalid_config(format!(
                "chunk_size ({}) must be at least twice chunk_overlap ({})",
                self.chunk_size, self.chunk_overlap
            )));
        }

        Ok(())
    }
}
