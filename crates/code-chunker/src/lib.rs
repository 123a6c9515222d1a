//! # Repochat Code Chunker
//!
//! Boundary-aware, overlapping segmentation of file content for embedding and retrieval.
//!
//! ## Algorithm
//!
//! Sizes are budgets in tokens, approximated at four characters per token.
//!
//! ```text
//! content
//!     │
//!     ├──> len/4 ≤ chunk_size ──> one chunk (1/1)
//!     │
//!     └──> while remaining ≥ chunk_size*4
//!          ├─> window = [target − chunk_overlap*4, target]
//!          ├─> last "\n}" | ";\n" | "\n\n" | "\n" | ". " in window (priority order)
//!          │     └─ none found → hard cut at target
//!          ├─> emit slice up to the cut
//!          └─> restart at cut − chunk_overlap*4 (the overlap)
//!          then flush the remainder as the final chunk
//! ```
//!
//! Every chunk is wrapped in a header block (file, position, package, classes, methods)
//! that is part of the embedded text.
//!
//! ## Example
//!
//! ```rust
//! use repochat_code_chunker::{Segmenter, SegmenterConfig};
//!
//! let segmenter = Segmenter::new(SegmenterConfig { chunk_size: 10, chunk_overlap: 2 }).unwrap();
//! let spans = segmenter.split(&"fn a();\n".repeat(20));
//!
//! assert!(spans.len() > 1);
//! assert_eq!(spans[0].end, 40);
//! ```

mod chunker;
mod config;
mod error;
mod types;

pub use chunker::{Segmenter, Span, BOUNDARY_MARKERS};
pub use config::{SegmenterConfig, CHARS_PER_TOKEN};
pub use error::{ChunkerError, Result};
pub use types::{Chunk, ChunkMetadata};
