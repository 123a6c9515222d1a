//! # Repochat Vector Store
//!
//! Boundary between the analysis pipeline and an external vector index.
//!
//! ## Architecture
//!
//! ```text
//! AnnotatedDocument[]
//!     │
//!     ├──> Segmenter (per document)
//!     │      └─> Chunk[] with header + retrieval metadata
//!     │
//!     ├──> VectorIndex::add (one batch per document)
//!     │      └─> failures recorded in StoreReport, never fatal
//!     │
//!     └──> VectorIndex::similarity_search
//!            └─> top_k / similarity_threshold from SearchConfig
//! ```
//!
//! [`MemoryIndex`] is an in-process index over feature-hashed token vectors, enough to
//! run the whole pipeline without an external service.

mod config;
mod embedding;
mod error;
mod gateway;
mod index;
mod memory;
mod types;

pub use config::SearchConfig;
pub use embedding::{cosine_similarity, HashingEmbedder, DEFAULT_DIMENSION};
pub use error::{Result, VectorStoreError};
pub use gateway::VectorStoreGateway;
pub use index::VectorIndex;
pub use memory::MemoryIndex;
pub use types::{DocumentOutcome, SearchHit, SearchRequest, StoreOutcome, StoreReport};
