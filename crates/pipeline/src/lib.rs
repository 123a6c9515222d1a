//! # Repochat Pipeline
//!
//! Runs repository analyses and answers questions over the stored code.
//!
//! ## Architecture
//!
//! ```text
//! trigger(repository_id)
//!     │
//!     ├──> Registry::begin (rejects overlapping runs per id)
//!     │
//!     ├──> FETCHING_FILES          RepositoryClient::fetch_files        → 20
//!     ├──> PARSING_AST             Extractor::extract_all_until          → 40
//!     ├──> ANALYZING_DEPENDENCIES  GraphBuilder::build (graph retained)  → 60
//!     ├──> STORING_VECTORS         VectorStoreGateway::store_documents   → 100
//!     │
//!     └──> COMPLETED, or error recorded at the failing step
//!
//! chat(query)
//!     └──> semantic_search → system prompt with context → AnswerGenerator
//! ```
//!
//! Every stage runs under a deadline and the run's cancellation token. Status is
//! published through a `tokio::sync::watch` channel per run.
//!
//! ## Example
//!
//! ```no_run
//! use repochat_pipeline::{FileSystemRepository, Orchestrator, PipelineConfig};
//! use repochat_vector_store::MemoryIndex;
//! use std::sync::Arc;
//!
//! # async fn example() -> repochat_pipeline::Result<()> {
//! let config = PipelineConfig::default();
//! let repository = Arc::new(FileSystemRepository::new("/srv/repos", config.max_file_bytes));
//! let orchestrator = Orchestrator::new(config, repository, Arc::new(MemoryIndex::default()))?;
//!
//! let status = orchestrator.analyze("billing-service").await?;
//! println!("{} {}%", status.current_step, status.progress);
//! # Ok(())
//! # }
//! ```

mod chat;
mod config;
mod error;
mod orchestrator;
mod registry;
mod repository;
mod status;

pub use chat::{
    build_context, render_system_prompt, AnswerGenerator, ChatService, CONTEXT_SLOT,
    SYSTEM_PROMPT_TEMPLATE,
};
pub use config::PipelineConfig;
pub use error::{PipelineError, Result};
pub use orchestrator::Orchestrator;
pub use registry::{Registry, RunHandle};
pub use repository::{FileSystemRepository, RepositoryClient};
pub use status::{AnalysisStatus, AnalysisStep, ItemFailure};
