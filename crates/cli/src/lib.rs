//! # Repochat CLI
//!
//! Control surface of the analysis pipeline: an HTTP API (`repochat serve`) and one-shot
//! commands (`repochat analyze`, `repochat chat`).
//!
//! ```text
//! POST   /api/v1/analyze/{id}                      trigger, 202 (409 while running)
//! GET    /api/v1/analyze/{id}/status               AnalysisStatus
//! GET    /api/v1/analyze/{id}/dependencies         {nodes, edges}
//! GET    /api/v1/analyze/{id}/dependencies/file    ?path=... → {filePath, dependencies}
//! DELETE /api/v1/analyze/{id}                      cancel, 204 (404 when idle)
//! POST   /api/v1/chat                              {query} → {response}
//! GET    /health
//! ```

pub mod http_api;
pub mod llm;
pub mod settings;

pub use http_api::{router, AppState, ChatRequest, ChatResponse, ErrorEnvelope};
pub use llm::OpenAiGenerator;
pub use settings::{load_config, ConfigOverrides, LlmArgs};
