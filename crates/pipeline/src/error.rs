use crate::status::AnalysisStep;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Analysis already running for repository: {0}")]
    AlreadyRunning(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Failed to fetch repository {repository}: {cause}")]
    Fetch { repository: String, cause: String },

    #[error(transparent)]
    Extract(#[from] repochat_extractor::ExtractError),

    #[error(transparent)]
    Graph(#[from] repochat_graph::GraphError),

    #[error(transparent)]
    Chunker(#[from] repochat_code_chunker::ChunkerError),

    #[error(transparent)]
    VectorStore(#[from] repochat_vector_store::VectorStoreError),

    #[error("Answer generation failed: {0}")]
    Generation(String),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("{step} timed out after {secs}s")]
    Timeout { step: AnalysisStep, secs: u64 },

    #[error("Stage task failed: {0}")]
    Join(String),
}

impl PipelineError {
    /// Collapse the stage-local interruption errors into [`PipelineError::Cancelled`]
    pub(crate) fn normalize(self) -> Self {
        match self {
            Self::Extract(repochat_extractor::ExtractError::Interrupted { .. })
            | Self::VectorStore(repochat_vector_store::VectorStoreError::Cancelled { .. }) => {
                Self::Cancelled
            }
            other => other,
        }
    }
}
