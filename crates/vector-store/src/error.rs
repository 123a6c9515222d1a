use thiserror::Error;

pub type Result<T> = std::result::Result<T, VectorStoreError>;

#[derive(Error, Debug)]
pub enum VectorStoreError {
    #[error("Index error: {0}")]
    IndexError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Storage cancelled after {stored} documents")]
    Cancelled { stored: usize },
}

impl VectorStoreError {
    /// Wrap a collaborator error, keeping its context chain
    pub fn index(err: &anyhow::Error) -> Self {
        Self::IndexError(format!("{err:#}"))
    }
}
