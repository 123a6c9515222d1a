use thiserror::Error;

/// Result type for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Errors raised while turning a source file into an annotated document
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    /// The file does not parse under its dialect's grammar
    #[error("Failed to parse file: {path}: {cause}")]
    Parse { path: String, cause: String },

    /// Tree-sitter refused the grammar or produced no tree
    #[error("Tree-sitter error: {0}")]
    TreeSitter(String),

    /// Batch stopped by its caller before finishing
    #[error("Extraction interrupted after {processed} files")]
    Interrupted { processed: usize },
}

impl ExtractError {
    /// Create a parse error for a file
    pub fn parse(path: impl Into<String>, cause: impl Into<String>) -> Self {
        Self::Parse {
            path: path.into(),
            cause: cause.into(),
        }
    }

    /// Create a tree-sitter error
    pub fn tree_sitter(msg: impl Into<String>) -> Self {
        Self::TreeSitter(msg.into())
    }

    /// Path of the offending file, when the error is tied to one
    #[must_use]
    pub fn path(&self) -> Option<&str> {
        match self {
            Self::Parse { path, .. } => Some(path),
            Self::TreeSitter(_) | Self::Interrupted { .. } => None,
        }
    }
}
