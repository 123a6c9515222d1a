use repochat_code_chunker::Chunk;
use serde::{Deserialize, Serialize};

/// One similarity query as handed to the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub top_k: usize,
    pub similarity_threshold: f32,
}

/// A stored chunk returned by a similarity query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk: Chunk,
    pub score: f32,
}

/// What happened to one document during storage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum StoreOutcome {
    /// All chunks of the document reached the index
    Stored { chunks: usize },
    /// Nothing to store (empty content)
    Skipped,
    /// The index rejected the batch; the document's chunks are dropped
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentOutcome {
    pub file_path: String,
    #[serde(flatten)]
    pub outcome: StoreOutcome,
}

/// Per-document results of one storage pass, input order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReport {
    pub documents: Vec<DocumentOutcome>,
}

impl StoreReport {
    /// Total chunks that reached the index
    #[must_use]
    pub fn stored_chunks(&self) -> usize {
        self.documents
            .iter()
            .map(|doc| match doc.outcome {
                StoreOutcome::Stored { chunks } => chunks,
                _ => 0,
            })
            .sum()
    }

    /// Documents whose storage failed, with the error message
    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.documents.iter().filter_map(|doc| match &doc.outcome {
            StoreOutcome::Failed { error } => Some((doc.file_path.as_str(), error.as_str())),
            _ => None,
        })
    }
}
