use crate::types::{SearchHit, SearchRequest};
use async_trait::async_trait;
use repochat_code_chunker::Chunk;

/// External vector index: embeds and stores chunks, answers similarity queries
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Store one document's chunk batch
    async fn add(&self, chunks: Vec<Chunk>) -> anyhow::Result<()>;

    /// Hits scoring at least `request.similarity_threshold`, best first, at most `request.top_k`
    async fn similarity_search(&self, request: SearchRequest) -> anyhow::Result<Vec<SearchHit>>;
}
