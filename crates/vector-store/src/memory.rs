use crate::embedding::{cosine_similarity, HashingEmbedder};
use crate::index::VectorIndex;
use crate::types::{SearchHit, SearchRequest};
use async_trait::async_trait;
use repochat_code_chunker::Chunk;
use tokio::sync::RwLock;

struct Entry {
    chunk: Chunk,
    vector: Vec<f32>,
}

/// In-process index (brute-force cosine search), for development and tests
pub struct MemoryIndex {
    embedder: HashingEmbedder,
    entries: RwLock<Vec<Entry>>,
}

impl MemoryIndex {
    pub fn new(embedder: HashingEmbedder) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Get number of stored chunks
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop every chunk stored for `file_path`
    pub async fn remove_file(&self, file_path: &str) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|entry| entry.chunk.owner_file_path() != file_path);
        before - entries.len()
    }
}

impl Default for MemoryIndex {
    fn default() -> Self {
        Self::new(HashingEmbedder::default())
    }
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    async fn add(&self, chunks: Vec<Chunk>) -> anyhow::Result<()> {
        let batch: Vec<Entry> = chunks
            .into_iter()
            .map(|chunk| Entry {
                vector: self.embedder.embed(&chunk.content),
                chunk,
            })
            .collect();

        let mut entries = self.entries.write().await;
        entries.extend(batch);
        log::debug!("Memory index holds {} chunks", entries.len());
        Ok(())
    }

    async fn similarity_search(&self, request: SearchRequest) -> anyhow::Result<Vec<SearchHit>> {
        let query = self.embedder.embed(&request.query);
        let entries = self.entries.read().await;

        // Brute-force search (O(n), but simple and correct)
        let mut scored: Vec<(usize, f32)> = entries
            .iter()
            .enumerate()
            .map(|(i, entry)| (i, cosine_similarity(&query, &entry.vector)))
            .filter(|(_, score)| *score >= request.similarity_threshold)
            .collect();

        // Sort by score descending, insertion order on ties
        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(request.top_k);

        Ok(scored
            .into_iter()
            .map(|(i, score)| SearchHit {
                chunk: entries[i].chunk.clone(),
                score,
            })
            .collect())
    }
}
