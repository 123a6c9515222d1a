use crate::config::SearchConfig;
use crate::error::{Result, VectorStoreError};
use crate::index::VectorIndex;
use crate::types::{DocumentOutcome, SearchHit, SearchRequest, StoreOutcome, StoreReport};
use repochat_code_chunker::Segmenter;
use repochat_extractor::AnnotatedDocument;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Prepares chunk batches for the external index and relays similarity queries
#[derive(Clone)]
pub struct VectorStoreGateway {
    index: Arc<dyn VectorIndex>,
    segmenter: Segmenter,
    search: SearchConfig,
}

impl VectorStoreGateway {
    pub fn new(index: Arc<dyn VectorIndex>, segmenter: Segmenter, search: SearchConfig) -> Result<Self> {
        search.validate()?;
        Ok(Self {
            index,
            segmenter,
            search,
        })
    }

    #[must_use]
    pub const fn search_config(&self) -> &SearchConfig {
        &self.search
    }

    /// Segment each document and hand its chunks to the index.
    ///
    /// A rejected batch is logged and recorded; the remaining documents are still stored.
    /// Cancellation is checked between documents.
    pub async fn store_documents(
        &self,
        documents: &[AnnotatedDocument],
        cancel: &CancellationToken,
    ) -> Result<StoreReport> {
        let mut report = StoreReport::default();

        for (stored, doc) in documents.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(VectorStoreError::Cancelled { stored });
            }

            let chunks = self.segmenter.segment(doc);
            let outcome = if chunks.is_empty() {
                StoreOutcome::Skipped
            } else {
                let count = chunks.len();
                match self.index.add(chunks).await {
                    Ok(()) => StoreOutcome::Stored { chunks: count },
                    Err(err) => {
                        log::error!("Failed to store document {}: {err:#}", doc.file_path);
                        StoreOutcome::Failed {
                            error: format!("{err:#}"),
                        }
                    }
                }
            };

            report.documents.push(DocumentOutcome {
                file_path: doc.file_path.clone(),
                outcome,
            });
        }

        log::info!(
            "Stored {} chunks from {} documents ({} failed)",
            report.stored_chunks(),
            documents.len(),
            report.failures().count()
        );

        Ok(report)
    }

    /// Ranked chunks for a query, using the configured `top_k` and threshold
    pub async fn semantic_search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let request = SearchRequest {
            query: query.to_string(),
            top_k: self.search.top_k,
            similarity_threshold: self.search.similarity_threshold,
        };

        let hits = self
            .index
            .similarity_search(request)
            .await
            .map_err(|err| VectorStoreError::index(&err))?;

        log::info!("Found {} relevant chunks for query: {query}", hits.len());
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryIndex;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use repochat_code_chunker::{Chunk, SegmenterConfig};
    use repochat_extractor::DocumentMetadata;
    use std::sync::Mutex;

    /// Rejects batches for one path and records the rest
    #[derive(Default)]
    struct FlakyIndex {
        reject: String,
        batches: Mutex<Vec<usize>>,
        last_request: Mutex<Option<SearchRequest>>,
    }

    #[async_trait]
    impl VectorIndex for FlakyIndex {
        async fn add(&self, chunks: Vec<Chunk>) -> anyhow::Result<()> {
            if chunks[0].owner_file_path() == self.reject {
                anyhow::bail!("embedding backend unavailable");
            }
            self.batches.lock().unwrap().push(chunks.len());
            Ok(())
        }

        async fn similarity_search(&self, request: SearchRequest) -> anyhow::Result<Vec<SearchHit>> {
            *self.last_request.lock().unwrap() = Some(request);
            Ok(Vec::new())
        }
    }

    fn doc(path: &str, content: &str) -> AnnotatedDocument {
        AnnotatedDocument {
            file_path: path.to_string(),
            raw_content: content.to_string(),
            serialized_tree: String::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    fn gateway(index: Arc<dyn VectorIndex>) -> VectorStoreGateway {
        let segmenter = Segmenter::new(SegmenterConfig {
            chunk_size: 10,
            chunk_overlap: 2,
        })
        .unwrap();
        VectorStoreGateway::new(index, segmenter, SearchConfig::default()).unwrap()
    }

    #[tokio::test]
    async fn test_store_continues_past_failures() {
        let index = Arc::new(FlakyIndex {
            reject: "bad.py".to_string(),
            ..Default::default()
        });
        let gateway = gateway(index.clone());

        let docs = vec![
            doc("a.py", "short"),
            doc("bad.py", "also short"),
            doc("empty.py", ""),
            doc("long.py", &"x = 1;\n".repeat(20)),
        ];
        let report = gateway
            .store_documents(&docs, &CancellationToken::new())
            .await
            .unwrap();

        let outcomes: Vec<_> = report.documents.iter().map(|d| d.outcome.clone()).collect();
        assert_eq!(outcomes[0], StoreOutcome::Stored { chunks: 1 });
        assert_eq!(
            outcomes[1],
            StoreOutcome::Failed {
                error: "embedding backend unavailable".to_string()
            }
        );
        assert_eq!(outcomes[2], StoreOutcome::Skipped);
        assert!(matches!(outcomes[3], StoreOutcome::Stored { chunks } if chunks > 1));

        let failures: Vec<_> = report.failures().collect();
        assert_eq!(failures, vec![("bad.py", "embedding backend unavailable")]);
        assert_eq!(index.batches.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_store_honours_cancellation() {
        let gateway = gateway(Arc::new(MemoryIndex::default()));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = gateway
            .store_documents(&[doc("a.py", "x")], &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, VectorStoreError::Cancelled { stored: 0 }));
    }

    #[tokio::test]
    async fn test_search_forwards_configured_parameters() {
        let index = Arc::new(FlakyIndex::default());
        let gateway = VectorStoreGateway::new(
            index.clone(),
            Segmenter::default(),
            SearchConfig {
                top_k: 3,
                similarity_threshold: 0.25,
            },
        )
        .unwrap();

        gateway.semantic_search("where is tax computed").await.unwrap();
        let request = index.last_request.lock().unwrap().clone().unwrap();
        assert_eq!(
            request,
            SearchRequest {
                query: "where is tax computed".to_string(),
                top_k: 3,
                similarity_threshold: 0.25,
            }
        );
    }

    #[test]
    fn test_invalid_search_config_rejected() {
        let result = VectorStoreGateway::new(
            Arc::new(MemoryIndex::default()),
            Segmenter::default(),
            SearchConfig {
                top_k: 0,
                similarity_threshold: 0.5,
            },
        );
        assert!(result.is_err());
    }
}
