use crate::error::{PipelineError, Result};
use async_trait::async_trait;
use repochat_vector_store::{SearchHit, VectorStoreGateway};
use std::sync::Arc;

/// Placeholder replaced by the retrieved code context
pub const CONTEXT_SLOT: &str = "{context}";

/// System prompt sent with every chat query
pub const SYSTEM_PROMPT_TEMPLATE: &str = "\
You are a senior Java developer assistant analyzing a codebase.
Use the following code context to answer the user's question:

{context}

When referencing code, use specific file names, class names, and line numbers.
Format code examples in markdown with appropriate language tags.
Keep responses concise but informative, focusing on the most relevant parts of the codebase.
";

/// Language-model call that turns a prompt into an answer
#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn generate(&self, system_prompt: &str, query: &str) -> anyhow::Result<String>;
}

/// Retrieval-augmented chat over the stored chunks
pub struct ChatService {
    gateway: VectorStoreGateway,
    generator: Arc<dyn AnswerGenerator>,
}

impl ChatService {
    pub fn new(gateway: VectorStoreGateway, generator: Arc<dyn AnswerGenerator>) -> Self {
        Self { gateway, generator }
    }

    /// Answer `query` using the most similar stored chunks as context
    pub async fn chat(&self, query: &str) -> Result<String> {
        let hits = self.gateway.semantic_search(query).await?;
        let prompt = render_system_prompt(&build_context(&hits));

        let response = self
            .generator
            .generate(&prompt, query)
            .await
            .map_err(|e| PipelineError::Generation(format!("{e:#}")))?;

        log::info!("Chat response generated ({} context chunks)", hits.len());
        Ok(response)
    }
}

/// Retrieved chunk texts, best match first
pub fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.chunk.content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_system_prompt(context: &str) -> String {
    SYSTEM_PROMPT_TEMPLATE.replacen(CONTEXT_SLOT, context, 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use repochat_code_chunker::Segmenter;
    use repochat_extractor::{AnnotatedDocument, DocumentMetadata};
    use repochat_vector_store::{MemoryIndex, SearchConfig};
    use std::sync::Mutex;
    use tokio_util::sync::CancellationToken;

    #[derive(Default)]
    struct RecordingGenerator {
        prompts: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl AnswerGenerator for RecordingGenerator {
        async fn generate(&self, system_prompt: &str, query: &str) -> anyhow::Result<String> {
            self.prompts
                .lock()
                .unwrap()
                .push((system_prompt.to_string(), query.to_string()));
            Ok("It is computed in Billing.total".to_string())
        }
    }

    struct FailingGenerator;

    #[async_trait]
    impl AnswerGenerator for FailingGenerator {
        async fn generate(&self, _system_prompt: &str, _query: &str) -> anyhow::Result<String> {
            anyhow::bail!("model unavailable")
        }
    }

    fn gateway(threshold: f32) -> VectorStoreGateway {
        VectorStoreGateway::new(
            Arc::new(MemoryIndex::default()),
            Segmenter::default(),
            SearchConfig {
                top_k: 5,
                similarity_threshold: threshold,
            },
        )
        .unwrap()
    }

    #[test]
    fn test_render_system_prompt() {
        let prompt = render_system_prompt("class A {}");
        assert!(prompt.contains("\n\nclass A {}\n\n"));
        assert!(!prompt.contains(CONTEXT_SLOT));
    }

    #[tokio::test]
    async fn test_chat_includes_retrieved_context() {
        let gateway = gateway(0.99);
        let doc = AnnotatedDocument {
            file_path: "src/Billing.java".to_string(),
            raw_content: "class Billing {}".to_string(),
            serialized_tree: String::new(),
            metadata: DocumentMetadata {
                classes: vec!["Billing".to_string()],
                ..Default::default()
            },
        };
        gateway
            .store_documents(&[doc], &CancellationToken::new())
            .await
            .unwrap();

        let generator = Arc::new(RecordingGenerator::default());
        let chat = ChatService::new(gateway, generator.clone());

        // Same tokens as the stored chunk, so the match is exact
        let query = "file src billing java 1 1 package classes billing methods content class billing";
        let answer = chat.chat(query).await.unwrap();
        assert_eq!(answer, "It is computed in Billing.total");

        let prompts = generator.prompts.lock().unwrap();
        let (system, sent) = &prompts[0];
        assert!(system.contains("File: src/Billing.java (1/1)"));
        assert_eq!(sent, query);
    }

    #[tokio::test]
    async fn test_empty_retrieval_still_prompts() {
        let generator = Arc::new(RecordingGenerator::default());
        let chat = ChatService::new(gateway(0.9), generator.clone());

        chat.chat("anything").await.unwrap();
        let prompts = generator.prompts.lock().unwrap();
        assert_eq!(prompts[0].0, render_system_prompt(""));
    }

    #[tokio::test]
    async fn test_generator_failure_surfaces() {
        let chat = ChatService::new(gateway(0.0), Arc::new(FailingGenerator));
        let err = chat.chat("anything").await.unwrap_err();
        assert_eq!(err.to_string(), "Answer generation failed: model unavailable");
    }
}
