use crate::llm::OpenAiGenerator;
use anyhow::{Context, Result};
use clap::Args;
use repochat_pipeline::{AnswerGenerator, PipelineConfig};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Command line overrides applied on top of the TOML configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Number of chunks retrieved per chat query
    #[arg(long, global = true)]
    pub top_k: Option<usize>,

    /// Minimum cosine similarity of retrieved chunks (0..=1)
    #[arg(long, global = true)]
    pub similarity_threshold: Option<f32>,

    /// Deadline for each analysis stage, in seconds
    #[arg(long, global = true)]
    pub stage_timeout_secs: Option<u64>,

    /// Largest repository file read, in bytes
    #[arg(long, global = true)]
    pub max_file_bytes: Option<u64>,
}

impl ConfigOverrides {
    fn apply(&self, config: &mut PipelineConfig) {
        if let Some(top_k) = self.top_k {
            config.search.top_k = top_k;
        }
        if let Some(threshold) = self.similarity_threshold {
            config.search.similarity_threshold = threshold;
        }
        if let Some(secs) = self.stage_timeout_secs {
            config.stage_timeout_secs = secs;
        }
        if let Some(bytes) = self.max_file_bytes {
            config.max_file_bytes = bytes;
        }
    }
}

/// Defaults, then the optional TOML file, then command line overrides
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<PipelineConfig> {
    let mut config = match path {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Answer-generation endpoint (OpenAI-compatible chat completions)
#[derive(Args, Debug, Clone, Default)]
pub struct LlmArgs {
    /// Base URL of the chat completions API, e.g. http://127.0.0.1:11434/v1
    #[arg(long, env = "REPOCHAT_LLM_URL")]
    pub llm_url: Option<String>,

    /// Model name sent with every completion request
    #[arg(long, env = "REPOCHAT_LLM_MODEL")]
    pub llm_model: Option<String>,

    /// Bearer token for the completions API
    #[arg(long, env = "REPOCHAT_LLM_API_KEY", hide_env_values = true)]
    pub llm_api_key: Option<String>,

    /// Request timeout for answer generation, in seconds
    #[arg(long, default_value_t = 120)]
    pub llm_timeout_secs: u64,
}

impl LlmArgs {
    /// `None` when no endpoint is configured
    pub fn generator(&self) -> Result<Option<Arc<dyn AnswerGenerator>>> {
        let Some(url) = self.llm_url.as_deref() else {
            return Ok(None);
        };
        let model = self
            .llm_model
            .as_deref()
            .context("--llm-model is required when --llm-url is set")?;

        let generator = OpenAiGenerator::new(
            url,
            model,
            self.llm_api_key.clone(),
            Duration::from_secs(self.llm_timeout_secs),
        )?;
        Ok(Some(Arc::new(generator)))
    }
}
