use crate::error::{PipelineError, Result};
use repochat_code_chunker::SegmenterConfig;
use repochat_extractor::ExtractorConfig;
use repochat_vector_store::SearchConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Pipeline configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub segmenter: SegmenterConfig,
    pub search: SearchConfig,
    pub extractor: ExtractorConfig,

    /// Deadline for each stage, in seconds
    pub stage_timeout_secs: u64,

    /// How long a finished status stays queryable, in seconds
    pub status_ttl_secs: u64,

    /// Finished statuses kept before the oldest are evicted
    pub max_tracked_analyses: usize,

    /// Largest file the filesystem repository client returns, in bytes
    pub max_file_bytes: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            search: SearchConfig::default(),
            extractor: ExtractorConfig::default(),
            stage_timeout_secs: 300,
            status_ttl_secs: 3600,
            max_tracked_analyses: 256,
            max_file_bytes: 100_000,
        }
    }
}

impl PipelineConfig {
    #[must_use]
    pub const fn stage_timeout(&self) -> Duration {
        Duration::from_secs(self.stage_timeout_secs)
    }

    #[must_use]
    pub const fn status_ttl(&self) -> Duration {
        Duration::from_secs(self.status_ttl_secs)
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(raw).map_err(|e| PipelineError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::InvalidConfig(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.segmenter.validate()?;
        self.search.validate()?;

        if self.stage_timeout_secs == 0 {
            return Err(PipelineError::InvalidConfig(
                "stage_timeout_secs must be > 0".to_string(),
            ));
        }
        if self.max_tracked_analyses == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_tracked_analyses must be > 0".to_string(),
            ));
        }
        if self.max_file_bytes == 0 {
            return Err(PipelineError::InvalidConfig(
                "max_file_bytes must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use repochat_extractor::FailurePolicy;

    #[test]
    fn test_defaults() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.stage_timeout(), Duration::from_secs(300));
        assert_eq!(config.status_ttl(), Duration::from_secs(3600));
        assert_eq!(config.segmenter.chunk_size, 6000);
        assert_eq!(config.search.top_k, 10);
    }

    #[test]
    fn test_from_toml_partial() {
        let config = PipelineConfig::from_toml_str(
            r#"
            stage_timeout_secs = 30

            [segmenter]
            chunk_overlap = 100

            [extractor]
            failure_policy = "fail_fast"
            "#,
        )
        .unwrap();

        assert_eq!(config.stage_timeout_secs, 30);
        assert_eq!(config.segmenter.chunk_size, 6000);
        assert_eq!(config.segmenter.chunk_overlap, 100);
        assert_eq!(config.extractor.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.max_tracked_analyses, 256);
    }

    #[test]
    fn test_from_toml_rejects_invalid_values() {
        let err = PipelineConfig::from_toml_str("[search]\ntop_k = 0\n").unwrap_err();
        assert!(err.to_string().contains("top_k"));

        let err = PipelineConfig::from_toml_str("stage_timeout_secs = 0").unwrap_err();
        assert!(matches!(err, PipelineError::InvalidConfig(_)));

        assert!(PipelineConfig::from_toml_str("stage_timeout_secs = \"soon\"").is_err());
    }
}
