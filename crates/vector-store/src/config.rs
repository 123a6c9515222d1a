use crate::error::{Result, VectorStoreError};
use serde::{Deserialize, Serialize};

/// Parameters forwarded with every similarity query
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum number of hits returned
    pub top_k: usize,

    /// Minimum similarity score for a hit, in [0, 1]
    pub similarity_threshold: f32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            similarity_threshold: 0.8,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        if self.top_k == 0 {
            return Err(VectorStoreError::InvalidConfig(
                "top_k must be > 0".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(VectorStoreError::InvalidConfig(format!(
                "similarity_threshold must be within [0, 1], got {}",
                self.similarity_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SearchConfig::default();
        assert_eq!(config.top_k, 10);
        assert!((config.similarity_threshold - 0.8).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let zero = SearchConfig {
            top_k: 0,
            ..Default::default()
        };
        assert!(zero.validate().is_err());

        let above = SearchConfig {
            similarity_threshold: 1.5,
            ..Default::default()
        };
        assert!(above.validate().is_err());

        let nan = SearchConfig {
            similarity_threshold: f32::NAN,
            ..Default::default()
        };
        assert!(nan.validate().is_err());
    }
}
