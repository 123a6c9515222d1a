use serde::{Deserialize, Serialize};

/// Stage of one analysis run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AnalysisStep {
    #[default]
    NotStarted,
    FetchingFiles,
    ParsingAst,
    AnalyzingDependencies,
    StoringVectors,
    Completed,
}

impl AnalysisStep {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NotStarted => "NOT_STARTED",
            Self::FetchingFiles => "FETCHING_FILES",
            Self::ParsingAst => "PARSING_AST",
            Self::AnalyzingDependencies => "ANALYZING_DEPENDENCIES",
            Self::StoringVectors => "STORING_VECTORS",
            Self::Completed => "COMPLETED",
        }
    }

    /// Progress reported once this stage has finished
    #[must_use]
    pub const fn completed_progress(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::FetchingFiles => 20,
            Self::ParsingAst => 40,
            Self::AnalyzingDependencies => 60,
            Self::StoringVectors | Self::Completed => 100,
        }
    }
}

impl std::fmt::Display for AnalysisStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single file that failed inside an otherwise successful stage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFailure {
    pub file_path: String,
    pub stage: AnalysisStep,
    pub message: String,
}

/// Progress record of one analysis request
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisStatus {
    pub current_step: AnalysisStep,

    /// 0..=100, never decreases within one run
    pub progress: u8,

    pub error: Option<String>,
    pub success: bool,

    /// Per-file failures collected along the way
    #[serde(default)]
    pub failures: Vec<ItemFailure>,
}

impl AnalysisStatus {
    /// Completed or failed; the record no longer changes
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.current_step == AnalysisStep::Completed || self.error.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_id_default() {
        let status = AnalysisStatus::default();
        assert_eq!(status.current_step, AnalysisStep::NotStarted);
        assert_eq!(status.progress, 0);
        assert!(status.error.is_none());
        assert!(!status.success);
        assert!(!status.is_terminal());
    }

    #[test]
    fn test_wire_format() {
        let status = AnalysisStatus {
            current_step: AnalysisStep::AnalyzingDependencies,
            progress: 40,
            error: None,
            success: false,
            failures: vec![ItemFailure {
                file_path: "src/x.ts".to_string(),
                stage: AnalysisStep::ParsingAst,
                message: "Failed to parse file: src/x.ts".to_string(),
            }],
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "currentStep": "ANALYZING_DEPENDENCIES",
                "progress": 40,
                "error": null,
                "success": false,
                "failures": [{
                    "filePath": "src/x.ts",
                    "stage": "PARSING_AST",
                    "message": "Failed to parse file: src/x.ts"
                }]
            })
        );
    }

    #[test]
    fn test_display_matches_wire_name() {
        for step in [
            AnalysisStep::NotStarted,
            AnalysisStep::FetchingFiles,
            AnalysisStep::ParsingAst,
            AnalysisStep::AnalyzingDependencies,
            AnalysisStep::StoringVectors,
            AnalysisStep::Completed,
        ] {
            let wire = serde_json::to_value(step).unwrap();
            assert_eq!(wire, step.to_string());
        }
    }

    #[test]
    fn test_progress_is_monotonic_across_steps() {
        let steps = [
            AnalysisStep::NotStarted,
            AnalysisStep::FetchingFiles,
            AnalysisStep::ParsingAst,
            AnalysisStep::AnalyzingDependencies,
            AnalysisStep::StoringVectors,
            AnalysisStep::Completed,
        ];
        assert!(steps
            .windows(2)
            .all(|w| w[0].completed_progress() <= w[1].completed_progress()));
    }
}
