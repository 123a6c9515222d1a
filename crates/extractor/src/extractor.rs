use crate::analyzer::AstAnalyzer;
use crate::dialect::Dialect;
use crate::error::{ExtractError, Result};
use crate::types::{AnnotatedDocument, SourceFile};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// What a batch does when one file fails to parse
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Abort the batch on the first failure
    FailFast,
    /// Record the failure and keep going
    #[default]
    Continue,
}

/// Configuration for batch extraction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

/// Outcome of extracting a batch of files
#[derive(Debug, Clone, Default)]
pub struct ExtractionReport {
    /// Documents for every file that parsed, input order
    pub documents: Vec<AnnotatedDocument>,

    /// Files that failed to parse (only populated under [`FailurePolicy::Continue`])
    pub failures: Vec<ExtractError>,

    /// Files outside the dialect allow-list
    pub skipped: usize,
}

impl ExtractionReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Batch front-end over the per-dialect analyzers
pub struct Extractor {
    config: ExtractorConfig,
}

impl Extractor {
    #[must_use]
    pub const fn new(config: ExtractorConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Extract a single file; `Ok(None)` when the file is outside the allow-list
    pub fn extract(&self, file: &SourceFile) -> Result<Option<AnnotatedDocument>> {
        let Some(dialect) = Dialect::from_path(&file.path) else {
            return Ok(None);
        };
        let mut analyzer = AstAnalyzer::new(dialect)?;
        analyzer.analyze(file).map(Some)
    }

    /// Extract every allow-listed file in the batch
    pub fn extract_all(&self, files: &[SourceFile]) -> Result<ExtractionReport> {
        self.extract_all_until(files, || false)
    }

    /// Extract a batch, checking `interrupted` before each file.
    ///
    /// Returns [`ExtractError::Interrupted`] as soon as `interrupted` reports true.
    pub fn extract_all_until(
        &self,
        files: &[SourceFile],
        interrupted: impl Fn() -> bool,
    ) -> Result<ExtractionReport> {
        let mut analyzers: HashMap<Dialect, AstAnalyzer> = HashMap::new();
        let mut report = ExtractionReport::default();

        for (processed, file) in files.iter().enumerate() {
            if interrupted() {
                return Err(ExtractError::Interrupted { processed });
            }

            let Some(dialect) = Dialect::from_path(&file.path) else {
                log::debug!("Skipping {} (no dialect)", file.path);
                report.skipped += 1;
                continue;
            };

            let analyzer = match analyzers.entry(dialect) {
                std::collections::hash_map::Entry::Occupied(entry) => entry.into_mut(),
                std::collections::hash_map::Entry::Vacant(entry) => {
                    entry.insert(AstAnalyzer::new(dialect)?)
                }
            };

            match analyzer.analyze(file) {
                Ok(document) => report.documents.push(document),
                Err(err) => match self.config.failure_policy {
                    FailurePolicy::FailFast => return Err(err),
                    FailurePolicy::Continue => {
                        log::warn!("{err}");
                        report.failures.push(err);
                    }
                },
            }
        }

        log::info!(
            "Extracted {} documents ({} failed, {} skipped)",
            report.documents.len(),
            report.failures.len(),
            report.skipped
        );

        Ok(report)
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(ExtractorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch() -> Vec<SourceFile> {
        vec![
            SourceFile::new("src/a.js", "import b from './b';\nfunction a() {}\n"),
            SourceFile::new("README.md", "# readme"),
            SourceFile::new("src/broken.ts", "class {{{"),
            SourceFile::new("src/b.py", "def b():\n    pass\n"),
        ]
    }

    #[test]
    fn test_continue_collects_failures() {
        let report = Extractor::default().extract_all(&batch()).unwrap();

        let paths: Vec<_> = report.documents.iter().map(|d| d.file_path.as_str()).collect();
        assert_eq!(paths, vec!["src/a.js", "src/b.py"]);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].path(), Some("src/broken.ts"));
        assert!(!report.is_clean());
    }

    #[test]
    fn test_fail_fast_aborts_batch() {
        let extractor = Extractor::new(ExtractorConfig {
            failure_policy: FailurePolicy::FailFast,
        });
        let err = extractor.extract_all(&batch()).unwrap_err();
        assert!(matches!(err, ExtractError::Parse { ref path, .. } if path == "src/broken.ts"));
        assert!(err.to_string().starts_with("Failed to parse file: src/broken.ts"));
    }

    #[test]
    fn test_unknown_extension_is_skipped_even_when_failing_fast() {
        let extractor = Extractor::new(ExtractorConfig {
            failure_policy: FailurePolicy::FailFast,
        });
        let files = vec![
            SourceFile::new("Makefile", "all:\n\ttrue\n"),
            SourceFile::new("src/b.py", "def b():\n    pass\n"),
        ];

        let report = extractor.extract_all(&files).unwrap();
        assert_eq!(report.skipped, 1);
        assert!(report.is_clean());
        assert_eq!(report.documents.len(), 1);
    }

    #[test]
    fn test_interrupted_before_first_file() {
        let err = Extractor::default()
            .extract_all_until(&batch(), || true)
            .unwrap_err();
        assert_eq!(err, ExtractError::Interrupted { processed: 0 });
    }

    #[test]
    fn test_extract_single_file() {
        let extractor = Extractor::default();
        assert!(extractor
            .extract(&SourceFile::new("notes.txt", "hello"))
            .unwrap()
            .is_none());

        let doc = extractor
            .extract(&SourceFile::new("a.js", "function a() {}"))
            .unwrap()
            .unwrap();
        assert_eq!(doc.metadata.methods, vec!["a"]);
    }

    #[test]
    fn test_empty_batch() {
        let report = Extractor::default().extract_all(&[]).unwrap();
        assert!(report.documents.is_empty());
        assert!(report.is_clean());
    }
}
