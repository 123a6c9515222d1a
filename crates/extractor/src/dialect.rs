use serde::{Deserialize, Serialize};
use std::path::Path;

/// Grammar dialect a source file is parsed with.
///
/// The set is closed: supporting a new kind of file means adding a variant here and a
/// classifier arm in the analyzer, never widening an existing arm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// ECMAScript modules, JSX markup tolerated
    JavaScript,
    /// Module grammar with typed annotations
    TypeScript,
    /// Typed annotations plus embedded JSX markup
    Tsx,
    Python,
    Java,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Dialect::JavaScript,
        Dialect::TypeScript,
        Dialect::Tsx,
        Dialect::Python,
        Dialect::Java,
    ];

    /// Detect dialect from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Some(Dialect::JavaScript),
            "ts" | "mts" | "cts" => Some(Dialect::TypeScript),
            "tsx" => Some(Dialect::Tsx),
            "py" => Some(Dialect::Python),
            "java" => Some(Dialect::Java),
            _ => None,
        }
    }

    /// Detect dialect from a file path; `None` means the file is outside the allow-list
    pub fn from_path(path: impl AsRef<Path>) -> Option<Self> {
        path.as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether the extractor accepts this path at all
    pub fn is_supported_path(path: impl AsRef<Path>) -> bool {
        Self::from_path(path).is_some()
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Dialect::JavaScript => "javascript",
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
            Dialect::Python => "python",
            Dialect::Java => "java",
        }
    }

    /// Get Tree-sitter language instance
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Dialect::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
            Dialect::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Dialect::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Dialect::Python => tree_sitter_python::LANGUAGE.into(),
            Dialect::Java => tree_sitter_java::LANGUAGE.into(),
        }
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
