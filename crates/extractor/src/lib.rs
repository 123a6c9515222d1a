//! # Repochat Extractor
//!
//! Turns source files into annotated documents: the raw text, a serialized syntax tree
//! and a structural summary (package, classes, methods, fields, dependencies).
//!
//! ## Architecture
//!
//! ```text
//! SourceFile
//!     │
//!     ├──> Dialect detection (from extension, closed set)
//!     │
//!     ├──> Tree-sitter parsing → syntax tree
//!     │    └─> any ERROR/MISSING node → ExtractError::Parse
//!     │
//!     └──> Pre-order walk
//!          ├─> Per-dialect classifier → Declaration
//!          └─> Fold into DocumentMetadata
//! ```
//!
//! ## Example
//!
//! ```rust
//! use repochat_extractor::{Extractor, SourceFile};
//!
//! let file = SourceFile::new("src/app.js", "import x from './x';\nclass App {}\n");
//! let doc = Extractor::default().extract(&file).unwrap().unwrap();
//!
//! assert_eq!(doc.metadata.classes, vec!["App"]);
//! assert_eq!(doc.metadata.dependencies, vec!["./x"]);
//! ```

mod analyzer;
mod dialect;
mod error;
mod extractor;
mod types;

pub use analyzer::AstAnalyzer;
pub use dialect::Dialect;
pub use error::{ExtractError, Result};
pub use extractor::{ExtractionReport, Extractor, ExtractorConfig, FailurePolicy};
pub use types::{
    AnnotatedDocument, Declaration, DocumentMetadata, SourceFile, ANONYMOUS_CLASS,
    ANONYMOUS_FUNCTION,
};
