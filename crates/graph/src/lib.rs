//! # Repochat Graph
//!
//! File-level dependency graph resolved from extracted document metadata.
//!
//! ## Architecture
//!
//! ```text
//! AnnotatedDocument[]
//!     │
//!     ├──> Pass 1
//!     │      ├─ One file node per document (size = clamp(len/100, 20, 100))
//!     │      └─ "package.Class" → owning file map
//!     │
//!     ├──> Pass 2
//!     │      ├─ Exact lookup of every raw dependency string
//!     │      ├─ One edge per unique (source, target), weight 1
//!     │      └─ Misses recorded as unresolved references
//!     │
//!     └──> DependencyGraph (petgraph) + BuildReport
//! ```

mod builder;
mod error;
mod graph;
mod types;

pub use builder::{BuildReport, GraphBuilder, UnresolvedReference};
pub use error::{GraphError, Result};
pub use types::{
    display_name, node_size, DependencyGraph, GraphEdge, GraphNode, GraphView, NodeKind,
    MAX_NODE_SIZE, MIN_NODE_SIZE,
};
