use crate::error::Result;
use crate::types::{DependencyGraph, GraphNode};
use repochat_extractor::AnnotatedDocument;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A dependency reference that matched no declared `package.Class`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedReference {
    pub file_path: String,
    pub reference: String,
}

/// Graph plus the references that could not be resolved
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    pub graph: DependencyGraph,
    pub unresolved: Vec<UnresolvedReference>,
    /// Paths seen more than once; only the first document per path is used
    pub duplicates: Vec<String>,
}

/// Build file-level dependency graph from annotated documents.
///
/// Resolution is exact: a dependency string links two files only when it equals
/// `packageName + "." + className` for a class declared in the target file. Relative
/// paths, aliases and external packages therefore stay unresolved and are reported
/// in [`BuildReport::unresolved`] rather than guessed at.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphBuilder;

impl GraphBuilder {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, documents: &[AnnotatedDocument]) -> Result<BuildReport> {
        let mut graph = DependencyGraph::new();

        // Phase 1: one node per file, qualified class name -> owning file
        let mut owners: HashMap<String, &str> = HashMap::new();
        let mut kept: Vec<&AnnotatedDocument> = Vec::with_capacity(documents.len());
        let mut duplicates = Vec::new();
        for doc in documents {
            if graph.contains(&doc.file_path) {
                log::warn!("Duplicate file path {}; keeping the first", doc.file_path);
                duplicates.push(doc.file_path.clone());
                continue;
            }
            graph.add_node(GraphNode::file(&doc.file_path, doc.content_chars()))?;
            for qualified in doc.metadata.qualified_class_names() {
                owners.insert(qualified, doc.file_path.as_str());
            }
            kept.push(doc);
        }

        // Phase 2: resolve raw dependency strings into edges
        let mut unresolved = Vec::new();
        for doc in kept {
            let source = doc.file_path.as_str();
            let mut targets: HashSet<&str> = HashSet::new();

            for reference in &doc.metadata.dependencies {
                match owners.get(reference.as_str()) {
                    Some(&target) if target == source => {}
                    Some(&target) => {
                        if targets.insert(target) {
                            graph.add_edge(source, target, 1)?;
                        }
                    }
                    None => unresolved.push(UnresolvedReference {
                        file_path: source.to_string(),
                        reference: reference.clone(),
                    }),
                }
            }
        }

        log::info!(
            "Built dependency graph: {} nodes, {} edges, {} unresolved references",
            graph.node_count(),
            graph.edge_count(),
            unresolved.len()
        );
        for gap in &unresolved {
            log::debug!("Unresolved reference in {}: {}", gap.file_path, gap.reference);
        }

        Ok(BuildReport {
            graph,
            unresolved,
            duplicates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GraphEdge;
    use pretty_assertions::assert_eq;
    use repochat_extractor::DocumentMetadata;

    fn doc(path: &str, package: &str, classes: &[&str], deps: &[&str]) -> AnnotatedDocument {
        AnnotatedDocument {
            file_path: path.to_string(),
            raw_content: "x".repeat(3_000),
            serialized_tree: String::new(),
            metadata: DocumentMetadata {
                package_name: package.to_string(),
                classes: classes.iter().map(|s| s.to_string()).collect(),
                dependencies: deps.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_exact_qualified_name_resolves() {
        let docs = vec![doc("a.py", "", &[], &["pkg.B"]), doc("b.py", "pkg", &["B"], &[])];

        let report = GraphBuilder::new().build(&docs).unwrap();
        let edges: Vec<_> = report.graph.edges().collect();

        assert_eq!(
            edges,
            vec![GraphEdge {
                source: "a.py".to_string(),
                target: "b.py".to_string(),
                weight: 1,
            }]
        );
        assert!(report.unresolved.is_empty());
        assert_eq!(report.graph.node("b.py").map(|n| n.size), Some(30));
    }

    #[test]
    fn test_duplicate_references_collapse_to_one_edge() {
        let docs = vec![
            doc("a.java", "app", &["A"], &["lib.B", "lib.C", "lib.B"]),
            doc("b.java", "lib", &["B", "C"], &[]),
        ];

        let report = GraphBuilder::new().build(&docs).unwrap();
        assert_eq!(report.graph.edge_count(), 1);
        assert_eq!(report.graph.dependencies_of("a.java"), vec!["b.java"]);
    }

    #[test]
    fn test_self_reference_dropped() {
        let docs = vec![doc("a.java", "app", &["A", "Inner"], &["app.Inner"])];

        let report = GraphBuilder::new().build(&docs).unwrap();
        assert_eq!(report.graph.edge_count(), 0);
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn test_relative_imports_are_reported_unresolved() {
        let docs = vec![
            doc("src/a.ts", "", &["A"], &["./b", "react"]),
            doc("src/b.ts", "", &["B"], &[]),
        ];

        let report = GraphBuilder::new().build(&docs).unwrap();
        assert_eq!(report.graph.edge_count(), 0);
        let refs: Vec<_> = report.unresolved.iter().map(|u| u.reference.as_str()).collect();
        assert_eq!(refs, vec!["./b", "react"]);
    }

    #[test]
    fn test_classes_without_package_never_resolve() {
        // "B" alone is not a qualified name
        let docs = vec![doc("a.py", "", &[], &["B", ".B"]), doc("b.py", "", &["B"], &[])];

        let report = GraphBuilder::new().build(&docs).unwrap();
        assert_eq!(report.graph.edge_count(), 0);
        assert_eq!(report.unresolved.len(), 2);
    }

    #[test]
    fn test_duplicate_file_path_keeps_first() {
        let docs = vec![
            doc("src/a.js", "app", &["A"], &["lib.B"]),
            doc("src/b.js", "lib", &["B"], &[]),
            doc("src/a.js", "other", &["Z"], &["lib.Missing"]),
        ];

        let report = GraphBuilder::new().build(&docs).unwrap();
        assert_eq!(report.graph.node_count(), 2);
        assert_eq!(report.duplicates, vec!["src/a.js".to_string()]);
        assert_eq!(report.graph.dependencies_of("src/a.js"), vec!["src/b.js"]);
        // The skipped copy contributes neither edges nor unresolved references
        assert!(report.unresolved.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let report = GraphBuilder::new().build(&[]).unwrap();
        assert!(report.graph.is_empty());
    }
}
