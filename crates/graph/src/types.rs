use crate::error::{GraphError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Smallest rendered node size
pub const MIN_NODE_SIZE: u32 = 20;

/// Largest rendered node size
pub const MAX_NODE_SIZE: u32 = 100;

/// What a graph node stands for (the builder only emits `File` today)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Class,
    Interface,
    Method,
}

/// Node in dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    /// Unique id (the file path)
    pub id: String,

    /// Basename of the file
    pub display_name: String,

    #[serde(rename = "type")]
    pub kind: NodeKind,

    /// Rendered size, always within [`MIN_NODE_SIZE`, `MAX_NODE_SIZE`]
    pub size: u32,
}

impl GraphNode {
    /// File node sized by its content length in characters
    pub fn file(path: impl Into<String>, content_chars: usize) -> Self {
        let id = path.into();
        let display_name = display_name(&id).to_string();
        Self {
            id,
            display_name,
            kind: NodeKind::File,
            size: node_size(content_chars),
        }
    }
}

/// Directed edge `source -> target` (source depends on target)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
    pub weight: u32,
}

/// `len / 100` clamped into the rendered size range
#[must_use]
pub fn node_size(content_chars: usize) -> u32 {
    let scaled = u32::try_from(content_chars / 100).unwrap_or(u32::MAX);
    scaled.clamp(MIN_NODE_SIZE, MAX_NODE_SIZE)
}

/// Last `/`-separated segment of a path
#[must_use]
pub fn display_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// File-level dependency graph.
///
/// Node ids are unique and no edge joins a node to itself; both are enforced on insert.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    /// Directed graph (file -> file, edge weight = multiplicity)
    pub(crate) graph: DiGraph<GraphNode, u32>,

    /// Node id -> NodeIndex mapping for fast lookup
    pub(crate) index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add node to graph
    pub fn add_node(&mut self, node: GraphNode) -> Result<NodeIndex> {
        if self.index.contains_key(&node.id) {
            return Err(GraphError::DuplicateNode(node.id));
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.index.insert(id, idx);
        Ok(idx)
    }

    /// Add edge between two existing nodes
    pub fn add_edge(&mut self, source: &str, target: &str, weight: u32) -> Result<()> {
        if source == target {
            return Err(GraphError::SelfEdge(source.to_string()));
        }
        let from = self.find_node(source)?;
        let to = self.find_node(target)?;
        self.graph.add_edge(from, to, weight);
        Ok(())
    }

    pub(crate) fn find_node(&self, id: &str) -> Result<NodeIndex> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::NodeNotFound(id.to_string()))
    }

    /// Get node data
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.index.get(id).and_then(|&idx| self.graph.node_weight(idx))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Nodes in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &GraphNode> {
        self.graph.node_weights()
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = GraphEdge> + '_ {
        self.graph.raw_edges().iter().map(|edge| GraphEdge {
            source: self.graph[edge.source()].id.clone(),
            target: self.graph[edge.target()].id.clone(),
            weight: edge.weight,
        })
    }

    /// Get node count
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get edge count
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

/// Wire shape of a [`DependencyGraph`]: `{nodes, edges}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphView {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl From<&DependencyGraph> for GraphView {
    fn from(graph: &DependencyGraph) -> Self {
        Self {
            nodes: graph.nodes().cloned().collect(),
            edges: graph.edges().collect(),
        }
    }
}

impl TryFrom<GraphView> for DependencyGraph {
    type Error = GraphError;

    fn try_from(view: GraphView) -> Result<Self> {
        let mut graph = DependencyGraph::new();
        for node in view.nodes {
            graph.add_node(node)?;
        }
        for edge in view.edges {
            graph.add_edge(&edge.source, &edge.target, edge.weight)?;
        }
        Ok(graph)
    }
}

impl Serialize for DependencyGraph {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        GraphView::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for DependencyGraph {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let view = GraphView::deserialize(deserializer)?;
        DependencyGraph::try_from(view).map_err(serde::de::Error::custom)
    }
}
