use crate::types::DependencyGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;

impl DependencyGraph {
    /// Display names of the files `file_path` depends on; empty for an unknown path
    pub fn dependencies_of(&self, file_path: &str) -> Vec<String> {
        self.neighbours(file_path, Direction::Outgoing)
    }

    /// Display names of the files that depend on `file_path`; empty for an unknown path
    pub fn dependents_of(&self, file_path: &str) -> Vec<String> {
        self.neighbours(file_path, Direction::Incoming)
    }

    /// Ids of the files `file_path` depends on
    pub fn dependency_ids(&self, file_path: &str) -> Vec<&str> {
        let Ok(node) = self.find_node(file_path) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_directed(node, Direction::Outgoing).collect();
        edges.sort_by_key(|edge| edge.id());
        edges
            .into_iter()
            .map(|edge| self.graph[edge.target()].id.as_str())
            .collect()
    }

    fn neighbours(&self, file_path: &str, direction: Direction) -> Vec<String> {
        let Ok(node) = self.find_node(file_path) else {
            return Vec::new();
        };

        // Adjacency lists iterate newest first; edge ids restore insertion order
        let mut edges: Vec<_> = self.graph.edges_directed(node, direction).collect();
        edges.sort_by_key(|edge| edge.id());

        edges
            .into_iter()
            .map(|edge| {
                let other = match direction {
                    Direction::Outgoing => edge.target(),
                    Direction::Incoming => edge.source(),
                };
                self.graph[other].display_name.clone()
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use crate::types::{DependencyGraph, GraphNode};

    fn sample() -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        for path in ["app/a.py", "app/b.py", "lib/c.py"] {
            graph.add_node(GraphNode::file(path, 100)).unwrap();
        }
        graph.add_edge("app/a.py", "lib/c.py", 1).unwrap();
        graph.add_edge("app/a.py", "app/b.py", 1).unwrap();
        graph.add_edge("app/b.py", "lib/c.py", 1).unwrap();
        graph
    }

    #[test]
    fn test_dependencies_of_in_insertion_order() {
        let graph = sample();
        assert_eq!(graph.dependencies_of("app/a.py"), vec!["c.py", "b.py"]);
        assert_eq!(graph.dependency_ids("app/a.py"), vec!["lib/c.py", "app/b.py"]);
        assert!(graph.dependencies_of("lib/c.py").is_empty());
    }

    #[test]
    fn test_dependents_of() {
        let graph = sample();
        assert_eq!(graph.dependents_of("lib/c.py"), vec!["a.py", "b.py"]);
        assert!(graph.dependents_of("app/a.py").is_empty());
    }

    #[test]
    fn test_unknown_path_is_empty() {
        let graph = sample();
        assert!(graph.dependencies_of("nope.py").is_empty());
        assert!(graph.dependents_of("nope.py").is_empty());
        assert!(graph.dependency_ids("nope.py").is_empty());
    }
}
