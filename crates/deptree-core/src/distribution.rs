//! Graph nodes and edges: one [`Distribution`] per project key, installed or
//! merely referenced, and one [`Requirement`] edge per declared dependency,
//! collected into [`Distributions`].

use std::collections::{BTreeMap, HashMap};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;

use crate::key::ProjectKey;
use crate::requirement::Requirement;

/// A node of the dependency graph.
#[derive(Debug, Clone)]
pub struct Distribution {
    pub key: ProjectKey,
    /// Whether the project is actually installed.
    pub found: bool,
    pub project_name: Option<String>,
    pub version: Option<String>,
    /// Keys of the projects whose requirement on this one the installed
    /// version does not satisfy.
    pub conflicts: Vec<ProjectKey>,
}

impl Distribution {
    pub fn new(key: ProjectKey) -> Self {
        Self {
            key,
            found: false,
            project_name: None,
            version: None,
            conflicts: Vec::new(),
        }
    }

    /// Display name, falling back to the key for projects never found.
    pub fn label(&self) -> &str {
        self.project_name.as_deref().unwrap_or(self.key.as_str())
    }

    /// `name==version` as shown for installed projects.
    pub fn pinned(&self) -> String {
        format!("{}=={}", self.label(), self.version.as_deref().unwrap_or_default())
    }
}

/// The whole graph, built once and read-only afterwards.
///
/// An edge `a -> b` carries the requirement `a` declares on `b`. Nodes and
/// edges are only ever added, so index order is discovery order.
#[derive(Debug, Clone)]
pub struct Distributions {
    graph: DiGraph<Distribution, Requirement>,
    /// Lookup from project key to node index.
    index: HashMap<ProjectKey, NodeIndex>,
}

impl Default for Distributions {
    fn default() -> Self {
        Self::new()
    }
}

impl Distributions {
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            index: HashMap::new(),
        }
    }

    fn add_node(&mut self, key: &ProjectKey) -> NodeIndex {
        if let Some(&idx) = self.index.get(key) {
            return idx;
        }
        let idx = self.graph.add_node(Distribution::new(key.clone()));
        self.index.insert(key.clone(), idx);
        idx
    }

    /// Get the node for `key`, creating an unfound one on first reference.
    pub fn upsert(&mut self, key: &ProjectKey) -> &mut Distribution {
        let idx = self.add_node(key);
        &mut self.graph[idx]
    }

    /// Record that `dependent` requires `dependency`. Returns `false` (and
    /// keeps the first edge) when `dependent` already declares one.
    pub fn add_requirement(&mut self, dependent: &ProjectKey, dependency: &ProjectKey, requirement: Requirement) -> bool {
        let from = self.add_node(dependent);
        let to = self.add_node(dependency);
        if self.graph.find_edge(from, to).is_some() {
            return false;
        }
        self.graph.add_edge(from, to, requirement);
        true
    }

    pub fn get(&self, key: &ProjectKey) -> Option<&Distribution> {
        self.index.get(key).map(|&idx| &self.graph[idx])
    }

    pub fn node_index(&self, key: &ProjectKey) -> Option<NodeIndex> {
        self.index.get(key).copied()
    }

    pub fn node(&self, idx: NodeIndex) -> &Distribution {
        &self.graph[idx]
    }

    /// The underlying graph, for walks.
    pub fn graph(&self) -> &DiGraph<Distribution, Requirement> {
        &self.graph
    }

    /// Requirements on the edges touching `key` in `direction`, in the order
    /// they were declared: what it requires going `Outgoing`, what requires it
    /// going `Incoming`.
    pub fn requirements(&self, key: &ProjectKey, direction: Direction) -> Vec<&Requirement> {
        let Some(&idx) = self.index.get(key) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_directed(idx, direction).collect();
        edges.sort_by_key(|e| e.id());
        edges.into_iter().map(|e| e.weight()).collect()
    }

    /// What `key` requires, in declaration order.
    pub fn dependencies(&self, key: &ProjectKey) -> Vec<&Requirement> {
        self.requirements(key, Direction::Outgoing)
    }

    /// Keys of the projects requiring `key`, in discovery order.
    pub fn dependents(&self, key: &ProjectKey) -> Vec<&ProjectKey> {
        let Some(&idx) = self.index.get(key) else {
            return Vec::new();
        };
        let mut edges: Vec<_> = self.graph.edges_directed(idx, Direction::Incoming).collect();
        edges.sort_by_key(|e| e.id());
        edges.into_iter().map(|e| &self.graph[e.source()].key).collect()
    }

    /// Keys in discovery order.
    pub fn keys(&self) -> impl Iterator<Item = &ProjectKey> {
        self.graph.node_weights().map(|d| &d.key)
    }

    /// Nodes in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &Distribution> {
        self.graph.node_weights()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }
}

/// Traversal entry points, iterated in key order for output.
pub type Selection = BTreeMap<ProjectKey, Requirement>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirement::RequirementSpec;

    fn key(name: &str) -> ProjectKey {
        ProjectKey::new(name)
    }

    fn edge(from: &str, to: &str) -> Requirement {
        Requirement::edge(key(from), &RequirementSpec::parse(to).unwrap())
    }

    #[test]
    fn upsert_creates_unfound_node_once() {
        let mut graph = Distributions::new();
        graph.upsert(&key("lib"));
        graph.upsert(&key("Lib")).version = Some("1.0".to_string());
        assert_eq!(graph.len(), 1);
        let node = graph.get(&key("lib")).unwrap();
        assert!(!node.found);
        assert_eq!(node.version.as_deref(), Some("1.0"));
    }

    #[test]
    fn keys_follow_discovery_order() {
        let mut graph = Distributions::new();
        for name in ["zeta", "alpha", "mid"] {
            graph.upsert(&key(name));
        }
        let keys: Vec<&str> = graph.keys().map(ProjectKey::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn requirements_keep_first_edge_and_declaration_order() {
        let mut graph = Distributions::new();
        assert!(graph.add_requirement(&key("app"), &key("b"), edge("app", "b>=1")));
        assert!(graph.add_requirement(&key("app"), &key("a"), edge("app", "a")));
        assert!(graph.add_requirement(&key("tool"), &key("b"), edge("tool", "b")));
        assert!(!graph.add_requirement(&key("app"), &key("b"), edge("app", "b<3")));

        let order: Vec<&str> = graph.dependencies(&key("app")).iter().map(|r| r.display_form.as_str()).collect();
        assert_eq!(order, vec!["b>=1", "a"]);
        assert_eq!(graph.dependents(&key("b")), vec![&key("app"), &key("tool")]);
        let incoming: Vec<&str> = graph
            .requirements(&key("b"), Direction::Incoming)
            .iter()
            .map(|r| r.display_form.as_str())
            .collect();
        assert_eq!(incoming, vec!["b>=1", "b"]);
        assert!(graph.dependencies(&key("nope")).is_empty());
    }

    #[test]
    fn label_falls_back_to_key() {
        let node = Distribution::new(key("Missing_Pkg"));
        assert_eq!(node.label(), "missing-pkg");
    }
}
