//! Rendering the selected roots as an indented tree or a flat list.
//!
//! Every node reached is classified, in priority order, as circular (its key
//! is already on the current path), unknown (no node at all), missing
//! (referenced but not installed), conflicting (installed, but some
//! requirement on it is not satisfied) or good. Only good and conflicting
//! nodes are descended into.

use deptree_core::distribution::{Distribution, Distributions, Selection};
use deptree_core::key::ProjectKey;
use deptree_core::requirement::Requirement;
use deptree_core::INDENTATION;
use deptree_util::errors::DeptreeError;

use crate::direction::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Tree,
    Flat,
}

impl Layout {
    pub fn from_flat(flat: bool) -> Self {
        if flat {
            Self::Flat
        } else {
            Self::Tree
        }
    }
}

/// Classification of a node on one path through the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeStatus {
    Circular,
    Unknown,
    Missing,
    Conflict,
    Good,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TraversalOptions {
    /// Descend below conflicting nodes as well as good ones.
    pub recurse_conflicts: bool,
}

impl Default for TraversalOptions {
    fn default() -> Self {
        Self {
            recurse_conflicts: true,
        }
    }
}

/// Classify `key`, reached through `requirement`, with `chain` the keys
/// already on the path.
pub fn classify(
    graph: &Distributions,
    key: &ProjectKey,
    requirement: &Requirement,
    chain: &[ProjectKey],
) -> Result<NodeStatus, DeptreeError> {
    let node = graph.get(key);
    if chain.contains(key) {
        if node.is_none() {
            return Err(DeptreeError::UnknownDistributionInChain {
                key: key.to_string(),
                requirement: requirement.to_string(),
            });
        }
        return Ok(NodeStatus::Circular);
    }
    Ok(match node {
        None => NodeStatus::Unknown,
        Some(node) if !node.found => NodeStatus::Missing,
        Some(node) if !node.conflicts.is_empty() => NodeStatus::Conflict,
        Some(_) => NodeStatus::Good,
    })
}

/// Accumulates report lines for one graph.
pub struct Renderer<'g> {
    graph: &'g Distributions,
    direction: Direction,
    layout: Layout,
    options: TraversalOptions,
    output: String,
}

impl<'g> Renderer<'g> {
    pub fn new(graph: &'g Distributions, direction: Direction, layout: Layout, options: TraversalOptions) -> Self {
        Self {
            graph,
            direction,
            layout,
            options,
            output: String::new(),
        }
    }

    /// Render the report entry for one root.
    pub fn render(&mut self, requirement: &Requirement) -> Result<(), DeptreeError> {
        match self.layout {
            Layout::Tree => self.tree(requirement, &[]),
            Layout::Flat => self.flat(requirement),
        }
    }

    pub fn finish(self) -> String {
        self.output
    }

    fn tree(&mut self, requirement: &Requirement, chain: &[ProjectKey]) -> Result<(), DeptreeError> {
        let key = self.direction.target(requirement)?;
        let status = classify(self.graph, key, requirement, chain)?;
        if status == NodeStatus::Circular {
            tracing::trace!("{key} closes a cycle via {requirement}");
        }
        self.status_line(status, key, requirement, chain.len());

        let descend = match status {
            NodeStatus::Good => true,
            NodeStatus::Conflict => self.options.recurse_conflicts,
            NodeStatus::Circular | NodeStatus::Unknown | NodeStatus::Missing => false,
        };
        if descend {
            let mut next = chain.to_vec();
            next.push(key.clone());
            for edge in self.direction.edges(self.graph, key) {
                self.tree(edge, &next)?;
            }
        }
        Ok(())
    }

    fn flat(&mut self, requirement: &Requirement) -> Result<(), DeptreeError> {
        let graph = self.graph;
        let key = self.direction.target(requirement)?;
        match graph.get(key) {
            None => self.status_line(NodeStatus::Unknown, key, requirement, 0),
            Some(node) => {
                if self.direction.is_reverse() {
                    for edge in self.direction.edges(graph, key) {
                        let dependent = self.direction.target(edge)?;
                        let name = graph.get(dependent).map_or(dependent.as_str(), Distribution::label);
                        self.output.push_str(&format!("# {name}: {edge}\n"));
                    }
                }
                match classify(graph, key, requirement, &[])? {
                    NodeStatus::Good => self.output.push_str(&format!("{}\n", node.pinned())),
                    status => self.status_line(status, key, requirement, 0),
                }
                if !self.direction.is_reverse() {
                    for edge in graph.dependencies(key) {
                        self.output.push_str(&format!("# {edge}\n"));
                    }
                }
            }
        }
        self.output.push('\n');
        Ok(())
    }

    fn status_line(&mut self, status: NodeStatus, key: &ProjectKey, requirement: &Requirement, depth: usize) {
        let indent = " ".repeat(INDENTATION * depth);
        let node: Option<&Distribution> = self.graph.get(key);
        let line = match (status, node) {
            (NodeStatus::Good, Some(node)) => format!("{indent}{}  # {requirement}", node.pinned()),
            (NodeStatus::Conflict, Some(node)) => {
                format!("{indent}{}  # !!! CONFLICT {requirement}", node.pinned())
            }
            (NodeStatus::Circular, Some(node)) => {
                format!("{indent}{}  # !!! CIRCULAR {requirement}", node.label())
            }
            (NodeStatus::Missing, _) => format!("{indent}{key}  # !!! MISSING {requirement}"),
            _ => format!("{indent}{key}  # !!! UNKNOWN {requirement}"),
        };
        self.output.push_str(&line);
        self.output.push('\n');
    }
}

/// Render every root of `selection`, in key order.
pub fn render_selection(
    graph: &Distributions,
    selection: &Selection,
    direction: Direction,
    layout: Layout,
    options: TraversalOptions,
) -> Result<String, DeptreeError> {
    let mut renderer = Renderer::new(graph, direction, layout, options);
    for requirement in selection.values() {
        renderer.render(requirement)?;
    }
    Ok(renderer.finish())
}
