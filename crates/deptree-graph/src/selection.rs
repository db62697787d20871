//! Choosing which nodes the report starts from.

use deptree_core::distribution::{Distributions, Selection};
use deptree_core::requirement::{Requirement, RequirementSpec};
use deptree_util::errors::DeptreeError;
use petgraph::visit::Dfs;

use crate::direction::Direction;
use crate::orphans::resolve_orphans;

/// How the roots of the report are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectType {
    /// Every node in the graph.
    All,
    /// Nodes without dependencies, plus one root per unreachable component.
    Bottom,
    /// Everything reachable from the projects the user named.
    Flat,
    /// Exactly the projects the user named.
    User,
    /// Nodes without dependents, plus one root per unreachable component.
    Top,
}

pub fn get_select_type(has_preselection: bool, is_flat: bool, is_reverse: bool) -> SelectType {
    match (has_preselection, is_flat, is_reverse) {
        (false, false, false) => SelectType::Top,
        (false, false, true) => SelectType::Bottom,
        (false, true, _) => SelectType::All,
        (true, false, _) => SelectType::User,
        (true, true, _) => SelectType::Flat,
    }
}

/// Turn the project arguments into root requirements.
///
/// Going forward the typed requirement is kept so its extras and text show up
/// in the report; going in reverse only the key matters.
pub fn make_preselection<S: AsRef<str>>(projects: &[S], direction: Direction) -> Result<Selection, DeptreeError> {
    let mut selection = Selection::new();
    for project in projects {
        let spec = RequirementSpec::parse(project.as_ref())?;
        let requirement = match direction {
            Direction::Forward => Requirement::user_root(&spec),
            Direction::Reverse => Requirement::reverse_root(&spec.key),
        };
        selection.insert(spec.key, requirement);
    }
    Ok(selection)
}

/// Compute the roots of the report.
pub fn select(
    graph: &Distributions,
    preselection: &Selection,
    select_type: SelectType,
    direction: Direction,
) -> Result<Selection, DeptreeError> {
    let mut selection = preselection.clone();
    match select_type {
        SelectType::User => {}
        SelectType::All => {
            for key in graph.keys() {
                selection
                    .entry(key.clone())
                    .or_insert_with(|| direction.root(key));
            }
        }
        SelectType::Top => {
            for node in graph.iter() {
                if graph.dependents(&node.key).is_empty() {
                    selection
                        .entry(node.key.clone())
                        .or_insert_with(|| Requirement::forward_root(&node.key));
                }
            }
            resolve_orphans(graph, &mut selection, Direction::Forward)?;
        }
        SelectType::Bottom => {
            for node in graph.iter() {
                if graph.dependencies(&node.key).is_empty() {
                    selection
                        .entry(node.key.clone())
                        .or_insert_with(|| Requirement::reverse_root(&node.key));
                }
            }
            resolve_orphans(graph, &mut selection, Direction::Reverse)?;
        }
        SelectType::Flat => {
            // Keys already selected keep their requirement.
            let mut dfs = Dfs::empty(graph.graph());
            for requirement in preselection.values() {
                let Some(start) = graph.node_index(direction.target(requirement)?) else {
                    continue;
                };
                for reached in direction.walk(graph, &mut dfs, start) {
                    let key = &graph.node(reached).key;
                    selection
                        .entry(key.clone())
                        .or_insert_with(|| direction.root(key));
                }
            }
        }
    }
    tracing::debug!("{select_type:?} selection has {} roots", selection.len());
    Ok(selection)
}
