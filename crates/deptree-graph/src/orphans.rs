//! Making sure components with no natural entry point still get a root.
//!
//! A pure cycle (`a -> b -> a` with nothing outside it) has no node without
//! dependents and no node without dependencies, so neither the top nor the
//! bottom scan selects anything for it.

use deptree_core::distribution::{Distributions, Selection};
use deptree_util::errors::DeptreeError;
use petgraph::visit::{Dfs, VisitMap};

use crate::direction::Direction;

/// Upper bound on the number of extra roots added in one pass.
pub const MAX_ORPHAN_ROOTS: usize = 99;

/// Add a synthetic root for every component of `graph` that `selection`
/// cannot reach in `direction`. Returns the number of roots added.
pub fn resolve_orphans(
    graph: &Distributions,
    selection: &mut Selection,
    direction: Direction,
) -> Result<usize, DeptreeError> {
    let mut dfs = Dfs::empty(graph.graph());
    for requirement in selection.values() {
        if let Some(start) = graph.node_index(direction.target(requirement)?) {
            direction.walk(graph, &mut dfs, start);
        }
    }

    let mut added = 0;
    while added < MAX_ORPHAN_ROOTS {
        let Some(orphan) = graph.graph().node_indices().find(|idx| !dfs.discovered.is_visited(idx)) else {
            return Ok(added);
        };
        let key = &graph.node(orphan).key;
        tracing::debug!("{key} is unreachable from the selection, adding it as a root");
        selection.insert(key.clone(), direction.root(key));
        direction.walk(graph, &mut dfs, orphan);
        added += 1;
    }
    if graph.graph().node_indices().any(|idx| !dfs.discovered.is_visited(&idx)) {
        tracing::warn!("stopped adding roots after {MAX_ORPHAN_ROOTS}; some packages are not shown");
    }
    Ok(added)
}
