//! Operation: report installed packages and their dependency relationships.

use deptree_graph::builder::build_distributions;
use deptree_graph::direction::Direction;
use deptree_graph::selection::{get_select_type, make_preselection, select};
use deptree_graph::traversal::{render_selection, Layout, TraversalOptions};
use deptree_metadata::provider::MetadataProvider;
use deptree_util::errors::DeptreeError;

/// Options for `deptree`.
#[derive(Debug, Clone)]
pub struct TreeOptions {
    /// Show dependents instead of dependencies.
    pub reverse: bool,
    /// One block per package instead of a nested tree.
    pub flat: bool,
    /// Requirements naming the packages to start from.
    pub projects: Vec<String>,
    /// Descend below packages with a version conflict.
    pub recurse_conflicts: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            reverse: false,
            flat: false,
            projects: Vec::new(),
            recurse_conflicts: true,
        }
    }
}

/// Render the report for everything `provider` has installed.
pub fn tree<P>(provider: &P, opts: &TreeOptions) -> miette::Result<String>
where
    P: MetadataProvider + ?Sized,
{
    let direction = Direction::from_reverse(opts.reverse);
    let preselection = make_preselection(opts.projects.as_slice(), direction)?;
    let graph = build_distributions(provider, &preselection);
    let select_type = get_select_type(!preselection.is_empty(), opts.flat, opts.reverse);
    tracing::debug!("selecting roots with {select_type:?}");
    let selection = select(&graph, &preselection, select_type, direction).map_err(log_internal)?;
    let options = TraversalOptions {
        recurse_conflicts: opts.recurse_conflicts,
    };
    let report = render_selection(&graph, &selection, direction, Layout::from_flat(opts.flat), options)
        .map_err(log_internal)?;
    Ok(report)
}

fn log_internal(err: DeptreeError) -> DeptreeError {
    if err.is_internal() {
        tracing::error!("dependency graph is inconsistent: {err}");
    }
    err
}
