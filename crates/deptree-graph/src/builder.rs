//! Graph construction from a metadata provider.

use deptree_core::distribution::{Distributions, Selection};
use deptree_core::requirement::Requirement;
use deptree_metadata::provider::{MetadataProvider, Satisfaction};

/// Build the full graph of installed and referenced projects.
///
/// Every installed distribution becomes a found node; every project named by
/// some requirement gets a node too, left unfound when it is not installed.
/// Extras requested on a project by `preselection` widen the requirements
/// read for it.
pub fn build_distributions<P>(provider: &P, preselection: &Selection) -> Distributions
where
    P: MetadataProvider + ?Sized,
{
    let mut graph = Distributions::new();
    for installed in provider.installed() {
        let key = installed.key.clone();
        let node = graph.upsert(&key);
        node.found = true;
        node.project_name = Some(installed.project_name.clone());
        node.version = Some(installed.version.clone());

        let extras = preselection
            .get(&key)
            .map(|r| r.extras.clone())
            .unwrap_or_default();

        for spec in provider.requires(installed, &extras) {
            let dependency_key = &spec.key;
            let requirement = Requirement::edge(key.clone(), &spec);
            if !graph.add_requirement(&key, dependency_key, requirement) {
                tracing::debug!("{key} declares {dependency_key} more than once, keeping the first");
                continue;
            }
            match provider.satisfaction(&spec) {
                Satisfaction::VersionConflict => {
                    tracing::debug!("{key} requires {spec}: version conflict");
                    graph.upsert(dependency_key).conflicts.push(key.clone());
                }
                Satisfaction::NotFound => tracing::debug!("{key} requires {spec}: not installed"),
                Satisfaction::Satisfied => tracing::trace!("{key} requires {spec}"),
            }
        }
    }
    tracing::debug!("graph built with {} nodes", graph.len());
    graph
}
