//! The metadata-provider seam between an installation and the graph builder.

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use deptree_core::key::ProjectKey;
use deptree_core::marker::MarkerEnvironment;
use deptree_core::requirement::RequirementSpec;

/// One installed distribution as described by its metadata.
#[derive(Debug, Clone)]
pub struct InstalledDistribution {
    pub key: ProjectKey,
    pub project_name: String,
    pub version: String,
    /// Every declared requirement, including those gated behind extras or
    /// markers, in declaration order.
    pub requires_dist: Vec<RequirementSpec>,
    /// Extras the distribution declares, normalised.
    pub provides_extras: BTreeSet<String>,
    /// Metadata directory the distribution was read from, if any.
    pub location: Option<PathBuf>,
}

impl InstalledDistribution {
    pub fn new(project_name: &str, version: &str) -> Self {
        Self {
            key: ProjectKey::new(project_name),
            project_name: project_name.to_string(),
            version: version.to_string(),
            requires_dist: Vec::new(),
            provides_extras: BTreeSet::new(),
            location: None,
        }
    }
}

/// Whether an installed distribution satisfies a requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Satisfaction {
    Satisfied,
    VersionConflict,
    NotFound,
}

/// Source of installed distributions and their declared requirements.
pub trait MetadataProvider {
    /// Installed distributions in enumeration order, one per key.
    fn installed(&self) -> &[InstalledDistribution];

    /// Marker variables used to decide which requirements apply.
    fn marker_environment(&self) -> &MarkerEnvironment;

    fn find(&self, key: &ProjectKey) -> Option<&InstalledDistribution> {
        self.installed().iter().find(|d| &d.key == key)
    }

    /// Requirements `dist` declares when `extras` are requested.
    ///
    /// A requirement applies when it has no marker, or its marker holds for
    /// the base install (`extra == ""`) or for one of the requested extras.
    fn requires(&self, dist: &InstalledDistribution, extras: &BTreeSet<String>) -> Vec<RequirementSpec> {
        let env = self.marker_environment();
        let extras: Vec<String> = extras.iter().map(|e| ProjectKey::new(e).to_string()).collect();
        for extra in &extras {
            if !dist.provides_extras.contains(extra) {
                tracing::warn!("{} {} does not provide the extra '{extra}'", dist.project_name, dist.version);
            }
        }

        let mut seen = HashSet::new();
        dist.requires_dist
            .iter()
            .filter(|spec| match &spec.marker {
                None => true,
                Some(marker) => marker.evaluate(env, "") || extras.iter().any(|e| marker.evaluate(env, e)),
            })
            .filter(|spec| seen.insert(spec.to_string()))
            .cloned()
            .collect()
    }

    /// Check `spec` against what is installed.
    fn satisfaction(&self, spec: &RequirementSpec) -> Satisfaction {
        match self.find(&spec.key) {
            None => Satisfaction::NotFound,
            Some(dist) if spec.url.is_some() || spec.specifiers.matches(&dist.version) => Satisfaction::Satisfied,
            Some(dist) => {
                tracing::debug!("{} {} does not satisfy {spec}", dist.project_name, dist.version);
                Satisfaction::VersionConflict
            }
        }
    }
}
