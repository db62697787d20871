//! A provider over a synthetic, in-memory environment.

use deptree_core::key::ProjectKey;
use deptree_core::marker::{Marker, MarkerEnvironment, MarkerValue};
use deptree_core::requirement::RequirementSpec;
use deptree_util::errors::DeptreeError;

use crate::provider::{InstalledDistribution, MetadataProvider};

/// Distributions held in memory, parsed the same way as on-disk metadata.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    distributions: Vec<InstalledDistribution>,
    environment: MarkerEnvironment,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider from `(name, version, requirements)` rows.
    pub fn from_table(rows: &[(&str, &str, &[&str])]) -> Result<Self, DeptreeError> {
        rows.iter()
            .try_fold(Self::new(), |provider, (name, version, requires)| {
                provider.with_distribution(name, version, requires)
            })
    }

    /// Add an installed distribution declaring `requires`. A project already
    /// present keeps its first definition.
    pub fn with_distribution(mut self, name: &str, version: &str, requires: &[&str]) -> Result<Self, DeptreeError> {
        let mut dist = InstalledDistribution::new(name, version);
        for text in requires {
            let spec = RequirementSpec::parse(text)?;
            if let Some(marker) = &spec.marker {
                collect_extras(marker, &mut dist);
            }
            dist.requires_dist.push(spec);
        }
        self.push(dist);
        Ok(self)
    }

    /// Set a marker variable, e.g. `python_version`.
    pub fn with_marker(mut self, variable: &str, value: &str) -> Self {
        self.environment.set(variable, value);
        self
    }

    pub fn push(&mut self, dist: InstalledDistribution) {
        if self.distributions.iter().any(|d| d.key == dist.key) {
            tracing::debug!("{} already installed, ignoring duplicate", dist.key);
            return;
        }
        self.distributions.push(dist);
    }
}

/// Record every `extra == "..."` the marker mentions as a provided extra.
fn collect_extras(marker: &Marker, dist: &mut InstalledDistribution) {
    match marker {
        Marker::And(a, b) | Marker::Or(a, b) => {
            collect_extras(a, dist);
            collect_extras(b, dist);
        }
        Marker::Compare { left, right, .. } => {
            if let (MarkerValue::Variable(var), MarkerValue::Literal(extra))
            | (MarkerValue::Literal(extra), MarkerValue::Variable(var)) = (left, right)
            {
                if var == "extra" {
                    dist.provides_extras.insert(ProjectKey::new(extra).to_string());
                }
            }
        }
    }
}

impl MetadataProvider for InMemoryProvider {
    fn installed(&self) -> &[InstalledDistribution] {
        &self.distributions
    }

    fn marker_environment(&self) -> &MarkerEnvironment {
        &self.environment
    }
}
