//! Operation: locate and scan the installation to report on.

use std::path::PathBuf;

use deptree_core::config::GlobalConfig;
use deptree_metadata::site_packages::{discover_dirs, marker_environment_for, SitePackages};

/// Scan the site-packages directories chosen from `paths`, the configuration,
/// or the active virtualenv, in that order of preference.
pub fn open_site_packages(paths: &[PathBuf], config: &GlobalConfig) -> miette::Result<SitePackages> {
    let dirs = discover_dirs(paths, &config.environment)?;
    let environment = marker_environment_for(&dirs, &config.markers);
    let site_packages = SitePackages::scan(&dirs, environment)?;
    for dir in site_packages.dirs() {
        tracing::debug!("inspected {}", dir.display());
    }
    Ok(site_packages)
}
