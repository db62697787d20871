//! The on-disk provider: distributions found in site-packages directories.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use deptree_core::config::EnvironmentConfig;
use deptree_core::marker::MarkerEnvironment;
use deptree_util::errors::{DeptreeError, DeptreeResult};
use deptree_util::fs::{file_name_str, sorted_entries};

use crate::dist_info::{read_dist_info, read_egg_info};
use crate::provider::{InstalledDistribution, MetadataProvider};

/// Distributions installed across one or more site-packages directories.
#[derive(Debug, Clone)]
pub struct SitePackages {
    dirs: Vec<PathBuf>,
    distributions: Vec<InstalledDistribution>,
    environment: MarkerEnvironment,
}

impl SitePackages {
    /// Scan `dirs` in order. When the same project is installed in more than
    /// one place, the first one found shadows the others.
    pub fn scan(dirs: &[PathBuf], environment: MarkerEnvironment) -> DeptreeResult<Self> {
        let mut distributions: Vec<InstalledDistribution> = Vec::new();
        let mut seen = HashSet::new();
        for dir in dirs {
            if !dir.is_dir() {
                return Err(DeptreeError::Environment {
                    message: format!("{} is not a directory", dir.display()),
                }
                .into());
            }
            for entry in sorted_entries(dir)? {
                let Some(name) = file_name_str(&entry) else {
                    continue;
                };
                let dist = if name.ends_with(".dist-info") && entry.is_dir() {
                    read_dist_info(&entry)?
                } else if name.ends_with(".egg-info") {
                    read_egg_info(&entry)?
                } else {
                    continue;
                };
                let Some(dist) = dist else {
                    continue;
                };
                if !seen.insert(dist.key.clone()) {
                    let winner = distributions
                        .iter()
                        .find(|d| d.key == dist.key)
                        .and_then(|d| d.location.as_deref())
                        .map_or_else(|| "an earlier install".to_string(), |p| p.display().to_string());
                    tracing::debug!(
                        "{} {} at {} is shadowed by {winner}",
                        dist.project_name,
                        dist.version,
                        entry.display()
                    );
                    continue;
                }
                tracing::debug!("found {} {} in {}", dist.project_name, dist.version, dir.display());
                distributions.push(dist);
            }
        }
        tracing::debug!("{} distributions installed", distributions.len());
        Ok(Self {
            dirs: dirs.to_vec(),
            distributions,
            environment,
        })
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

impl MetadataProvider for SitePackages {
    fn installed(&self) -> &[InstalledDistribution] {
        &self.distributions
    }

    fn marker_environment(&self) -> &MarkerEnvironment {
        &self.environment
    }
}

/// Choose the directories to scan: explicit paths first, then configured
/// ones, then the active virtualenv.
pub fn discover_dirs(explicit: &[PathBuf], config: &EnvironmentConfig) -> DeptreeResult<Vec<PathBuf>> {
    if !explicit.is_empty() {
        return Ok(explicit.to_vec());
    }
    if !config.paths.is_empty() {
        return Ok(config.paths.clone());
    }
    if let Some(venv) = std::env::var_os("VIRTUAL_ENV") {
        let dirs = venv_site_packages(Path::new(&venv))?;
        if !dirs.is_empty() {
            return Ok(dirs);
        }
        tracing::warn!("no site-packages found under VIRTUAL_ENV={}", Path::new(&venv).display());
    }
    Err(DeptreeError::Environment {
        message: "no site-packages directory to inspect".to_string(),
    }
    .into())
}

/// Site-packages directories of a virtualenv rooted at `root`.
pub fn venv_site_packages(root: &Path) -> DeptreeResult<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    let windows = root.join("Lib").join("site-packages");
    if windows.is_dir() {
        dirs.push(windows);
    }
    for entry in sorted_entries(&root.join("lib"))? {
        let candidate = entry.join("site-packages");
        if file_name_str(&entry).is_some_and(|n| n.starts_with("python")) && candidate.is_dir() {
            dirs.push(candidate);
        }
    }
    Ok(dirs)
}

/// Infer `X.Y` from a `pythonX.Y` component of a site-packages path.
pub fn infer_python_version(dir: &Path) -> Option<String> {
    dir.components().rev().find_map(|c| {
        let version = c.as_os_str().to_str()?.strip_prefix("python")?;
        let mut parts = version.split('.');
        let major = parts.next().filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))?;
        let minor = parts.next().filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))?;
        Some(format!("{major}.{minor}"))
    })
}

/// Marker environment for scanning `dirs`: the host platform, the Python
/// version implied by the directory layout, then explicit overrides.
pub fn marker_environment_for(dirs: &[PathBuf], overrides: &BTreeMap<String, String>) -> MarkerEnvironment {
    let mut env = MarkerEnvironment::host();
    if let Some(version) = dirs.iter().find_map(|d| infer_python_version(d)) {
        env.set("python_version", &version);
        env.set("python_full_version", &format!("{version}.0"));
        env.set("implementation_version", &format!("{version}.0"));
    }
    env.merge(overrides);
    if env.get("python_version").map_or(true, str::is_empty) {
        tracing::warn!(
            "could not tell the Python version of {}; requirements conditioned on it are all kept \
             (set python_version under [markers] in the config to decide them)",
            dirs.iter().map(|d| d.display().to_string()).collect::<Vec<_>>().join(", ")
        );
    }
    env
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_python_version_from_layout() {
        let dir = Path::new("/venv/lib/python3.11/site-packages");
        assert_eq!(infer_python_version(dir).as_deref(), Some("3.11"));
        assert_eq!(infer_python_version(Path::new("/opt/site-packages")), None);
        assert_eq!(infer_python_version(Path::new("/lib/pythonista/site-packages")), None);
    }

    #[test]
    fn overrides_win_over_inferred_values() {
        let dirs = vec![PathBuf::from("/venv/lib/python3.9/site-packages")];
        let mut overrides = BTreeMap::new();
        overrides.insert("python_version".to_string(), "3.12".to_string());
        let env = marker_environment_for(&dirs, &overrides);
        assert_eq!(env.get("python_version"), Some("3.12"));
        assert_eq!(env.get("python_full_version"), Some("3.9.0"));
    }

    #[test]
    fn major_only_layout_leaves_version_unknown() {
        let dirs = vec![PathBuf::from("/usr/lib/python3/dist-packages")];
        assert_eq!(infer_python_version(&dirs[0]), None);
        let env = marker_environment_for(&dirs, &BTreeMap::new());
        assert_eq!(env.get("python_version"), None);
    }

    #[test]
    fn explicit_dirs_take_priority() {
        let explicit = vec![PathBuf::from("/a")];
        let config = EnvironmentConfig {
            paths: vec![PathBuf::from("/b")],
        };
        assert_eq!(discover_dirs(&explicit, &config).unwrap(), explicit);
        assert_eq!(discover_dirs(&[], &config).unwrap(), vec![PathBuf::from("/b")]);
    }
}
