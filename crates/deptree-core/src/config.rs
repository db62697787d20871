use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Global user configuration loaded from `~/.deptree/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub environment: EnvironmentConfig,

    /// Overrides for environment-marker variables, e.g. `python_version`.
    #[serde(default)]
    pub markers: BTreeMap<String, String>,

    #[serde(default)]
    pub tree: TreeConfig,
}

/// Where to look for installed packages, from `[environment]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    /// Site-packages directories scanned in order.
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

/// Report settings from `[tree]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// Keep descending below a node whose installed version conflicts with
    /// some requirement on it.
    #[serde(default = "default_recurse_conflicts", rename = "recurse-conflicts")]
    pub recurse_conflicts: bool,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            recurse_conflicts: default_recurse_conflicts(),
        }
    }
}

fn default_recurse_conflicts() -> bool {
    true
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        Self::from_path(&Self::default_path())
    }

    /// Load configuration from `path`, or return defaults if it doesn't exist.
    pub fn from_path(path: &Path) -> miette::Result<Self> {
        if !path.is_file() {
            tracing::debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content =
            std::fs::read_to_string(path).map_err(|e| deptree_util::errors::DeptreeError::Config {
                message: format!("Failed to read {}: {e}", path.display()),
            })?;
        toml::from_str(&content).map_err(|e| {
            deptree_util::errors::DeptreeError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the deptree data directory: `$DEPTREE_HOME`, else `~/.deptree/`.
pub fn dirs_path() -> PathBuf {
    if let Some(home) = std::env::var_os("DEPTREE_HOME") {
        return PathBuf::from(home);
    }
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".deptree")
}
