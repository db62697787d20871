//! Handler for `deptree`.

use std::path::PathBuf;

use miette::Result;

use deptree_core::config::GlobalConfig;
use deptree_ops::ops_env;
use deptree_ops::ops_tree::{self, TreeOptions};

pub fn exec(
    paths: Vec<PathBuf>,
    projects: Vec<String>,
    reverse: bool,
    flat: bool,
    no_recurse_conflicts: bool,
) -> Result<()> {
    let config = GlobalConfig::load()?;
    let site_packages = ops_env::open_site_packages(&paths, &config)?;

    let opts = TreeOptions {
        reverse,
        flat,
        projects,
        recurse_conflicts: config.tree.recurse_conflicts && !no_recurse_conflicts,
    };

    print!("{}", ops_tree::tree(&site_packages, &opts)?);
    Ok(())
}
