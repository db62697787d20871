//! CLI argument definitions for deptree.

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "deptree",
    version,
    about = "Display the dependency tree of installed Python packages",
    long_about = "deptree shows which installed packages depend on which, forward or in reverse, \
                  as a tree or a flat list, flagging version conflicts, missing packages and cycles."
)]
pub struct Cli {
    /// Show dependents instead of dependencies
    #[arg(short, long)]
    pub reverse: bool,

    /// One block per package with its direct dependencies (or dependents)
    #[arg(short, long)]
    pub flat: bool,

    /// Site-packages directory to inspect (repeatable)
    #[arg(short, long = "path", value_name = "DIR")]
    pub paths: Vec<PathBuf>,

    /// Stop descending at packages with a version conflict
    #[arg(long)]
    pub no_recurse_conflicts: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Packages to start from, as requirements (e.g. `requests[socks]`)
    #[arg(value_name = "PROJECT")]
    pub projects: Vec<String>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
