//! Command dispatch and handler modules.

mod tree;

use miette::Result;

use crate::cli::Cli;

/// Route a parsed CLI invocation to the command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    tree::exec(cli.paths, cli.projects, cli.reverse, cli.flat, cli.no_recurse_conflicts)
}
