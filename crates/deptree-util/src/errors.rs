use miette::Diagnostic;
use thiserror::Error;

/// Unified error type for all deptree operations.
#[derive(Debug, Error, Diagnostic)]
pub enum DeptreeError {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or unreadable configuration file.
    #[error("Configuration error: {message}")]
    #[diagnostic(help("Check ~/.deptree/config.toml (or $DEPTREE_HOME/config.toml) for syntax errors"))]
    Config { message: String },

    /// A requirement specifier could not be parsed.
    #[error("Invalid requirement: {message}")]
    #[diagnostic(help("Requirements look like `name`, `name[extra]>=1.0` or `name==2.*; python_version >= \"3.8\"`"))]
    Requirement { message: String },

    /// No installation to inspect could be located.
    #[error("Environment error: {message}")]
    #[diagnostic(help("Pass --path <site-packages>, set [environment] paths in the config, or activate a virtualenv"))]
    Environment { message: String },

    /// A requirement used in a forward context has no dependency key.
    #[error("Invalid forward requirement: {requirement}")]
    InvalidForwardRequirement { requirement: String },

    /// A requirement used in a reverse context has no dependent key.
    #[error("Invalid reverse requirement: {requirement}")]
    InvalidReverseRequirement { requirement: String },

    /// A key in the traversal chain has no node in the graph.
    #[error("Distribution '{key}' is in the traversal chain but not in the graph (reached via {requirement})")]
    UnknownDistributionInChain { key: String, requirement: String },
}

impl DeptreeError {
    /// Whether this error is a broken graph or selection invariant rather
    /// than a problem with the inspected environment.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::InvalidForwardRequirement { .. }
                | Self::InvalidReverseRequirement { .. }
                | Self::UnknownDistributionInChain { .. }
        )
    }
}

/// Convenience alias for `miette::Result<T>`.
pub type DeptreeResult<T> = miette::Result<T>;
