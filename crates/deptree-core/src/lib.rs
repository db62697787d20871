//! Core data types for deptree.
//!
//! This crate defines the dependency-graph model reported by deptree
//! (project keys, requirement edges, distribution nodes, selections), the
//! requirement-specifier grammar, version ordering, environment markers,
//! and the global configuration.
//!
//! This crate does no filesystem scanning; see `deptree-metadata` for that.

/// Number of spaces per tree depth level in rendered output.
pub const INDENTATION: usize = 2;

pub mod config;
pub mod distribution;
pub mod key;
pub mod marker;
pub mod requirement;
pub mod version;
