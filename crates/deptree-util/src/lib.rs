//! Shared utilities for deptree.
//!
//! This crate provides cross-cutting concerns used by all other deptree crates:
//! the unified error type and small filesystem helpers used when scanning an
//! installation for package metadata.

pub mod errors;
pub mod fs;
