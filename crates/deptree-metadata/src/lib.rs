//! Installed-package metadata for deptree.
//!
//! A [`provider::MetadataProvider`] enumerates the distributions installed in
//! an environment, answers which requirements each one declares for a set of
//! extras, and whether a given requirement is currently satisfied. Two
//! providers are available: [`site_packages::SitePackages`] reads
//! `*.dist-info` and `*.egg-info` metadata from disk, and
//! [`memory::InMemoryProvider`] holds a synthetic environment for tests.

pub mod dist_info;
pub mod memory;
pub mod provider;
pub mod site_packages;
