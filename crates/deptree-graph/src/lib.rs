//! Dependency graph engine: builds the as-installed graph from a metadata
//! provider, selects the entry points of the report, and walks the graph
//! forward or in reverse, as a tree or a flat list, classifying every node.

pub mod builder;
pub mod direction;
pub mod orphans;
pub mod selection;
pub mod traversal;
