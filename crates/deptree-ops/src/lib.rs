pub mod ops_env;
pub mod ops_tree;
