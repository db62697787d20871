use std::fmt;

/// Canonical identifier of a project: the unique key of the graph.
///
/// Names are lowercased and every run of `-`, `_` and `.` collapses into a
/// single `-`, so `Foo_Bar`, `foo.bar` and `FOO--bar` all share one node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProjectKey(String);

impl ProjectKey {
    pub fn new(name: &str) -> Self {
        let mut key = String::with_capacity(name.len());
        let mut in_separator = false;
        for ch in name.trim().chars() {
            if matches!(ch, '-' | '_' | '.') {
                in_separator = true;
                continue;
            }
            if in_separator && !key.is_empty() {
                key.push('-');
            }
            in_separator = false;
            key.extend(ch.to_lowercase());
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProjectKey {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}
