use std::collections::BTreeSet;
use std::fmt;

use deptree_util::errors::DeptreeError;

use crate::key::ProjectKey;
use crate::marker::Marker;
use crate::version::SpecifierSet;

/// Display form of a synthetic requirement that no package declared.
pub const PLACEHOLDER: &str = "-";

/// A requirement specifier as declared in package metadata or typed by the
/// user: `name[extra,...] <specifiers> ; <marker>` or `name @ <url>`.
#[derive(Debug, Clone)]
pub struct RequirementSpec {
    /// Project name as written.
    pub name: String,
    pub key: ProjectKey,
    pub extras: BTreeSet<String>,
    pub specifiers: SpecifierSet,
    pub url: Option<String>,
    pub marker: Option<Marker>,
}

impl RequirementSpec {
    pub fn parse(text: &str) -> Result<Self, DeptreeError> {
        let invalid = |why: &str| DeptreeError::Requirement {
            message: format!("'{}': {why}", text.trim()),
        };
        let text = text.trim();

        let name_end = text
            .find(|c: char| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
            .unwrap_or(text.len());
        let name = &text[..name_end];
        let starts_ok = name.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
        let ends_ok = name.chars().last().is_some_and(|c| c.is_ascii_alphanumeric());
        if !starts_ok || !ends_ok {
            return Err(invalid("expected a project name"));
        }

        let mut rest = text[name_end..].trim_start();
        let mut extras = BTreeSet::new();
        if let Some(tail) = rest.strip_prefix('[') {
            let (inside, after) = tail.split_once(']').ok_or_else(|| invalid("missing ']'"))?;
            for extra in inside.split(',').map(str::trim).filter(|e| !e.is_empty()) {
                if !extra.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')) {
                    return Err(invalid("invalid extra name"));
                }
                extras.insert(extra.to_string());
            }
            rest = after.trim_start();
        }

        let (url, specifiers, marker_text) = if let Some(tail) = rest.strip_prefix('@') {
            // A ';' only starts the marker when preceded by whitespace, URLs may contain it.
            let tail = tail.trim_start();
            let split = tail
                .char_indices()
                .find(|&(i, c)| c == ';' && i > 0 && tail[..i].ends_with(char::is_whitespace))
                .map(|(i, _)| i);
            let (url, marker) = match split {
                Some(i) => (tail[..i].trim(), Some(&tail[i + 1..])),
                None => (tail.trim(), None),
            };
            if url.is_empty() {
                return Err(invalid("missing URL after '@'"));
            }
            (Some(url.to_string()), SpecifierSet::default(), marker)
        } else {
            let (spec_text, marker) = match rest.split_once(';') {
                Some((spec, marker)) => (spec.trim(), Some(marker)),
                None => (rest.trim(), None),
            };
            let spec_text = match spec_text.strip_prefix('(') {
                Some(inner) => inner.strip_suffix(')').ok_or_else(|| invalid("missing ')'"))?,
                None => spec_text,
            };
            (None, SpecifierSet::parse(spec_text)?, marker)
        };

        let marker = match marker_text.map(str::trim) {
            Some("") => return Err(invalid("empty marker after ';'")),
            Some(m) => Some(Marker::parse(m)?),
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            key: ProjectKey::new(name),
            extras,
            specifiers,
            url,
            marker,
        })
    }
}

impl fmt::Display for RequirementSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            let extras: Vec<&str> = self.extras.iter().map(String::as_str).collect();
            write!(f, "[{}]", extras.join(","))?;
        }
        match &self.url {
            Some(url) => {
                write!(f, " @ {url}")?;
                if self.marker.is_some() {
                    f.write_str(" ")?;
                }
            }
            None => write!(f, "{}", self.specifiers)?,
        }
        if let Some(marker) = &self.marker {
            write!(f, "; {marker}")?;
        }
        Ok(())
    }
}

/// A directed edge of the dependency graph: `dependent` requires `dependency`.
///
/// Edges discovered from package metadata always carry both keys. Roots made
/// up by the selection step leave one side empty: forward roots have no
/// dependent, reverse roots have no dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Requirement {
    pub dependent_key: Option<ProjectKey>,
    pub dependency_key: Option<ProjectKey>,
    /// Extras this edge activates on the dependency.
    pub extras: BTreeSet<String>,
    /// Requirement text echoed in the report.
    pub display_form: String,
}

impl Requirement {
    /// An edge declared by `dependent`.
    pub fn edge(dependent: ProjectKey, spec: &RequirementSpec) -> Self {
        Self {
            dependent_key: Some(dependent),
            dependency_key: Some(spec.key.clone()),
            extras: spec.extras.clone(),
            display_form: spec.to_string(),
        }
    }

    /// A forward root typed by the user, keeping its extras and text.
    pub fn user_root(spec: &RequirementSpec) -> Self {
        Self {
            dependent_key: None,
            dependency_key: Some(spec.key.clone()),
            extras: spec.extras.clone(),
            display_form: spec.to_string(),
        }
    }

    /// A synthetic forward root for `key`, displayed as the bare key.
    pub fn forward_root(key: &ProjectKey) -> Self {
        Self {
            dependent_key: None,
            dependency_key: Some(key.clone()),
            extras: BTreeSet::new(),
            display_form: key.to_string(),
        }
    }

    /// A synthetic reverse root for `key`.
    pub fn reverse_root(key: &ProjectKey) -> Self {
        Self {
            dependent_key: Some(key.clone()),
            dependency_key: None,
            extras: BTreeSet::new(),
            display_form: PLACEHOLDER.to_string(),
        }
    }

    /// Synthetic root in the requested direction.
    pub fn root(key: &ProjectKey, reverse: bool) -> Self {
        if reverse {
            Self::reverse_root(key)
        } else {
            Self::forward_root(key)
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_form)
    }
}
