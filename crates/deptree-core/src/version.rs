//! Package version parsing, comparison, and specifier matching.
//!
//! Versions follow the public version scheme used by Python packaging:
//! - `[N!]N(.N)*[{a|b|rc}N][.postN][.devN][+local]`
//! - Release segments compare numerically, trailing zeros are insignificant
//! - Within one release: `.devN` < `aN` < `bN` < `rcN` < final < `.postN`
//! - A local label (`+ubuntu.1`) sorts after the same version without one
//!
//! Spelling variants (`alpha`, `preview`, `c`, `rev`, `-1`, `v1.0`) are
//! normalised while parsing.

use std::cmp::Ordering;
use std::fmt;

use deptree_util::errors::DeptreeError;

/// A parsed version with comparable segments.
#[derive(Debug, Clone)]
pub struct Version {
    pub original: String,
    epoch: u64,
    release: Vec<u64>,
    pre: Option<(PreKind, u64)>,
    post: Option<u64>,
    dev: Option<u64>,
    local: Option<Vec<LocalSegment>>,
}

/// Pre-release phase.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum PreKind {
    Alpha,
    Beta,
    Rc,
}

#[derive(Debug, Clone, Eq, PartialEq, Ord, PartialOrd)]
enum LocalSegment {
    Text(String),
    Number(u64),
}

/// Position of a version within its release, used for ordering.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd)]
enum PreKey {
    DevOfRelease,
    Pre(PreKind, u64),
    Final,
}

impl Version {
    /// Parse a version string, returning `None` when it does not follow the
    /// version scheme.
    pub fn parse(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase();
        let s = normalized.strip_prefix('v').unwrap_or(&normalized);

        let (public, local) = match s.split_once('+') {
            Some((public, local)) => (public, Some(parse_local(local)?)),
            None => (s, None),
        };

        let (epoch, rest) = match public.split_once('!') {
            Some((epoch, rest)) => (epoch.parse::<u64>().ok()?, rest),
            None => (0, public),
        };

        let (first, mut rest) = take_number(rest);
        let mut release = vec![first?];
        while let Some(tail) = rest.strip_prefix('.') {
            match take_number(tail) {
                (Some(n), r) => {
                    release.push(n);
                    rest = r;
                }
                (None, _) => break,
            }
        }

        let (pre, rest) = parse_pre(rest);
        let (post, rest) = parse_post(rest);
        let (dev, rest) = parse_dev(rest);
        if !rest.is_empty() {
            return None;
        }

        Some(Self {
            original: text.trim().to_string(),
            epoch,
            release,
            pre,
            post,
            dev,
            local,
        })
    }

    pub fn is_prerelease(&self) -> bool {
        self.pre.is_some() || self.dev.is_some()
    }

    pub fn is_postrelease(&self) -> bool {
        self.post.is_some()
    }

    pub fn has_local(&self) -> bool {
        self.local.is_some()
    }

    /// The same version with any local label removed.
    pub fn public(&self) -> Self {
        Self {
            local: None,
            ..self.clone()
        }
    }

    fn same_release(&self, other: &Self) -> bool {
        self.epoch == other.epoch && compare_release(&self.release, &other.release) == Ordering::Equal
    }

    fn pre_key(&self) -> PreKey {
        match (self.pre, self.post, self.dev) {
            (Some((kind, n)), _, _) => PreKey::Pre(kind, n),
            (None, None, Some(_)) => PreKey::DevOfRelease,
            _ => PreKey::Final,
        }
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.epoch
            .cmp(&other.epoch)
            .then_with(|| compare_release(&self.release, &other.release))
            .then_with(|| self.pre_key().cmp(&other.pre_key()))
            .then_with(|| self.post.cmp(&other.post))
            // A missing dev segment sorts after any dev segment.
            .then_with(|| {
                (self.dev.is_none(), self.dev).cmp(&(other.dev.is_none(), other.dev))
            })
            .then_with(|| self.local.cmp(&other.local))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

fn compare_release(a: &[u64], b: &[u64]) -> Ordering {
    let max_len = a.len().max(b.len());
    for i in 0..max_len {
        let ord = a.get(i).unwrap_or(&0).cmp(b.get(i).unwrap_or(&0));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    Ordering::Equal
}

fn take_number(s: &str) -> (Option<u64>, &str) {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    if end == 0 {
        return (None, s);
    }
    (s[..end].parse().ok(), &s[end..])
}

fn strip_separator(s: &str) -> &str {
    s.strip_prefix(['.', '-', '_']).unwrap_or(s)
}

fn parse_pre(s: &str) -> (Option<(PreKind, u64)>, &str) {
    let body = strip_separator(s);
    const LABELS: [(&str, PreKind); 8] = [
        ("alpha", PreKind::Alpha),
        ("a", PreKind::Alpha),
        ("beta", PreKind::Beta),
        ("b", PreKind::Beta),
        ("preview", PreKind::Rc),
        ("pre", PreKind::Rc),
        ("rc", PreKind::Rc),
        ("c", PreKind::Rc),
    ];
    for (label, kind) in LABELS {
        if let Some(tail) = body.strip_prefix(label) {
            let (n, rest) = take_number(strip_separator(tail));
            return (Some((kind, n.unwrap_or(0))), rest);
        }
    }
    (None, s)
}

fn parse_post(s: &str) -> (Option<u64>, &str) {
    if let Some(tail) = s.strip_prefix('-') {
        if let (Some(n), rest) = take_number(tail) {
            return (Some(n), rest);
        }
    }
    let body = strip_separator(s);
    for label in ["post", "rev", "r"] {
        if let Some(tail) = body.strip_prefix(label) {
            let (n, rest) = take_number(strip_separator(tail));
            return (Some(n.unwrap_or(0)), rest);
        }
    }
    (None, s)
}

fn parse_dev(s: &str) -> (Option<u64>, &str) {
    let body = strip_separator(s);
    match body.strip_prefix("dev") {
        Some(tail) => {
            let (n, rest) = take_number(strip_separator(tail));
            (Some(n.unwrap_or(0)), rest)
        }
        None => (None, s),
    }
}

fn parse_local(s: &str) -> Option<Vec<LocalSegment>> {
    let mut segments = Vec::new();
    for part in s.split(['.', '-', '_']) {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        segments.push(match part.parse::<u64>() {
            Ok(n) => LocalSegment::Number(n),
            Err(_) => LocalSegment::Text(part.to_string()),
        });
    }
    Some(segments)
}

/// Comparison operator of a version specifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Compatible,
    Equal,
    NotEqual,
    LessEqual,
    GreaterEqual,
    Less,
    Greater,
    Arbitrary,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Compatible => "~=",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::LessEqual => "<=",
            Self::GreaterEqual => ">=",
            Self::Less => "<",
            Self::Greater => ">",
            Self::Arbitrary => "===",
        }
    }

    /// Split a leading operator off `s`.
    pub fn strip(s: &str) -> Option<(Self, &str)> {
        // Longest spellings first so `===` is not read as `==`.
        const OPERATORS: [(&str, Operator); 8] = [
            ("===", Operator::Arbitrary),
            ("~=", Operator::Compatible),
            ("==", Operator::Equal),
            ("!=", Operator::NotEqual),
            ("<=", Operator::LessEqual),
            (">=", Operator::GreaterEqual),
            ("<", Operator::Less),
            (">", Operator::Greater),
        ];
        OPERATORS
            .iter()
            .find_map(|(text, op)| s.strip_prefix(*text).map(|rest| (*op, rest)))
    }
}

/// A single version constraint such as `>=1.2` or `==2.*`.
#[derive(Debug, Clone)]
pub struct Specifier {
    pub operator: Operator,
    /// Version text as written, without any `.*` suffix.
    pub version_text: String,
    pub wildcard: bool,
    version: Option<Version>,
}

impl Specifier {
    pub fn parse(text: &str) -> Result<Self, DeptreeError> {
        let invalid = |why: &str| DeptreeError::Requirement {
            message: format!("invalid version specifier '{}': {why}", text.trim()),
        };
        let (operator, rest) = Operator::strip(text.trim()).ok_or_else(|| invalid("missing operator"))?;
        let rest = rest.trim();
        if rest.is_empty() {
            return Err(invalid("missing version"));
        }
        if operator == Operator::Arbitrary {
            return Ok(Self {
                operator,
                version_text: rest.to_string(),
                wildcard: false,
                version: None,
            });
        }

        let (version_text, wildcard) = match rest.strip_suffix(".*") {
            Some(prefix) if matches!(operator, Operator::Equal | Operator::NotEqual) => (prefix, true),
            Some(_) => return Err(invalid("'.*' is only allowed with == and !=")),
            None => (rest, false),
        };
        let version = Version::parse(version_text).ok_or_else(|| invalid("unparsable version"))?;
        if operator == Operator::Compatible && version.release.len() < 2 {
            return Err(invalid("~= needs at least two release segments"));
        }
        Ok(Self {
            operator,
            version_text: version_text.to_string(),
            wildcard,
            version: Some(version),
        })
    }

    /// Check whether an installed version string satisfies this specifier.
    pub fn matches(&self, installed: &str) -> bool {
        if self.operator == Operator::Arbitrary {
            return installed.trim().eq_ignore_ascii_case(&self.version_text);
        }
        match (Version::parse(installed), &self.version) {
            (Some(candidate), Some(spec)) => self.contains(&candidate, spec),
            _ => false,
        }
    }

    fn contains(&self, candidate: &Version, spec: &Version) -> bool {
        match self.operator {
            Operator::Equal if self.wildcard => prefix_match(candidate, spec),
            Operator::NotEqual if self.wildcard => !prefix_match(candidate, spec),
            Operator::Equal => exact_match(candidate, spec),
            Operator::NotEqual => !exact_match(candidate, spec),
            Operator::LessEqual => candidate.public() <= *spec,
            Operator::GreaterEqual => candidate.public() >= *spec,
            Operator::Less => {
                candidate.public() < *spec
                    && !(!spec.is_prerelease() && candidate.is_prerelease() && candidate.same_release(spec))
            }
            Operator::Greater => {
                candidate.public() > *spec
                    && !(!spec.is_postrelease() && candidate.is_postrelease() && candidate.same_release(spec))
            }
            Operator::Compatible => {
                let prefix = Version {
                    release: spec.release[..spec.release.len() - 1].to_vec(),
                    pre: None,
                    post: None,
                    dev: None,
                    local: None,
                    ..spec.clone()
                };
                candidate.public() >= *spec && prefix_match(candidate, &prefix)
            }
            Operator::Arbitrary => false,
        }
    }
}

fn exact_match(candidate: &Version, spec: &Version) -> bool {
    if spec.has_local() {
        candidate == spec
    } else {
        candidate.public() == *spec
    }
}

fn prefix_match(candidate: &Version, prefix: &Version) -> bool {
    if candidate.epoch != prefix.epoch {
        return false;
    }
    (0..prefix.release.len()).all(|i| candidate.release.get(i).unwrap_or(&0) == &prefix.release[i])
}

impl fmt::Display for Specifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.operator.as_str(), self.version_text)?;
        if self.wildcard {
            f.write_str(".*")?;
        }
        Ok(())
    }
}

/// A comma-separated conjunction of specifiers; empty matches everything.
#[derive(Debug, Clone, Default)]
pub struct SpecifierSet {
    pub specifiers: Vec<Specifier>,
}

impl SpecifierSet {
    pub fn parse(text: &str) -> Result<Self, DeptreeError> {
        let specifiers = text
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Specifier::parse)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { specifiers })
    }

    pub fn is_empty(&self) -> bool {
        self.specifiers.is_empty()
    }

    /// Check whether an installed version string satisfies every specifier.
    pub fn matches(&self, installed: &str) -> bool {
        self.specifiers.iter().all(|s| s.matches(installed))
    }
}

impl fmt::Display for SpecifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.specifiers.iter().map(ToString::to_string).collect();
        parts.sort();
        f.write_str(&parts.join(","))
    }
}
