//! Parsing of on-disk distribution metadata.
//!
//! - `*.dist-info/METADATA`: RFC 822 style headers (`Name`, `Version`,
//!   `Requires-Dist`, `Provides-Extra`) followed by a free-form body
//! - `*.egg-info/PKG-INFO`: the same header format, requirements live in
//!   `requires.txt` grouped under `[extra:marker]` section headers
//!
//! Unreadable requirement lines are logged and skipped so one broken package
//! does not hide the rest of the installation.

use std::path::Path;

use deptree_core::key::ProjectKey;
use deptree_core::marker::Marker;
use deptree_core::requirement::RequirementSpec;
use deptree_util::errors::{DeptreeError, DeptreeResult};
use deptree_util::fs::{file_name_str, read_text_lossy};

use crate::provider::InstalledDistribution;

/// Header fields relevant to dependency reporting.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoreMetadata {
    pub name: Option<String>,
    pub version: Option<String>,
    pub requires_dist: Vec<String>,
    pub provides_extra: Vec<String>,
}

/// Parse the header block of a `METADATA` / `PKG-INFO` file.
///
/// Continuation lines (leading whitespace) are folded into the previous
/// header; parsing stops at the first blank line.
pub fn parse_headers(text: &str) -> CoreMetadata {
    let mut headers: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            break;
        }
        if line.starts_with([' ', '\t']) {
            if let Some((_, value)) = headers.last_mut() {
                value.push(' ');
                value.push_str(line.trim());
            }
            continue;
        }
        if let Some((name, value)) = line.split_once(':') {
            headers.push((name.trim().to_ascii_lowercase(), value.trim().to_string()));
        }
    }

    let mut meta = CoreMetadata::default();
    for (name, value) in headers {
        match name.as_str() {
            "name" => meta.name = Some(value),
            "version" => meta.version = Some(value),
            "requires-dist" => meta.requires_dist.push(value),
            "provides-extra" => meta.provides_extra.push(value),
            _ => {}
        }
    }
    meta
}

/// Requirements and extras declared by an egg-info `requires.txt`.
#[derive(Debug, Clone, Default)]
pub struct RequiresTxt {
    pub requirements: Vec<RequirementSpec>,
    /// Extra names from the section headers, as written.
    pub extras: Vec<String>,
}

/// Parse an egg-info `requires.txt`.
///
/// Section headers gate the requirements below them: `[socks]` behind the
/// `socks` extra, `[:sys_platform == "win32"]` behind a marker, and
/// `[test:python_version < "3.8"]` behind both.
pub fn parse_requires_txt(text: &str, origin: &str) -> RequiresTxt {
    let mut section: Option<Marker> = None;
    let mut skipping = false;
    let mut parsed = RequiresTxt::default();
    for line in text.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
            match parse_section(header) {
                Ok(marker) => {
                    section = marker;
                    skipping = false;
                    let extra = header.split_once(':').map_or(header, |(extra, _)| extra).trim();
                    if !extra.is_empty() && !parsed.extras.iter().any(|e| e == extra) {
                        parsed.extras.push(extra.to_string());
                    }
                }
                Err(e) => {
                    tracing::warn!("{origin}: skipping requirements under [{header}]: {e}");
                    skipping = true;
                }
            }
            continue;
        }
        if skipping {
            continue;
        }
        match RequirementSpec::parse(line) {
            Ok(mut spec) => {
                if let Some(gate) = &section {
                    spec.marker = Some(match spec.marker.take() {
                        Some(own) => gate.clone().and(own),
                        None => gate.clone(),
                    });
                }
                parsed.requirements.push(spec);
            }
            Err(e) => tracing::warn!("{origin}: skipping requirement: {e}"),
        }
    }
    parsed
}

fn parse_section(header: &str) -> Result<Option<Marker>, DeptreeError> {
    let (extra, condition) = match header.split_once(':') {
        Some((extra, condition)) => (extra.trim(), Some(condition.trim())),
        None => (header.trim(), None),
    };
    let condition = condition.filter(|c| !c.is_empty()).map(Marker::parse).transpose()?;
    let extra = (!extra.is_empty()).then(|| Marker::extra(extra));
    Ok(match (extra, condition) {
        (Some(extra), Some(condition)) => Some(extra.and(condition)),
        (Some(marker), None) | (None, Some(marker)) => Some(marker),
        (None, None) => None,
    })
}

/// Split a `name-version.dist-info` style directory stem.
fn name_version_from_stem(path: &Path) -> (Option<String>, Option<String>) {
    let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    match stem.split_once('-') {
        Some((name, version)) => {
            let version = version.split('-').next().unwrap_or_default();
            (Some(name.to_string()), (!version.is_empty()).then(|| version.to_string()))
        }
        None => ((!stem.is_empty()).then(|| stem.to_string()), None),
    }
}

fn build(meta: CoreMetadata, requires: Vec<RequirementSpec>, path: &Path) -> Option<InstalledDistribution> {
    let (stem_name, stem_version) = name_version_from_stem(path);
    let (Some(name), Some(version)) = (meta.name.or(stem_name), meta.version.or(stem_version)) else {
        tracing::warn!("{}: no Name/Version in metadata, skipping", path.display());
        return None;
    };
    let mut dist = InstalledDistribution::new(&name, &version);
    dist.requires_dist = requires;
    dist.provides_extras = meta
        .provides_extra
        .iter()
        .map(|e| ProjectKey::new(e).to_string())
        .collect();
    dist.location = Some(path.to_path_buf());
    Some(dist)
}

/// Read a `*.dist-info` directory.
pub fn read_dist_info(dir: &Path) -> DeptreeResult<Option<InstalledDistribution>> {
    let metadata_path = dir.join("METADATA");
    if !metadata_path.is_file() {
        tracing::warn!("{}: no METADATA file, skipping", dir.display());
        return Ok(None);
    }
    let meta = parse_headers(&read_text_lossy(&metadata_path)?);
    let origin = file_name_str(dir).unwrap_or("dist-info").to_string();
    let requires = meta
        .requires_dist
        .iter()
        .filter_map(|line| match RequirementSpec::parse(line) {
            Ok(spec) => Some(spec),
            Err(e) => {
                tracing::warn!("{origin}: skipping Requires-Dist: {e}");
                None
            }
        })
        .collect();
    Ok(build(meta, requires, dir))
}

/// Read a `*.egg-info` directory, or a single-file `*.egg-info` (PKG-INFO).
pub fn read_egg_info(path: &Path) -> DeptreeResult<Option<InstalledDistribution>> {
    let (pkg_info, requires_txt) = if path.is_dir() {
        (path.join("PKG-INFO"), Some(path.join("requires.txt")))
    } else {
        (path.to_path_buf(), None)
    };
    let mut meta = if pkg_info.is_file() {
        parse_headers(&read_text_lossy(&pkg_info)?)
    } else {
        CoreMetadata::default()
    };
    let origin = file_name_str(path).unwrap_or("egg-info").to_string();
    let requires = match requires_txt.filter(|p| p.is_file()) {
        Some(p) => parse_requires_txt(&read_text_lossy(&p)?, &origin),
        None => RequiresTxt::default(),
    };
    meta.provides_extra.extend(requires.extras);
    Ok(build(meta, requires.requirements, path))
}
