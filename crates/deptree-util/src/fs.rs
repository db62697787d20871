use std::path::{Path, PathBuf};

use crate::errors::DeptreeError;

/// Read a metadata file as text, replacing invalid UTF-8 sequences.
///
/// Package metadata in the wild is occasionally written in a legacy encoding;
/// the fields deptree needs are ASCII so a lossy read is sufficient.
pub fn read_text_lossy(path: &Path) -> Result<String, DeptreeError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// List the entries of `dir` sorted by file name.
///
/// Returns an empty list when `dir` does not exist.
pub fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, DeptreeError> {
    if !dir.is_dir() {
        tracing::debug!("{} is not a directory, nothing to list", dir.display());
        return Ok(Vec::new());
    }
    let mut entries = std::fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort();
    Ok(entries)
}

/// Return the file name of `path` as UTF-8, if it has one.
pub fn file_name_str(path: &Path) -> Option<&str> {
    path.file_name().and_then(|n| n.to_str())
}
