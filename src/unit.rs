//! Unit discovery
//!
//! A unit is the smallest thing the synchronizer manages: a skill directory
//! or a single agent file, identified by its name within a root.

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::SyncError;

/// Default suffix for file units (agent definitions).
pub const DEFAULT_FILE_SUFFIX: &str = ".md";

/// Shape of the units in a root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum UnitKind {
    /// Each immediate subdirectory is a unit.
    #[default]
    Directory,
    /// Each immediate file ending in `suffix` is a unit.
    File { suffix: String },
}

impl UnitKind {
    pub fn file(suffix: impl Into<String>) -> Self {
        UnitKind::File {
            suffix: suffix.into(),
        }
    }

    /// Whether the entry at `path` named `name` has this unit shape.
    pub fn matches(&self, path: &Path, name: &str) -> bool {
        if is_hidden(name) {
            return false;
        }
        match self {
            UnitKind::Directory => path.is_dir(),
            UnitKind::File { suffix } => {
                path.is_file() && name.len() > suffix.len() && name.ends_with(suffix.as_str())
            }
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            UnitKind::Directory => "directory",
            UnitKind::File { .. } => "file",
        }
    }
}

/// A named installable item found in a root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    /// Display name; lossy when the file name is not valid UTF-8.
    pub name: String,
    /// Exact name on disk, used for every path built from this unit.
    pub file_name: OsString,
    pub source_path: PathBuf,
    pub kind: UnitKind,
}

impl Unit {
    /// Key under which two names land on the same path of a
    /// case-insensitive filesystem.
    pub fn fold_key(&self) -> OsString {
        fold_key(&self.file_name)
    }
}

fn fold_key(name: &OsStr) -> OsString {
    match name.to_str() {
        Some(utf8) => utf8.to_lowercase().into(),
        None => name.to_os_string(),
    }
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// List the units of `kind` directly under `root`, sorted by name.
///
/// Names that differ only by case are rejected with
/// [`SyncError::NameCollision`], since they would land on the same path on a
/// case-insensitive target filesystem.
pub fn discover_units(root: &Path, kind: &UnitKind) -> Result<Vec<Unit>, SyncError> {
    let units = list_units(root, kind)?;
    check_collisions(&units)?;
    Ok(units)
}

/// Like [`discover_units`] without the collision check. Used for target
/// roots, where every entry is a removal candidate in its own right.
pub(crate) fn list_units(root: &Path, kind: &UnitKind) -> Result<Vec<Unit>, SyncError> {
    let mut units = Vec::new();

    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| SyncError::walk(root, e))?;
        let name = entry.file_name().to_string_lossy().into_owned();

        if !kind.matches(entry.path(), &name) {
            continue;
        }

        units.push(Unit {
            name,
            file_name: entry.file_name().to_os_string(),
            source_path: entry.path().to_path_buf(),
            kind: kind.clone(),
        });
    }

    units.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(units)
}

fn check_collisions(units: &[Unit]) -> Result<(), SyncError> {
    let mut seen: HashMap<OsString, &Path> = HashMap::with_capacity(units.len());

    for unit in units {
        if let Some(first) = seen.insert(unit.fold_key(), &unit.source_path) {
            return Err(SyncError::NameCollision {
                name: unit.name.clone(),
                first: first.to_path_buf(),
                second: unit.source_path.clone(),
            });
        }
    }

    Ok(())
}
