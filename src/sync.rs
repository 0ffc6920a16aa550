//! Directory synchronization
//!
//! Reconciles a target root with a source root for one unit kind: copies new
//! units, replaces changed ones and optionally prunes orphans, reporting what
//! happened to every unit.

use serde::Serialize;
use std::collections::HashMap;
use std::ffi::OsStr;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;

use crate::compare::{ByteComparator, ContentComparator, unit_matches};
use crate::error::{IoResultExt, SyncError};
use crate::fs::{copy_unit, remove_unit};
use crate::unit::{UnitKind, discover_units, list_units};

/// Options for the sync operation
#[derive(Debug, Default, Clone, Copy)]
pub struct SyncOptions {
    /// Delete target units that have no counterpart in the source
    pub remove_orphans: bool,
    /// Compute the report without touching the target
    pub dry_run: bool,
}

/// What happened (or would happen, in dry-run mode) to a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncAction {
    New,
    Updated,
    Unchanged,
    Removed,
}

impl SyncAction {
    pub fn tag(self) -> &'static str {
        match self {
            SyncAction::New => "NEW",
            SyncAction::Updated => "UPDATED",
            SyncAction::Unchanged => "UNCHANGED",
            SyncAction::Removed => "REMOVED",
        }
    }

    /// Anything but `Unchanged` modifies the target.
    pub fn is_change(self) -> bool {
        self != SyncAction::Unchanged
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncEntry {
    pub name: String,
    pub action: SyncAction,
}

/// Result of a sync operation
///
/// Entries are ordered: source-driven actions in source order, then removals
/// in target order.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub entries: Vec<SyncEntry>,
}

impl SyncReport {
    fn record(&mut self, name: &str, action: SyncAction) {
        tracing::debug!(unit = %name, action = %action, "sync action");
        self.entries.push(SyncEntry {
            name: name.to_string(),
            action,
        });
    }

    /// Number of entries with the given action.
    pub fn count(&self, action: SyncAction) -> usize {
        self.entries.iter().filter(|e| e.action == action).count()
    }

    /// Number of units that were created, updated or removed.
    pub fn changed(&self) -> usize {
        self.entries.iter().filter(|e| e.action.is_change()).count()
    }

    pub fn is_unchanged(&self) -> bool {
        self.changed() == 0
    }

    /// `(name, action)` pairs, convenient for assertions.
    pub fn pairs(&self) -> Vec<(&str, SyncAction)> {
        self.entries
            .iter()
            .map(|e| (e.name.as_str(), e.action))
            .collect()
    }
}

/// Performs the synchronization of units from a source root to a target root
pub struct Synchronizer {
    comparator: Box<dyn ContentComparator>,
}

impl Default for Synchronizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synchronizer {
    /// Create a synchronizer comparing content byte for byte.
    pub fn new() -> Self {
        Self::with_comparator(ByteComparator)
    }

    pub fn with_comparator(comparator: impl ContentComparator + 'static) -> Self {
        Self {
            comparator: Box::new(comparator),
        }
    }

    /// Make `target_root` hold the same units as `source_root`.
    ///
    /// Fails fast: the first error aborts the run, leaving units processed
    /// before it in their new state. Re-running converges once the cause is
    /// fixed.
    pub fn sync(
        &self,
        source_root: &Path,
        target_root: &Path,
        kind: &UnitKind,
        options: &SyncOptions,
    ) -> Result<SyncReport, SyncError> {
        if !source_root.is_dir() {
            return Err(SyncError::NotFound(source_root.to_path_buf()));
        }

        let source_units = discover_units(source_root, kind)?;

        if !options.dry_run {
            fs::create_dir_all(target_root).at(target_root)?;
        }

        let mut report = SyncReport::default();

        for unit in &source_units {
            let target_path = target_root.join(&unit.file_name);

            let action = if !entry_exists(&target_path)? {
                if !options.dry_run {
                    copy_unit(&unit.source_path, &target_path, kind)?;
                }
                SyncAction::New
            } else if unit_matches(
                self.comparator.as_ref(),
                &unit.source_path,
                &target_path,
                kind,
            )? {
                SyncAction::Unchanged
            } else {
                if !options.dry_run {
                    remove_unit(&target_path)?;
                    copy_unit(&unit.source_path, &target_path, kind)?;
                }
                SyncAction::Updated
            };

            report.record(&unit.name, action);
        }

        if options.remove_orphans && target_root.is_dir() {
            let source_names: HashMap<_, &OsStr> = source_units
                .iter()
                .map(|u| (u.fold_key(), u.file_name.as_os_str()))
                .collect();

            for orphan in list_units(target_root, kind)? {
                if let Some(&source_name) = source_names.get(&orphan.fold_key())
                    && (source_name == orphan.file_name.as_os_str()
                        || same_entry(&orphan.source_path, &target_root.join(source_name))?)
                {
                    continue;
                }
                if !options.dry_run {
                    remove_unit(&orphan.source_path)?;
                }
                report.record(&orphan.name, SyncAction::Removed);
            }
        }

        tracing::info!(
            source = %source_root.display(),
            target = %target_root.display(),
            kind = kind.label(),
            changed = report.changed(),
            dry_run = options.dry_run,
            "sync finished"
        );

        Ok(report)
    }
}

/// Sync with the default byte comparator.
pub fn sync(
    source_root: &Path,
    target_root: &Path,
    kind: &UnitKind,
    options: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    Synchronizer::new().sync(source_root, target_root, kind, options)
}

/// Dangling symlinks count as existing so they get replaced.
fn entry_exists(path: &Path) -> Result<bool, SyncError> {
    match fs::symlink_metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(SyncError::io(path, e)),
    }
}

/// Whether two paths name the same directory entry, as two spellings of one
/// name do on a case-insensitive filesystem.
fn same_entry(a: &Path, b: &Path) -> Result<bool, SyncError> {
    if !entry_exists(b)? {
        return Ok(false);
    }
    same_inode(a, b)
}

#[cfg(unix)]
fn same_inode(a: &Path, b: &Path) -> Result<bool, SyncError> {
    use std::os::unix::fs::MetadataExt;

    let a_meta = fs::symlink_metadata(a).at(a)?;
    let b_meta = fs::symlink_metadata(b).at(b)?;
    Ok(a_meta.dev() == b_meta.dev() && a_meta.ino() == b_meta.ino())
}

// Case-insensitive by default; a case variant that exists is the same entry.
#[cfg(not(unix))]
fn same_inode(_a: &Path, _b: &Path) -> Result<bool, SyncError> {
    Ok(true)
}
