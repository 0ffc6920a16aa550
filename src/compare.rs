//! Content comparison strategies
//!
//! The synchronizer decides between `Unchanged` and `Updated` by asking a
//! [`ContentComparator`] whether two files hold the same bytes. Directory
//! units are compared entry by entry on top of that.

use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::error::{IoResultExt, SyncError};
use crate::unit::UnitKind;

const CHUNK_SIZE: usize = 64 * 1024;

/// Decides whether two regular files have identical content.
pub trait ContentComparator {
    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool>;
}

/// Chunked byte-for-byte comparison with a length check up front.
#[derive(Debug, Default, Clone, Copy)]
pub struct ByteComparator;

impl ContentComparator for ByteComparator {
    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool> {
        if fs::metadata(a)?.len() != fs::metadata(b)?.len() {
            return Ok(false);
        }

        let mut ra = BufReader::new(File::open(a)?);
        let mut rb = BufReader::new(File::open(b)?);
        let mut buf_a = vec![0u8; CHUNK_SIZE];
        let mut buf_b = vec![0u8; CHUNK_SIZE];

        loop {
            let n = read_full(&mut ra, &mut buf_a)?;
            let m = read_full(&mut rb, &mut buf_b)?;
            if n != m || buf_a[..n] != buf_b[..m] {
                return Ok(false);
            }
            if n == 0 {
                return Ok(true);
            }
        }
    }
}

/// SHA-256 digest comparison.
#[derive(Debug, Default, Clone, Copy)]
pub struct HashComparator;

impl HashComparator {
    pub fn digest(path: &Path) -> io::Result<Vec<u8>> {
        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = Sha256::new();
        let mut buf = vec![0u8; CHUNK_SIZE];
        loop {
            let n = reader.read(&mut buf)?;
            if n == 0 {
                break;
            }
            hasher.update(&buf[..n]);
        }
        Ok(hasher.finalize().to_vec())
    }
}

impl ContentComparator for HashComparator {
    fn same_file(&self, a: &Path, b: &Path) -> io::Result<bool> {
        Ok(Self::digest(a)? == Self::digest(b)?)
    }
}

/// Fill `buf` as far as the reader allows; returns the bytes read.
fn read_full(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[derive(Debug, PartialEq, Eq)]
enum EntryShape {
    Dir,
    File,
    Symlink(PathBuf),
}

/// Whether the unit at `target` is identical to the unit at `source`.
///
/// A target of the wrong shape (a file where a directory is expected or the
/// other way round) is reported as different rather than as an error.
pub fn unit_matches(
    comparator: &dyn ContentComparator,
    source: &Path,
    target: &Path,
    kind: &UnitKind,
) -> Result<bool, SyncError> {
    let target_meta = fs::symlink_metadata(target).at(target)?;

    match kind {
        UnitKind::File { .. } => {
            if !target_meta.is_file() {
                return Ok(false);
            }
            comparator.same_file(source, target).at(target)
        }
        UnitKind::Directory => {
            if !target_meta.is_dir() {
                return Ok(false);
            }
            trees_match(comparator, source, target)
        }
    }
}

fn trees_match(
    comparator: &dyn ContentComparator,
    source: &Path,
    target: &Path,
) -> Result<bool, SyncError> {
    let source_entries = list_tree(source)?;
    let target_entries = list_tree(target)?;

    if source_entries.len() != target_entries.len() {
        return Ok(false);
    }

    for ((src_rel, src_shape), (dst_rel, dst_shape)) in
        source_entries.iter().zip(target_entries.iter())
    {
        if src_rel != dst_rel || src_shape != dst_shape {
            return Ok(false);
        }
        if *src_shape == EntryShape::File {
            let dst_path = target.join(dst_rel);
            if !comparator
                .same_file(&source.join(src_rel), &dst_path)
                .at(&dst_path)?
            {
                return Ok(false);
            }
        }
    }

    Ok(true)
}

fn list_tree(root: &Path) -> Result<BTreeMap<PathBuf, EntryShape>, SyncError> {
    let mut entries = BTreeMap::new();

    for entry in WalkDir::new(root).min_depth(1).follow_links(false) {
        let entry = entry.map_err(|e| SyncError::walk(root, e))?;
        let rel = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .to_path_buf();
        let ty = entry.file_type();

        let shape = if ty.is_symlink() {
            EntryShape::Symlink(fs::read_link(entry.path()).at(entry.path())?)
        } else if ty.is_dir() {
            EntryShape::Dir
        } else {
            EntryShape::File
        };
        entries.insert(rel, shape);
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(path: &Path, content: &[u8]) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_byte_comparator() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        let c = temp_dir.path().join("c");
        write(&a, b"same content");
        write(&b, b"same content");
        write(&c, b"same contenT");

        assert!(ByteComparator.same_file(&a, &b).unwrap());
        assert!(!ByteComparator.same_file(&a, &c).unwrap());
    }

    #[test]
    fn test_byte_comparator_large_files_differ_late() {
        let temp_dir = TempDir::new().unwrap();
        let mut data = vec![7u8; CHUNK_SIZE * 3 + 11];
        let a = temp_dir.path().join("a");
        write(&a, &data);
        *data.last_mut().unwrap() = 8;
        let b = temp_dir.path().join("b");
        write(&b, &data);

        assert!(!ByteComparator.same_file(&a, &b).unwrap());
        assert!(!HashComparator.same_file(&a, &b).unwrap());
    }

    #[test]
    fn test_hash_comparator() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        let b = temp_dir.path().join("b");
        write(&a, b"");
        write(&b, b"");

        assert!(HashComparator.same_file(&a, &b).unwrap());
        assert_eq!(HashComparator::digest(&a).unwrap().len(), 32);
    }

    #[test]
    fn test_comparator_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let a = temp_dir.path().join("a");
        write(&a, b"x");
        assert!(
            ByteComparator
                .same_file(&a, &temp_dir.path().join("missing"))
                .is_err()
        );
    }

    #[test]
    fn test_unit_matches_identical_trees() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        for root in [&src, &dst] {
            write(&root.join("SKILL.md"), b"# skill");
            write(&root.join("refs/a/b.txt"), b"nested");
            fs::create_dir_all(root.join("empty-dir")).unwrap();
        }

        assert!(unit_matches(&ByteComparator, &src, &dst, &UnitKind::Directory).unwrap());
    }

    #[test]
    fn test_unit_matches_detects_extra_missing_and_changed() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        write(&src.join("SKILL.md"), b"# skill");
        write(&dst.join("SKILL.md"), b"# skill");

        write(&dst.join("extra.txt"), b"stale");
        assert!(!unit_matches(&ByteComparator, &src, &dst, &UnitKind::Directory).unwrap());

        fs::remove_file(dst.join("extra.txt")).unwrap();
        write(&src.join("new.txt"), b"fresh");
        assert!(!unit_matches(&ByteComparator, &src, &dst, &UnitKind::Directory).unwrap());

        write(&dst.join("new.txt"), b"Fresh");
        assert!(!unit_matches(&ByteComparator, &src, &dst, &UnitKind::Directory).unwrap());

        write(&dst.join("new.txt"), b"fresh");
        assert!(unit_matches(&ByteComparator, &src, &dst, &UnitKind::Directory).unwrap());
    }

    #[test]
    fn test_unit_matches_entry_type_mismatch() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        fs::create_dir_all(src.join("thing")).unwrap();
        write(&dst.join("thing"), b"");

        assert!(!unit_matches(&ByteComparator, &src, &dst, &UnitKind::Directory).unwrap());
    }

    #[test]
    fn test_unit_matches_wrong_unit_shape() {
        let temp_dir = TempDir::new().unwrap();
        let src_dir = temp_dir.path().join("skill");
        fs::create_dir_all(&src_dir).unwrap();
        let dst_file = temp_dir.path().join("skill-file");
        write(&dst_file, b"x");

        assert!(!unit_matches(&ByteComparator, &src_dir, &dst_file, &UnitKind::Directory).unwrap());

        let src_file = temp_dir.path().join("agent.md");
        write(&src_file, b"x");
        assert!(
            !unit_matches(&ByteComparator, &src_file, &src_dir, &UnitKind::file(".md")).unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_unit_matches_compares_symlink_targets() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        let dst = temp_dir.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        std::os::unix::fs::symlink("one.md", src.join("link")).unwrap();
        std::os::unix::fs::symlink("two.md", dst.join("link")).unwrap();

        assert!(!unit_matches(&ByteComparator, &src, &dst, &UnitKind::Directory).unwrap());
    }
}
