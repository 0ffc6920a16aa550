//! File system utilities.

use std::fs;
use std::path::Path;

use crate::error::{IoResultExt, SyncError};
use crate::unit::UnitKind;

/// Copy a unit's content from `src` to `dst`, which must not exist yet.
pub fn copy_unit(src: &Path, dst: &Path, kind: &UnitKind) -> Result<(), SyncError> {
    match kind {
        UnitKind::Directory => copy_dir_all(src, dst),
        UnitKind::File { .. } => fs::copy(src, dst).map(|_| ()).at(dst),
    }
}

/// Delete whatever lives at `path`: a directory tree, a file or a symlink.
pub fn remove_unit(path: &Path) -> Result<(), SyncError> {
    let meta = fs::symlink_metadata(path).at(path)?;
    if meta.is_dir() {
        fs::remove_dir_all(path).at(path)
    } else {
        fs::remove_file(path).at(path)
    }
}

/// Copy a directory recursively, preserving symbolic links.
pub fn copy_dir_all(src: &Path, dst: &Path) -> Result<(), SyncError> {
    // Guard against infinite recursion if dst is inside src.
    let src_canon = fs::canonicalize(src).at(src)?;
    let dst_parent = dst
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .and_then(|p| fs::canonicalize(p).ok());
    if dst_parent.is_some_and(|p| p.starts_with(&src_canon)) {
        return Err(SyncError::io(
            dst,
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "Cannot copy directory into itself: {} is inside {}",
                    dst.display(),
                    src_canon.display()
                ),
            ),
        ));
    }

    copy_tree(src, dst)
}

fn copy_tree(src: &Path, dst: &Path) -> Result<(), SyncError> {
    fs::create_dir_all(dst).at(dst)?;

    for entry in fs::read_dir(src).at(src)? {
        let entry = entry.at(src)?;
        let src_path = entry.path();
        let ty = entry.file_type().at(&src_path)?;
        let dst_path = dst.join(entry.file_name());

        if ty.is_dir() {
            copy_tree(&src_path, &dst_path)?;
        } else if ty.is_symlink() {
            let target = fs::read_link(&src_path).at(&src_path)?;
            #[cfg(unix)]
            std::os::unix::fs::symlink(&target, &dst_path).at(&dst_path)?;
            #[cfg(windows)]
            {
                // symlink_dir vs symlink_file depends on what the link resolves to.
                let is_dir = fs::metadata(&src_path)
                    .map(|m| m.is_dir())
                    .unwrap_or(false);
                if is_dir {
                    std::os::windows::fs::symlink_dir(&target, &dst_path).at(&dst_path)?;
                } else {
                    std::os::windows::fs::symlink_file(&target, &dst_path).at(&dst_path)?;
                }
            }
        } else {
            fs::copy(&src_path, &dst_path).at(&dst_path)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_copy_dir_all_nested() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir_all(src.join("a/b/c")).unwrap();
        fs::write(src.join("SKILL.md"), "# Skill").unwrap();
        fs::write(src.join("a/b/c/deep.txt"), "deep").unwrap();
        fs::write(src.join("a/empty"), "").unwrap();

        let dst = temp_dir.path().join("dst");
        copy_dir_all(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("SKILL.md")).unwrap(), "# Skill");
        assert_eq!(fs::read_to_string(dst.join("a/b/c/deep.txt")).unwrap(), "deep");
        assert_eq!(fs::read(dst.join("a/empty")).unwrap().len(), 0);
    }

    #[test]
    fn test_copy_dir_all_rejects_copy_into_itself() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("file"), "x").unwrap();

        let result = copy_dir_all(&src, &src.join("inner"));
        assert!(matches!(result, Err(SyncError::Io { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_dir_all_preserves_symlinks() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("src");
        fs::create_dir_all(&src).unwrap();
        fs::write(src.join("target.md"), "content").unwrap();
        std::os::unix::fs::symlink("target.md", src.join("link.md")).unwrap();

        let dst = temp_dir.path().join("dst");
        copy_dir_all(&src, &dst).unwrap();

        let link = dst.join("link.md");
        assert!(link.is_symlink());
        assert_eq!(fs::read_link(&link).unwrap(), Path::new("target.md"));
    }

    #[test]
    fn test_copy_unit_file() {
        let temp_dir = TempDir::new().unwrap();
        let src = temp_dir.path().join("agent.md");
        fs::write(&src, b"\x00binary\xff").unwrap();
        let dst = temp_dir.path().join("out.md");

        copy_unit(&src, &dst, &UnitKind::file(".md")).unwrap();
        assert_eq!(fs::read(&dst).unwrap(), b"\x00binary\xff");
    }

    #[test]
    fn test_remove_unit_handles_files_and_dirs() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("skill");
        fs::create_dir_all(dir.join("nested")).unwrap();
        fs::write(dir.join("nested/file"), "x").unwrap();
        let file = temp_dir.path().join("agent.md");
        fs::write(&file, "x").unwrap();

        remove_unit(&dir).unwrap();
        remove_unit(&file).unwrap();

        assert!(!dir.exists());
        assert!(!file.exists());
    }

    #[test]
    fn test_remove_unit_missing_path_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let result = remove_unit(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(SyncError::Io { .. })));
    }
}
