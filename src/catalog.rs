//! Unit catalog
//!
//! Reads the YAML frontmatter of skill and agent documents so `skillsync
//! list` can show what a collection holds. The synchronizer never looks at
//! unit content; this module is only for display and sanity checks.

use regex::Regex;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

use crate::error::SyncError;
use crate::unit::{Unit, UnitKind, discover_units};

/// Manifest file inside a skill directory
pub const SKILL_MANIFEST: &str = "SKILL.md";

#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct Frontmatter {
    pub name: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing frontmatter in {}", .0.display())]
    MissingFrontmatter(PathBuf),
    #[error("invalid frontmatter in {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// One listed unit
#[derive(Debug)]
pub struct CatalogEntry {
    pub name: String,
    pub description: Option<String>,
    /// Why the unit's frontmatter looks wrong, if it does
    pub problem: Option<String>,
}

static FRONTMATTER_RE: OnceLock<Regex> = OnceLock::new();

fn frontmatter_re() -> &'static Regex {
    FRONTMATTER_RE.get_or_init(|| {
        Regex::new(r"(?s)\A\s*---[ \t]*\r?\n(?P<yaml>.*?)\r?\n---").expect("valid regex")
    })
}

/// Document carrying the unit's frontmatter.
pub fn manifest_path(unit: &Unit) -> PathBuf {
    match unit.kind {
        UnitKind::Directory => unit.source_path.join(SKILL_MANIFEST),
        UnitKind::File { .. } => unit.source_path.clone(),
    }
}

/// Parse the leading `---` frontmatter block of a markdown document.
pub fn parse_frontmatter(path: &Path, content: &str) -> Result<Frontmatter, CatalogError> {
    let caps = frontmatter_re()
        .captures(content)
        .ok_or_else(|| CatalogError::MissingFrontmatter(path.to_path_buf()))?;

    let yaml = &caps["yaml"];
    if yaml.trim().is_empty() {
        return Ok(Frontmatter::default());
    }

    serde_yaml::from_str(yaml).map_err(|e| CatalogError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn read_frontmatter(path: &Path) -> Result<Frontmatter, CatalogError> {
    let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_frontmatter(path, &content)
}

/// Name a unit is expected to declare: the directory name, or the file name
/// without its suffix.
fn expected_name(unit: &Unit) -> &str {
    match &unit.kind {
        UnitKind::Directory => &unit.name,
        UnitKind::File { suffix } => unit.name.strip_suffix(suffix.as_str()).unwrap_or(&unit.name),
    }
}

/// List the units under `root` with their declared descriptions.
///
/// Frontmatter problems are reported per entry; only failing to list the
/// root itself is an error.
pub fn catalog(root: &Path, kind: &UnitKind) -> Result<Vec<CatalogEntry>, SyncError> {
    if !root.is_dir() {
        return Err(SyncError::NotFound(root.to_path_buf()));
    }

    let entries = discover_units(root, kind)?
        .into_iter()
        .map(|unit| {
            let (description, problem) = match read_frontmatter(&manifest_path(&unit)) {
                Ok(front) => {
                    let problem = match front.name.as_deref() {
                        None => Some("frontmatter has no name".to_string()),
                        Some(declared) if declared != expected_name(&unit) => Some(format!(
                            "frontmatter name '{}' does not match '{}'",
                            declared,
                            expected_name(&unit)
                        )),
                        Some(_) => None,
                    };
                    (front.description, problem)
                }
                Err(e) => (None, Some(e.to_string())),
            };
            CatalogEntry {
                name: unit.name,
                description,
                problem,
            }
        })
        .collect();

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_frontmatter() {
        let content = concat!(
            "---\nname: code-review\ndescription: Reviews diffs\n",
            "tools: Read, Grep\n---\n\n# Body\n"
        );
        let front = parse_frontmatter(Path::new("x"), content).unwrap();
        assert_eq!(front.name.as_deref(), Some("code-review"));
        assert_eq!(front.description.as_deref(), Some("Reviews diffs"));
    }

    #[test]
    fn test_parse_frontmatter_crlf() {
        let content = "---\r\nname: planner\r\n---\r\nbody";
        let front = parse_frontmatter(Path::new("x"), content).unwrap();
        assert_eq!(front.name.as_deref(), Some("planner"));
    }

    #[test]
    fn test_parse_frontmatter_missing() {
        let result = parse_frontmatter(Path::new("x"), "# Just a heading\n");
        assert!(matches!(result, Err(CatalogError::MissingFrontmatter(_))));
    }

    #[test]
    fn test_parse_frontmatter_invalid_yaml() {
        let result = parse_frontmatter(Path::new("x"), "---\nname: [unclosed\n---\n");
        assert!(matches!(result, Err(CatalogError::Parse { .. })));
    }

    #[test]
    fn test_catalog_reports_problems_per_unit() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::create_dir_all(root.join("good")).unwrap();
        fs::write(
            root.join("good/SKILL.md"),
            "---\nname: good\ndescription: Does good things\n---\n",
        )
        .unwrap();
        fs::create_dir_all(root.join("renamed")).unwrap();
        fs::write(root.join("renamed/SKILL.md"), "---\nname: other\n---\n").unwrap();
        fs::create_dir_all(root.join("bare")).unwrap();

        let entries = catalog(root, &UnitKind::Directory).unwrap();
        assert_eq!(entries.len(), 3);

        assert_eq!(entries[0].name, "bare");
        assert!(entries[0].problem.as_deref().unwrap().contains("failed to read"));

        assert_eq!(entries[1].name, "good");
        assert_eq!(entries[1].description.as_deref(), Some("Does good things"));
        assert!(entries[1].problem.is_none());

        assert_eq!(entries[2].name, "renamed");
        assert!(entries[2].problem.as_deref().unwrap().contains("does not match"));
    }

    #[test]
    fn test_catalog_file_units_strip_suffix() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        fs::write(
            root.join("planner.md"),
            "---\nname: planner\ndescription: Plans work\n---\n",
        )
        .unwrap();

        let entries = catalog(root, &UnitKind::file(".md")).unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].problem.is_none());
    }

    #[test]
    fn test_catalog_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let result = catalog(&temp_dir.path().join("missing"), &UnitKind::Directory);
        assert!(matches!(result, Err(SyncError::NotFound(_))));
    }
}
