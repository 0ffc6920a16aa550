//! Configuration parsing for skillsync
//!
//! Handles the optional TOML configuration file that names the collections
//! to install (source directory, destination directory, unit kind) and the
//! defaults for a sync run. Without a file, the built-in layout applies:
//! `skills/` directories and `agents/*.md` files.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::unit::{DEFAULT_FILE_SUFFIX, UnitKind};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "skillsync.toml";

/// Environment variable overriding the assistant's configuration directory
pub const CONFIG_DIR_ENV: &str = "CLAUDE_CONFIG_DIR";

/// Configuration directory name under the home directory
pub const DEFAULT_CONFIG_DIR_NAME: &str = ".claude";

/// Root configuration structure
#[derive(Debug, Deserialize)]
pub struct Config {
    /// Defaults for sync runs
    #[serde(default)]
    pub sync: SyncSettings,

    /// Collections to install, keyed by name
    #[serde(default = "default_collections")]
    pub collections: BTreeMap<String, CollectionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sync: SyncSettings::default(),
            collections: default_collections(),
        }
    }
}

/// Sync run defaults
#[derive(Debug, Deserialize, Default)]
pub struct SyncSettings {
    /// Delete installed units that no longer exist in the source
    #[serde(default)]
    pub remove_orphans: bool,

    /// Content comparison strategy
    #[serde(default)]
    pub compare: CompareMode,
}

/// Content comparison strategy
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CompareMode {
    /// Byte-for-byte comparison
    #[default]
    Bytes,
    /// SHA-256 digest comparison
    Sha256,
}

/// Configuration for a single collection
#[derive(Debug, Deserialize)]
pub struct CollectionConfig {
    /// Whether this collection is installed
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Source directory (relative to the project root)
    pub source: String,

    /// Destination directory (relative to the config dir, or `~/...`)
    pub destination: String,

    /// Kind of units in the collection
    #[serde(rename = "type")]
    pub collection_type: CollectionType,

    /// File suffix for `file` collections
    #[serde(default)]
    pub suffix: Option<String>,
}

/// Kind of units a collection holds
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionType {
    /// Every subdirectory is a unit (skills)
    Directory,
    /// Every file with the suffix is a unit (agents)
    File,
}

fn default_true() -> bool {
    true
}

fn default_collections() -> BTreeMap<String, CollectionConfig> {
    let mut collections = BTreeMap::new();
    collections.insert(
        "agents".to_string(),
        CollectionConfig {
            enabled: true,
            source: "agents".to_string(),
            destination: "agents".to_string(),
            collection_type: CollectionType::File,
            suffix: Some(DEFAULT_FILE_SUFFIX.to_string()),
        },
    );
    collections.insert(
        "skills".to_string(),
        CollectionConfig {
            enabled: true,
            source: "skills".to_string(),
            destination: "skills".to_string(),
            collection_type: CollectionType::Directory,
            suffix: None,
        },
    );
    collections
}

impl CollectionConfig {
    /// Unit kind for the synchronizer
    pub fn unit_kind(&self) -> UnitKind {
        match self.collection_type {
            CollectionType::Directory => UnitKind::Directory,
            CollectionType::File => {
                UnitKind::file(self.suffix.as_deref().unwrap_or(DEFAULT_FILE_SUFFIX))
            }
        }
    }

    /// Absolute source root
    pub fn source_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.source)
    }

    /// Absolute destination root
    pub fn destination_path(&self, config_dir: &Path) -> PathBuf {
        if let Some(rest) = self.destination.strip_prefix("~/")
            && let Some(home) = dirs::home_dir()
        {
            return home.join(rest);
        }
        config_dir.join(&self.destination)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file by searching up from `start_dir`.
    ///
    /// Returns `None` when no file exists; callers fall back to
    /// [`Config::default`].
    pub fn find_config(start_dir: &Path) -> Option<PathBuf> {
        start_dir
            .ancestors()
            .map(|dir| dir.join(CONFIG_FILE_NAME))
            .find(|candidate| candidate.is_file())
    }

    /// Get the project root directory (location of the config file)
    pub fn project_root(config_path: &Path) -> PathBuf {
        config_path.parent().unwrap_or(config_path).to_path_buf()
    }

    /// Enabled collections, optionally restricted to `only` (case-insensitive).
    pub fn selected_collections<'a>(
        &'a self,
        only: Option<&'a [String]>,
    ) -> impl Iterator<Item = (&'a String, &'a CollectionConfig)> + 'a {
        self.collections.iter().filter(move |(name, collection)| {
            collection.enabled
                && only.is_none_or(|filter| filter.iter().any(|f| f.eq_ignore_ascii_case(name)))
        })
    }

    fn validate(&self) -> Result<()> {
        for (name, collection) in &self.collections {
            if collection.source.trim().is_empty() || collection.destination.trim().is_empty() {
                anyhow::bail!("Collection '{}' needs both a source and a destination", name);
            }
            if collection.collection_type == CollectionType::Directory
                && collection.suffix.is_some()
            {
                anyhow::bail!(
                    "Collection '{}' sets a suffix but holds directories; \
                     suffix only applies to type = \"file\"",
                    name
                );
            }
        }
        Ok(())
    }
}

/// Resolve the assistant's configuration directory.
///
/// Explicit value (flag or `CLAUDE_CONFIG_DIR`, resolved by the CLI) wins,
/// then `~/.claude`.
pub fn resolve_config_dir(explicit: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir);
    }
    let home = dirs::home_dir().context("Could not determine the home directory")?;
    Ok(home.join(DEFAULT_CONFIG_DIR_NAME))
}

/// Contents written by `skillsync init`
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# skillsync configuration
#
# Collections are installed from `source` (relative to this file) into
# `destination` (relative to the assistant's config dir, default ~/.claude).

[sync]
# Delete installed units that no longer exist here
remove_orphans = false
# "bytes" or "sha256"
compare = "bytes"

[collections.skills]
source = "skills"
destination = "skills"
type = "directory"

[collections.agents]
source = "agents"
destination = "agents"
type = "file"
suffix = ".md"
"#;
