//! Project initialization
//!
//! Scaffolds a repository layout skillsync can install from: the config
//! file plus empty `skills/` and `agents/` directories.

use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::Path;

use crate::config::{CONFIG_FILE_NAME, DEFAULT_CONFIG_TEMPLATE};

/// Outcome of writing the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Created,
    Overwritten,
    AlreadyExists,
}

/// Initialize a new skillsync project in `project_root`
pub fn init(project_root: &Path, force: bool) -> Result<InitOutcome> {
    for dir_name in ["skills", "agents"] {
        let dir = project_root.join(dir_name);
        if !dir.exists() {
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
            println!("  {} Created directory: {}", "✔".green(), dir.display());
        }
    }

    let config_path = project_root.join(CONFIG_FILE_NAME);
    let existed = config_path.exists();

    if existed && !force {
        println!(
            "  {} Config already exists: {} (use --force to overwrite)",
            "!".yellow(),
            config_path.display()
        );
        return Ok(InitOutcome::AlreadyExists);
    }

    fs::write(&config_path, DEFAULT_CONFIG_TEMPLATE)
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
    println!("  {} Created: {}", "✔".green(), config_path.display());

    Ok(if existed {
        InitOutcome::Overwritten
    } else {
        InitOutcome::Created
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_layout() {
        let temp_dir = TempDir::new().unwrap();
        let outcome = init(temp_dir.path(), false).unwrap();

        assert_eq!(outcome, InitOutcome::Created);
        assert!(temp_dir.path().join("skills").is_dir());
        assert!(temp_dir.path().join("agents").is_dir());
        let config = Config::load(&temp_dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(config.collections.len(), 2);
    }

    #[test]
    fn test_init_keeps_existing_config_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "# mine\n").unwrap();

        let outcome = init(temp_dir.path(), false).unwrap();
        assert_eq!(outcome, InitOutcome::AlreadyExists);
        assert_eq!(fs::read_to_string(&config_path).unwrap(), "# mine\n");
    }

    #[test]
    fn test_init_force_overwrites() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join(CONFIG_FILE_NAME);
        fs::write(&config_path, "# mine\n").unwrap();

        let outcome = init(temp_dir.path(), true).unwrap();
        assert_eq!(outcome, InitOutcome::Overwritten);
        assert_eq!(
            fs::read_to_string(&config_path).unwrap(),
            DEFAULT_CONFIG_TEMPLATE
        );
    }
}
