//! Git hook management
//!
//! Wires a repository's git hooks so the install re-runs after the checkout
//! changes (e.g. on `git pull`). The hook script keeps any content it already
//! had; only the block between the START/END markers belongs to us.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Marker text for the managed block
pub const HOOK_MARKER: &str = "skillsync";

/// Hooks that fire after the working tree changed.
pub const SUPPORTED_HOOKS: &[&str] = &["post-merge", "post-checkout", "post-rewrite"];

const SHEBANG: &str = "#!/bin/sh";

#[derive(Debug, Error)]
pub enum HookError {
    #[error("Not a git repository: {}", .0.display())]
    NotARepository(PathBuf),
    #[error(
        "Unsupported git hook '{0}' (expected one of: {list})",
        list = SUPPORTED_HOOKS.join(", ")
    )]
    UnsupportedEvent(String),
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn io_err(path: &Path) -> impl FnOnce(std::io::Error) -> HookError + '_ {
    move |source| HookError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    Installed,
    Updated,
    Unchanged,
    Removed,
    NotInstalled,
}

/// Locate the hooks directory of the repository rooted at `repo_root`.
///
/// Handles `.git` files (worktrees, submodules) by following the `gitdir:`
/// pointer and, for worktrees, the `commondir` file next to it.
pub fn hooks_dir(repo_root: &Path) -> Result<PathBuf, HookError> {
    let dot_git = repo_root.join(".git");

    if dot_git.is_dir() {
        return Ok(dot_git.join("hooks"));
    }

    if !dot_git.is_file() {
        return Err(HookError::NotARepository(repo_root.to_path_buf()));
    }

    let content = fs::read_to_string(&dot_git).map_err(io_err(&dot_git))?;
    let gitdir = content
        .lines()
        .find_map(|line| line.strip_prefix("gitdir:"))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| HookError::NotARepository(repo_root.to_path_buf()))?;
    let gitdir = repo_root.join(gitdir);

    let commondir_file = gitdir.join("commondir");
    let common = if commondir_file.is_file() {
        let rel = fs::read_to_string(&commondir_file).map_err(io_err(&commondir_file))?;
        gitdir.join(rel.trim())
    } else {
        gitdir
    };

    Ok(common.join("hooks"))
}

fn validate_event(event: &str) -> Result<(), HookError> {
    if SUPPORTED_HOOKS.contains(&event) {
        Ok(())
    } else {
        Err(HookError::UnsupportedEvent(event.to_string()))
    }
}

fn start_marker() -> String {
    format!("# START {}", HOOK_MARKER)
}

fn end_marker() -> String {
    format!("# END {}", HOOK_MARKER)
}

fn managed_block(command: &str) -> String {
    format!(
        "\n{start}\n{command} || echo \"skillsync: sync failed\" >&2\n{end}\n",
        start = start_marker(),
        end = end_marker(),
    )
}

/// Quote `s` for a POSIX shell.
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Command line the hook runs: `apply` against the repository.
pub fn hook_command(exe: &Path, repo_root: &Path) -> String {
    format!(
        "{} apply --path {}",
        shell_quote(&exe.display().to_string()),
        shell_quote(&repo_root.display().to_string())
    )
}

/// Remove the managed block from hook content
fn remove_managed_section(content: &str) -> String {
    let start = start_marker();
    let end = end_marker();
    let mut result = String::new();
    let mut in_managed_section = false;

    for line in content.lines() {
        if line.trim() == start {
            in_managed_section = true;
            continue;
        }
        if line.trim() == end {
            in_managed_section = false;
            continue;
        }
        if !in_managed_section {
            result.push_str(line);
            result.push('\n');
        }
    }

    result
}

fn has_managed_section(content: &str) -> bool {
    let start = start_marker();
    content.lines().any(|line| line.trim() == start)
}

/// Install (or refresh) the managed block in the `event` hook script.
pub fn install_hook(
    repo_root: &Path,
    event: &str,
    command: &str,
) -> Result<HookOutcome, HookError> {
    validate_event(event)?;

    let dir = hooks_dir(repo_root)?;
    fs::create_dir_all(&dir).map_err(io_err(&dir))?;
    let hook_path = dir.join(event);

    let existing = if hook_path.exists() {
        fs::read_to_string(&hook_path).map_err(io_err(&hook_path))?
    } else {
        String::new()
    };

    let had_block = has_managed_section(&existing);
    let base = remove_managed_section(&existing);
    let base = if base.trim().is_empty() {
        SHEBANG.to_string()
    } else {
        base.trim_end().to_string()
    };
    let new_content = format!("{}\n{}", base, managed_block(command));

    let outcome = if new_content == existing {
        HookOutcome::Unchanged
    } else {
        fs::write(&hook_path, &new_content).map_err(io_err(&hook_path))?;
        if had_block {
            HookOutcome::Updated
        } else {
            HookOutcome::Installed
        }
    };

    set_executable(&hook_path)?;
    tracing::debug!(hook = %hook_path.display(), ?outcome, "git hook install");

    Ok(outcome)
}

/// Strip the managed block from the `event` hook script, deleting the script
/// when nothing but the shebang remains.
pub fn uninstall_hook(repo_root: &Path, event: &str) -> Result<HookOutcome, HookError> {
    validate_event(event)?;

    let hook_path = hooks_dir(repo_root)?.join(event);
    if !hook_path.exists() {
        return Ok(HookOutcome::NotInstalled);
    }

    let existing = fs::read_to_string(&hook_path).map_err(io_err(&hook_path))?;
    if !has_managed_section(&existing) {
        return Ok(HookOutcome::NotInstalled);
    }

    let remaining = remove_managed_section(&existing);
    let trimmed = remaining.trim();
    if trimmed.is_empty() || trimmed == SHEBANG {
        fs::remove_file(&hook_path).map_err(io_err(&hook_path))?;
    } else {
        fs::write(&hook_path, format!("{}\n", remaining.trim_end()))
            .map_err(io_err(&hook_path))?;
    }

    Ok(HookOutcome::Removed)
}

/// Whether the `event` hook carries the managed block.
pub fn hook_installed(repo_root: &Path, event: &str) -> Result<bool, HookError> {
    validate_event(event)?;
    let hook_path = hooks_dir(repo_root)?.join(event);
    if !hook_path.exists() {
        return Ok(false);
    }
    let content = fs::read_to_string(&hook_path).map_err(io_err(&hook_path))?;
    Ok(has_managed_section(&content))
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<(), HookError> {
    use std::os::unix::fs::PermissionsExt;

    let mut perms = fs::metadata(path).map_err(io_err(path))?.permissions();
    let mode = perms.mode();
    if mode & 0o111 != 0o111 {
        perms.set_mode(mode | 0o755);
        fs::set_permissions(path, perms).map_err(io_err(path))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<(), HookError> {
    Ok(())
}
