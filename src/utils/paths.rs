//! Path utilities for the gber CLI

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::{hints, GberError};

/// Find the Go project root by walking up towards the nearest go.mod
pub fn find_go_project_dir(start: &Path) -> Result<PathBuf> {
    let mut dir = start;
    loop {
        if dir.join("go.mod").exists() {
            return Ok(dir.to_path_buf());
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => {
                return Err(GberError::config_error_with_hint(
                    "not inside a Go project",
                    hints::go_project(),
                )
                .into())
            }
        }
    }
}

/// Get the build output directory for a project
pub fn build_dir(project_dir: &Path) -> PathBuf {
    project_dir.join("build")
}

/// Ensure a directory exists
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)
            .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_project_root_from_subdirectory() {
        let tmp = tempfile::tempdir().unwrap();
        let root = tmp.path().join("proj");
        let nested = root.join("cmd").join("app");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(root.join("go.mod"), "module example.com/proj\n").unwrap();

        let found = find_go_project_dir(&nested).unwrap();
        assert_eq!(found, root);
    }

    #[test]
    fn fails_outside_go_project() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(find_go_project_dir(tmp.path()).is_err());
    }
}
