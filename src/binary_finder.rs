//! Locating the bedtools executable
//!
//! Works with an explicitly configured install directory, with an absolute
//! executable path and with system installs on `PATH`.

use crate::error::{BedToolsError, Result};
use std::path::{Path, PathBuf};

/// Find the toolkit binary by name
///
/// Search order:
/// 1. `name` itself when it is a path to an existing file
/// 2. The configured install directory
/// 3. System PATH
pub fn find_binary(name: &str, search_dir: Option<&Path>) -> Result<PathBuf> {
    let as_path = Path::new(name);
    if as_path.components().count() > 1 {
        if as_path.is_file() {
            return Ok(as_path.to_path_buf());
        }
        return Err(BedToolsError::Installation {
            toolkit: name.to_string(),
            reason: format!("{} does not exist", as_path.display()),
        });
    }

    if let Some(dir) = search_dir {
        let binary = dir.join(name);
        if binary.is_file() {
            return Ok(binary);
        }
        log::debug!("{name} not in {}, falling back to PATH", dir.display());
    }

    if let Ok(path) = which::which(name) {
        return Ok(path);
    }

    Err(BedToolsError::Installation {
        toolkit: name.to_string(),
        reason: format!("{name} binary not found. Install bedtools or ensure it is in PATH."),
    })
}
