//! Equation file discovery.
//!
//! Enumerates the entries directly inside the input directory and keeps
//! the regular files with the recognized extension. Subdirectories and
//! other extensions are skipped without comment.

use crate::{EqusendError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Find equation files in `dir`, returning absolute paths in sorted order
/// so repeated scans of an unchanged directory agree.
///
/// The caller is expected to have validated that `dir` exists; an
/// unreadable or missing path still fails cleanly as a `Discovery` error.
/// Zero matches is a terminal condition for the run and fails with
/// `NoInputFiles`.
pub fn discover_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    let entries = std::fs::read_dir(dir)
        .map_err(|e| EqusendError::Discovery(format!("cannot read {}: {}", dir.display(), e)))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry
            .map_err(|e| EqusendError::Discovery(format!("cannot read {}: {}", dir.display(), e)))?;
        let path = entry.path();

        if !path.is_file() {
            continue;
        }
        if path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }

        let absolute = path.canonicalize().map_err(|e| {
            EqusendError::Discovery(format!("cannot resolve {}: {}", path.display(), e))
        })?;
        files.push(absolute);
    }

    if files.is_empty() {
        return Err(EqusendError::NoInputFiles(dir.to_path_buf()));
    }

    files.sort();
    debug!("discovered {} .{} files in {}", files.len(), extension, dir.display());
    Ok(files)
}
