//! Recursive CSV file discovery.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

/// Returns true when a file name ends in `.csv`, compared case-insensitively.
pub fn is_csv_file_name(name: &OsStr) -> bool {
    name.to_string_lossy().to_ascii_lowercase().ends_with(".csv")
}

/// Lists every CSV file under `root`, descending into all subdirectories.
///
/// Paths are returned in traversal order; entries within a directory are
/// visited sorted by file name. A missing root yields an empty list, and
/// unreadable entries are skipped with a warning.
pub fn list_csv_files(root: &Path) -> Vec<PathBuf> {
    if !root.is_dir() {
        warn!(root = %root.display(), "root directory not found, nothing to discover");
        return Vec::new();
    }

    let root = std::path::absolute(root).unwrap_or_else(|_| root.to_path_buf());
    let mut files = Vec::new();

    for entry_result in WalkDir::new(&root).sort_by_file_name() {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(error) => {
                warn!(%error, "skipping unreadable directory entry");
                continue;
            }
        };

        // Skip directories
        if entry.file_type().is_dir() {
            continue;
        }

        if is_csv_file_name(entry.file_name()) {
            files.push(entry.into_path());
        }
    }

    debug!(root = %root.display(), file_count = files.len(), "discovery complete");
    files
}
