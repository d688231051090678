// src/walk.rs

use std::path::{Path, PathBuf};

use crate::error::Result;

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|e| e == ext))
}

/// Recursively collects files under `root` whose extension (without the dot)
/// is one of `extensions`, honouring `.gitignore`. The result is sorted.
pub fn candidate_files(root: &Path, extensions: &[String]) -> Result<Vec<PathBuf>> {
    let walker = ignore::WalkBuilder::new(root)
        .hidden(false)
        .filter_entry(|entry| entry.file_name() != ".git")
        .build();
    let mut files = Vec::new();

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }
        if has_extension(entry.path(), extensions) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}
