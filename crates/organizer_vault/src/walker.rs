use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::error::VaultError;

pub const MARKDOWN_EXTENSION: &str = "md";

/// Every markdown file under `root`, sorted.
///
/// Hidden entries (`.obsidian`, `.trash`, ...) and any directory named `index_folder`
/// are skipped at every depth. Unreadable subdirectories are logged and skipped;
/// an unreadable root is an error.
pub fn collect_markdown_files(root: &Path, index_folder: &str) -> Result<Vec<PathBuf>, VaultError> {
    if !root.is_dir() {
        return Err(VaultError::NotADirectory(root.to_path_buf()));
    }

    let mut files: Vec<PathBuf> = Vec::new();
    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_skipped(entry, index_folder));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) if err.depth() == 0 => {
                return Err(VaultError::Walk {
                    path: root.to_path_buf(),
                    message: err.to_string(),
                });
            }
            Err(err) => {
                tracing::warn!(error = %err, "skipping unreadable vault entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_markdown(entry.path()) {
            files.push(entry.into_path());
        }
    }

    files.sort();
    Ok(files)
}

fn is_skipped(entry: &DirEntry, index_folder: &str) -> bool {
    let name = entry.file_name().to_string_lossy();
    if name.starts_with('.') {
        return true;
    }
    entry.file_type().is_dir() && name.eq_ignore_ascii_case(index_folder)
}

fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(MARKDOWN_EXTENSION))
}
