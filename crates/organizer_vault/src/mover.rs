use organizer_core::Destination;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::MoveError;

/// Folder comparison used to decide whether a document is already in place.
/// Case-insensitive so a re-run on a case-insensitive filesystem is a no-op.
pub fn same_folder(current: &str, destination: &Destination) -> bool {
    let current = current.replace('\\', "/");
    let current = current.trim_matches('/');
    current.to_lowercase() == destination.relative_path().to_lowercase()
}

/// Absolute target path for `file_name` under `destination`.
pub fn target_path(vault_root: &Path, destination: &Destination, file_name: &str) -> PathBuf {
    vault_root.join(destination.to_path_buf()).join(file_name)
}

/// Move `from` into `destination`, creating folders as needed. Never overwrites:
/// an existing file at the target leaves the source untouched.
pub fn move_document(
    vault_root: &Path,
    from: &Path,
    destination: &Destination,
) -> Result<PathBuf, MoveError> {
    let file_name = from
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let to = target_path(vault_root, destination, &file_name);
    if to.exists() {
        return Err(MoveError::AlreadyExists(to));
    }

    let io_err = |source| MoveError::Io {
        from: from.to_path_buf(),
        to: to.clone(),
        source,
    };
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::rename(from, &to).map_err(io_err)?;
    tracing::debug!(from = %from.display(), to = %to.display(), "moved document");
    Ok(to)
}
