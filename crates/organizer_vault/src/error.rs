use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VaultError {
    #[error("vault root {0} is not a directory")]
    NotADirectory(PathBuf),

    #[error("io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("index folder `{0}` must be a single folder name inside the vault")]
    InvalidIndexFolder(String),

    #[error("walk {path}: {message}")]
    Walk { path: PathBuf, message: String },

    #[error("serialize frontmatter for {path}: {message}")]
    Frontmatter { path: PathBuf, message: String },

    #[error(transparent)]
    Move(#[from] MoveError),
}

#[derive(Debug, Error)]
pub enum MoveError {
    #[error("file already exists at destination: {0}")]
    AlreadyExists(PathBuf),

    #[error("move {from} -> {to}: {source}")]
    Io {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
