use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole scan or sync.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Mapping file not found: {}", .0.display())]
    MappingNotFound(PathBuf),

    #[error("Mapping file {} is not a valid fingerprint map: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// A fingerprint could not be computed for one file.
#[derive(Error, Debug)]
#[error("cannot fingerprint {}: {source}", .path.display())]
pub struct HashError {
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

/// Per-file problems. These never abort an operation; they are collected into
/// the result and reported as they happen.
#[derive(Error, Debug)]
pub enum FileIssue {
    #[error(transparent)]
    Hash(#[from] HashError),

    #[error("cannot read directory entry: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("path is not valid UTF-8: {}", .0.display())]
    NonUtf8Path(PathBuf),

    #[error("file name '{0}' contains '\\' and would be read back as a nested path")]
    AmbiguousName(String),

    #[error("mapping entry '{0}' does not name a path inside the target directory")]
    UnsafePath(String),

    #[error("destination {} is occupied, not moving {}", .to.display(), .from.display())]
    MoveConflict { from: PathBuf, to: PathBuf },

    #[error("failed to move {} to {}: {error}", .from.display(), .to.display())]
    Move {
        from: PathBuf,
        to: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("failed to create directory {}: {error}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        error: io::Error,
    },

    #[error("failed to remove directory {}: {error}", .path.display())]
    Prune {
        path: PathBuf,
        #[source]
        error: io::Error,
    },
}
