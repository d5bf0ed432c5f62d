use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Contract violations and setup failures.
///
/// Per-path filesystem conditions (permission denied, vanished paths, symlink
/// escapes) are not represented here. The scanner turns them into diagnostics
/// and the executor into skipped/failed outcomes.
#[derive(Error, Debug)]
pub enum Error {
    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("invalid selection: {0}")]
    Selection(String),

    #[error("duplicate category id: {0}")]
    DuplicateCategory(String),

    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("detection root must be absolute: {}", .0.display())]
    RelativeRoot(PathBuf),

    #[error("config error in {}: {message}", path.display())]
    Config { path: PathBuf, message: String },

    #[error("history database error: {0}")]
    History(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
