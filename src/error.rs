use std::path::PathBuf;

use thiserror::Error;

/// Application-wide result type alias.
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types.
#[derive(Debug, Error)]
pub enum AppError {
    /// I/O errors that are not tied to a particular listing.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Terminal initialization or rendering errors.
    #[error("Terminal error: {0}")]
    Terminal(String),

    /// Invalid path provided by the user.
    #[error("Invalid path: {0}")]
    InvalidPath(String),

    /// The directory being listed could not be read.
    #[error("cannot list {}: {source}", path.display())]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// An external program could not be started or exited with failure.
    #[error("Command failed: {0}")]
    Command(String),
}

impl AppError {
    pub fn list(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AppError::List {
            path: path.into(),
            source,
        }
    }
}
