// src/error.rs

//! Crate-wide error type

use crate::shadow::FileError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the booster library
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Not a directory: {}", .0.display())]
    InvalidRoot(PathBuf),

    /// A per-file failure promoted to a pass failure (fail-fast mode)
    #[error(transparent)]
    File(Box<FileError>),
}

impl From<FileError> for Error {
    fn from(err: FileError) -> Self {
        Error::File(Box::new(err))
    }
}

/// Result alias for booster operations
pub type Result<T> = std::result::Result<T, Error>;
