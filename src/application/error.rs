//! Application-level errors (wraps domain and codec errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::codec::CodecError;
use crate::domain::DomainError;

/// Application errors wrap domain and codec errors and add file-level context.
#[derive(Error, Debug)]
pub enum ApplicationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Codec(#[from] CodecError),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("I/O error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("config error: {message}")]
    Config { message: String },
}

/// Result type for application layer operations.
pub type ApplicationResult<T> = Result<T, ApplicationError>;
