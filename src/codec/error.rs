//! Codec errors

use thiserror::Error;

/// Only lexically invalid input is an error; odd but parseable structure
/// degrades to defaults instead.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("malformed document: {0}")]
    MalformedDocument(#[source] serde_yaml::Error),

    #[error("cannot emit document: {0}")]
    Emit(#[source] serde_yaml::Error),

    #[error("tree too deep to write: {depth} levels, at most {max} can be read back")]
    TooDeep { depth: usize, max: usize },
}

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;
