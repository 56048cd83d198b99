use thiserror::Error;

/// Errors produced by the translation subsystem.
///
/// `InvalidArgument` indicates caller misuse (empty locale, empty key,
/// feature disabled) and is never silently recovered. The remaining
/// variants wrap infrastructure failures from the store, filesystem or
/// serialization layers; they propagate uncaught — no retry policy is
/// defined at this layer.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error(transparent)]
    Database(#[from] rusqlite::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
