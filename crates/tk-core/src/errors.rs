use crate::messaging::types::Capability;

/// Core error type.
///
/// Adapter crates map their specific errors into this type so the command
/// interpreter can report failures consistently.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("operation not supported by backend: {0:?}")]
    Unsupported(Capability),

    #[error("external error: {0}")]
    External(String),
}

pub type Result<T> = std::result::Result<T, Error>;
