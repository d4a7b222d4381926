//! Crate error type.

use crate::config::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum UiError {
    #[error("document has no <{0}> element")]
    MissingRoot(&'static str),
    #[error("local storage is unavailable")]
    StorageUnavailable,
    #[error("local storage {op} failed: {message}")]
    Storage { op: &'static str, message: String },
    #[error("dom call {call} failed: {message}")]
    Dom { call: &'static str, message: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
}
