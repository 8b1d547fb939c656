//! Error types for the playback harness.

use flythru_core::PathError;
use thiserror::Error;

/// Errors raised while setting up or recording a run.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("path error: {0}")]
    Path(#[from] PathError),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl SimError {
    pub fn config(msg: impl Into<String>) -> Self {
        SimError::Config(msg.into())
    }
}

impl From<std::io::Error> for SimError {
    fn from(e: std::io::Error) -> Self {
        SimError::Export(e.to_string())
    }
}

impl From<serde_json::Error> for SimError {
    fn from(e: serde_json::Error) -> Self {
        SimError::Export(e.to_string())
    }
}
