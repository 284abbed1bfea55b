use crate::core::models::peaks::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Could not determine any settings directory for the current user")]
    NoSettingsDirectory,

    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON error for '{path}': {source}")]
    Json {
        path: String,
        source: serde_json::Error,
    },

    #[error("Peak-model table rejected: {0}")]
    Validation(#[from] ValidationError),
}
