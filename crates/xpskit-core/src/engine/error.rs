use thiserror::Error;

use crate::core::models::peaks::ValidationError;
use crate::core::models::spectrum::DatasetError;
use crate::core::settings::SettingsError;

/// Failures at the numerical-subsystem call boundary.
#[derive(Debug, Error)]
pub enum SubsystemError {
    #[error("The numerical subsystem has not been initialized")]
    NotInitialized,

    #[error("The numerical subsystem failed to start: {0}")]
    Startup(String),

    #[error("{module}.{function} raised: {message}")]
    Raised {
        module: &'static str,
        function: &'static str,
        message: String,
    },

    #[error("Transport failure while talking to the numerical subsystem: {0}")]
    Transport(String),

    #[error("I/O error on the numerical-subsystem channel: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed response from {function}: {reason}")]
    MalformedResponse {
        function: &'static str,
        reason: String,
    },

    #[error("The gateway lock was poisoned by a panic in an earlier call")]
    Poisoned,
}

impl SubsystemError {
    /// Whether the channel to the subsystem is gone, so it must be started again
    /// before the next call.
    pub fn is_disconnect(&self) -> bool {
        matches!(self, SubsystemError::Transport(_) | SubsystemError::Io(_))
    }
}

/// Per-spectrum fitting failures. These never abort an analysis run.
#[derive(Debug, Error)]
pub enum FitError {
    #[error("Background computation failed: {0}")]
    Baseline(#[source] SubsystemError),

    #[error("Background has {baseline} points but the spectrum has {spectrum}")]
    BaselineLength { baseline: usize, spectrum: usize },

    #[error("Peak fitting failed: {0}")]
    Fitting(#[source] SubsystemError),

    #[error("Peak fitting did not converge")]
    NotConverged,

    #[error("Fitted component '{name}' has a non-finite {field}")]
    NonFinite { name: String, field: &'static str },
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(
        "Could not start the numerical subsystem: {source}. Check that the configured interpreter path points to a working Python installation with numpy and scipy."
    )]
    SubsystemInit {
        #[source]
        source: SubsystemError,
    },

    #[error(
        "Failed to load '{path}': {source}. Check the numerical-subsystem configuration and that the analysis modules are installed."
    )]
    Load {
        path: String,
        #[source]
        source: SubsystemError,
    },

    #[error("No spectra were found in '{path}'")]
    NoData { path: String },

    #[error("The dataset is empty; load a file first")]
    EmptyDataset,

    #[error("Shift correction failed: {0}")]
    Shift(#[source] SubsystemError),

    #[error("Shift correction returned {actual} spectra for a dataset of {expected}")]
    ShiftCountMismatch { expected: usize, actual: usize },

    #[error("Quantification failed: {0}")]
    Quantification(#[source] SubsystemError),

    #[error("Inconsistent dataset: {0}")]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),
}
