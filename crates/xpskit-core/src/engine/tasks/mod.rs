//! Tasks performing one numerical operation each through the gateway.
//!
//! Loading and shift correction replace the dataset held by the store; quantification
//! and fitting only read it. Fitting works on a single spectrum and reports failures
//! as [`crate::engine::error::FitError`] so the caller can keep going.

pub mod fit;
pub mod load;
pub mod quantify;
pub mod shift;
