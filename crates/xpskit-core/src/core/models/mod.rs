//! # Core Models Module
//!
//! Plain data structures describing an XPS analysis session: the measured spectra,
//! the settings that drive each processing step, and the tabular results.
//!
//! ## Key Components
//!
//! - [`spectrum`] - `Spectrum` and the ordered, always-aligned `Dataset`
//! - [`shift`] - Charge-shift correction parameters and their defaults
//! - [`rsf`] - Reference sensitivity factors used for quantification
//! - [`peaks`] - Peak models, the seed table and save-time validation
//! - [`results`] - Fitted components, the structured report and display rows
//!
//! None of these types talk to the filesystem or the numerical subsystem; loading and
//! persisting them is the job of [`crate::core::settings`] and the engine tasks.

pub mod peaks;
pub mod results;
pub mod rsf;
pub mod shift;
pub mod spectrum;
