//! # Settings Module
//!
//! Per-user configuration documents: where they live and how they are read and
//! written.
//!
//! - [`resolver`] - Probes the candidate directories in order and hands out the
//!   canonical write location.
//! - [`store`] - Typed read/write for shift settings, reference factors, peak models
//!   and the numerical-subsystem path. Unreadable files are logged and replaced by
//!   defaults instead of failing the caller.
//! - [`error`] - The settings error type.

pub mod error;
pub mod resolver;
pub mod store;

pub use error::SettingsError;
pub use resolver::{Resolved, SettingsResolver};
pub use store::SettingsStore;
