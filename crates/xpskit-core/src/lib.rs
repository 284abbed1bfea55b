//! # XPSKit Core Library
//!
//! An orchestration engine for X-ray photoelectron spectroscopy analysis: loading
//! multi-region spectral datasets, correcting charging shifts, computing atomic
//! percentages and fitting peak components.
//!
//! ## Architectural Philosophy
//!
//! The numerics (raw-file parsing, Shirley backgrounds, curve fitting) live in an
//! external numerical subsystem. This library owns everything around them, split into
//! three layers:
//!
//! - **[`core`]: The Foundation.** Stateless data models (`Dataset`, `PeakModelTable`,
//!   `AnalysisReport`), the multi-directory settings resolver and CSV export.
//!
//! - **[`engine`]: The Logic Core.** The stateful layer: the `Gateway` serializing every
//!   call into the numerical subsystem, the `DatasetStore` with wholesale replacement,
//!   and one task per numeric operation.
//!
//! - **[`workflows`]: The Public API.** The peak-fitting orchestrator and the
//!   `AnalysisSession` facade a front-end drives.

pub mod core;
pub mod engine;
pub mod workflows;
