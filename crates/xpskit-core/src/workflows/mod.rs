//! # Workflows Module
//!
//! This module provides the high-level entry points of XPSKit.
//!
//! ## Overview
//!
//! Workflows tie the engine and the core models together into complete procedures. A
//! presentation layer normally talks only to [`session::AnalysisSession`], which owns
//! the dataset, the gateway and the settings store and exposes one method per user
//! action. The [`analyze`] workflow is the peak-fitting orchestrator on its own, for
//! callers that manage their own dataset and settings.
//!
//! ## Architecture
//!
//! - **Analysis Workflow** ([`analyze`]) - Quantification of every spectrum followed by
//!   background removal and peak fitting of the eligible ones, with per-spectrum
//!   failure containment.
//! - **Session** ([`session`]) - Subsystem start-up, loading, shift correction,
//!   quantification and analysis against the persisted settings.

pub mod analyze;
pub mod session;
