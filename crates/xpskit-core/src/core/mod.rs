//! # Core Module
//!
//! This module provides the stateless building blocks of XPSKit: the data model of an
//! analysis session, the per-user settings documents and tabular export.
//!
//! ## Overview
//!
//! Nothing in this layer holds process state or talks to the numerical subsystem.
//! Models are plain values, validated on construction where an invariant exists (axis
//! lengths of a spectrum, physical peak parameters). Settings are read optimistically
//! and written to a single canonical folder.
//!
//! ## Architecture
//!
//! - **Data Model** ([`models`]) - Spectra and datasets, shift settings, reference
//!   sensitivity factors, peak models and result rows
//! - **Configuration** ([`settings`]) - Multi-directory settings resolution and typed
//!   read/write of each settings document
//! - **Export** ([`io`]) - CSV writers for result tables, datasets and atomic-percent
//!   summaries

pub mod io;
pub mod models;
pub mod settings;
