//! # Engine Module
//!
//! This module holds the stateful half of XPSKit: the current dataset, the connection
//! to the numerical subsystem and the tasks that drive it.
//!
//! ## Overview
//!
//! Every numeric operation (loading a raw file, charge-shift correction,
//! quantification, background removal and peak fitting) is performed by the external
//! numerical subsystem. The engine's job is to sequence those calls, validate what
//! comes back before it touches the data model, and keep the dataset consistent: it is
//! only ever replaced as a whole.
//!
//! ## Architecture
//!
//! - **Gateway** ([`gateway`]) - Serialized, typed access to the numerical subsystem
//! - **Dataset Store** ([`store`]) - Wholesale-replace ownership of the current dataset
//! - **Tasks** ([`tasks`]) - Load, shift, quantify and per-spectrum fit operations
//! - **Configuration** ([`config`]) - Analysis options such as the fitting exclusion list
//! - **Progress Monitoring** ([`progress`]) - Callback-based progress events
//! - **Error Handling** ([`error`]) - Subsystem, fitting and engine error types

pub mod config;
pub mod context;
pub mod error;
pub mod gateway;
pub mod progress;
pub mod store;
pub mod tasks;
