//! Provides tabular export of analysis outputs.
//!
//! Writers take any [`std::io::Write`] sink and emit CSV with a header row: the
//! flattened result table, the (possibly shift-corrected) dataset in long form, and an
//! atomic-percent summary. Reading raw instrument files is not done here; that is the
//! numerical subsystem's job.

pub mod report;

pub use report::ReportError;
