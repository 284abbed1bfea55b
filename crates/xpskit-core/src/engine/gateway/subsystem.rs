use crate::engine::error::SubsystemError;
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};

/// Every routine the engine calls across the numerical-subsystem boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Procedure {
    LoadAllSpe,
    Shift,
    AtomicPercent,
    ShirleyBaseline,
    PerformFitting,
}

impl Procedure {
    /// The subsystem module hosting this routine.
    pub fn module(self) -> &'static str {
        match self {
            Procedure::LoadAllSpe => "XPSASC",
            Procedure::Shift | Procedure::AtomicPercent | Procedure::ShirleyBaseline => "XPSCAL",
            Procedure::PerformFitting => "XPSFIT",
        }
    }

    pub fn function(self) -> &'static str {
        match self {
            Procedure::LoadAllSpe => "load_allspe",
            Procedure::Shift => "shift",
            Procedure::AtomicPercent => "atomic_percent",
            Procedure::ShirleyBaseline => "shirley_baseline",
            Procedure::PerformFitting => "perform_fitting",
        }
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module(), self.function())
    }
}

/// A connection to the external numerical subsystem.
///
/// Implementations need not be thread-safe beyond `Send`; the [`super::Gateway`] owns
/// exactly one and serializes every call through its lock.
pub trait NumericSubsystem {
    /// Brings the subsystem up. `library` overrides the default runtime location.
    fn start(&mut self, library: Option<&Path>) -> Result<(), SubsystemError>;

    /// Makes the given directories importable. Must be cheap and idempotent.
    fn register_search_paths(&mut self, paths: &[PathBuf]) -> Result<(), SubsystemError>;

    /// Calls one routine with positional JSON arguments and returns its JSON result.
    fn invoke(&mut self, procedure: Procedure, args: Vec<Value>) -> Result<Value, SubsystemError>;
}
