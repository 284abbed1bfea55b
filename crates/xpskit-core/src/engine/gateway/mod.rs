//! # Numerical Subsystem Gateway
//!
//! The single door through which the engine reaches the external numerical routines
//! (file loading, shift correction, quantification, background removal and peak
//! fitting).
//!
//! ## Overview
//!
//! The subsystem has no concurrency safety of its own, so the [`Gateway`] owns exactly
//! one [`NumericSubsystem`] behind a mutex and holds the lock for the whole of every
//! call: start-up, search-path registration, invocation and reply decoding. Start-up
//! is idempotent. Before each invocation the module search locations are registered
//! again, which is cheap and keeps the subsystem usable even if something reset its
//! import path.
//!
//! ## Components
//!
//! - [`subsystem`] - The [`NumericSubsystem`] trait and the [`Procedure`] catalogue
//! - [`protocol`] - Typed per-routine requests with reply validation
//! - [`python`] - The shipped implementation: a persistent Python interpreter driven
//!   over newline-delimited JSON
//! - [`scripted`] - An in-process implementation answering from a script

pub mod protocol;
pub mod python;
pub mod scripted;
pub mod subsystem;

pub use protocol::Call;
pub use python::PythonBridge;
pub use scripted::{CallHistory, ScriptedSubsystem};
pub use subsystem::{NumericSubsystem, Procedure};

use crate::core::settings::resolver::program_directory;
use crate::engine::error::{EngineError, SubsystemError};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use tracing::{debug, info, warn};

/// Subdirectory of the program directory reserved for the analysis modules.
pub const MODULE_SUBDIR: &str = "python";

/// How a failed start-up is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitMode {
    /// Report failure as `Ok(false)`; used at application start.
    Silent,
    /// Report failure as [`EngineError::SubsystemInit`] so the user can be told.
    Interactive,
}

struct GatewayState {
    subsystem: Box<dyn NumericSubsystem + Send>,
    initialized: bool,
    search_paths: Vec<PathBuf>,
}

pub struct Gateway {
    state: Mutex<GatewayState>,
}

impl Gateway {
    /// Wraps `subsystem`, registering the program directory and its module
    /// subdirectory before every call.
    pub fn new(subsystem: Box<dyn NumericSubsystem + Send>) -> Self {
        Self::with_search_paths(subsystem, default_search_paths())
    }

    pub fn with_search_paths(
        subsystem: Box<dyn NumericSubsystem + Send>,
        search_paths: Vec<PathBuf>,
    ) -> Self {
        Self {
            state: Mutex::new(GatewayState {
                subsystem,
                initialized: false,
                search_paths,
            }),
        }
    }

    /// A gateway backed by a [`PythonBridge`].
    pub fn python() -> Self {
        Self::new(Box::new(PythonBridge::new()))
    }

    fn lock(&self) -> Result<MutexGuard<'_, GatewayState>, SubsystemError> {
        self.state.lock().map_err(|_| SubsystemError::Poisoned)
    }

    pub fn is_initialized(&self) -> bool {
        self.lock().map(|state| state.initialized).unwrap_or(false)
    }

    /// Brings the subsystem up once.
    ///
    /// Returns `Ok(true)` immediately if the subsystem is already running, without
    /// touching it again.
    ///
    /// # Arguments
    ///
    /// * `library` - Optional override of the subsystem runtime location.
    /// * `mode` - Whether a failure is reported as `Ok(false)` or as an error.
    ///
    /// # Errors
    ///
    /// In [`InitMode::Interactive`], returns [`EngineError::SubsystemInit`] if start-up
    /// fails.
    pub fn initialize(&self, library: Option<&Path>, mode: InitMode) -> Result<bool, EngineError> {
        let outcome = self.lock().and_then(|mut state| {
            if state.initialized {
                debug!("Numerical subsystem already initialized.");
                return Ok(());
            }
            state.subsystem.start(library)?;
            state.initialized = true;
            info!("Numerical subsystem initialized.");
            Ok(())
        });

        match (outcome, mode) {
            (Ok(()), _) => Ok(true),
            (Err(e), InitMode::Silent) => {
                warn!("Numerical subsystem unavailable: {}", e);
                Ok(false)
            }
            (Err(source), InitMode::Interactive) => Err(EngineError::SubsystemInit { source }),
        }
    }

    /// Executes one typed call under the gateway lock.
    ///
    /// # Errors
    ///
    /// Returns [`SubsystemError::NotInitialized`] before a successful
    /// [`Gateway::initialize`], or whatever the subsystem or reply decoding reports.
    /// A transport or I/O failure also marks the gateway uninitialized, so a later
    /// [`Gateway::initialize`] starts the subsystem afresh.
    pub fn call<C: Call>(&self, call: &C) -> Result<C::Output, SubsystemError> {
        let mut state = self.lock()?;
        if !state.initialized {
            return Err(SubsystemError::NotInitialized);
        }

        let GatewayState {
            subsystem,
            search_paths,
            ..
        } = &mut *state;
        let reply = subsystem
            .register_search_paths(search_paths)
            .and_then(|()| subsystem.invoke(C::PROCEDURE, call.args()));
        match reply {
            Ok(reply) => call.decode(reply),
            Err(e) => {
                if e.is_disconnect() {
                    warn!(
                        "Lost the numerical subsystem during {}: {}. It will be restarted on the next initialization.",
                        C::PROCEDURE,
                        e
                    );
                    state.initialized = false;
                }
                Err(e)
            }
        }
    }
}

/// The program directory and its module subdirectory, when the program directory is
/// known.
pub fn default_search_paths() -> Vec<PathBuf> {
    program_directory()
        .map(|dir| vec![dir.clone(), dir.join(MODULE_SUBDIR)])
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::protocol::ShirleyBaseline;
    use super::*;
    use serde_json::json;

    fn gateway_with(subsystem: ScriptedSubsystem) -> (Gateway, CallHistory) {
        let history = subsystem.history();
        let gateway = Gateway::with_search_paths(
            Box::new(subsystem),
            vec![PathBuf::from("/app"), PathBuf::from("/app/python")],
        );
        (gateway, history)
    }

    #[test]
    fn initialize_twice_starts_once() {
        let (gateway, history) = gateway_with(ScriptedSubsystem::new());

        assert!(gateway.initialize(None, InitMode::Silent).unwrap());
        assert!(
            gateway
                .initialize(Some(Path::new("/other/python")), InitMode::Interactive)
                .unwrap()
        );
        assert_eq!(history.starts(), 1);
        assert!(gateway.is_initialized());
    }

    #[test]
    fn silent_failure_is_false_and_interactive_failure_is_an_error() {
        let (gateway, history) = gateway_with(ScriptedSubsystem::new().fail_start("no python"));

        assert!(!gateway.initialize(None, InitMode::Silent).unwrap());
        let err = gateway
            .initialize(None, InitMode::Interactive)
            .unwrap_err();
        assert!(matches!(err, EngineError::SubsystemInit { .. }));
        assert!(err.to_string().contains("interpreter path"));
        assert_eq!(history.starts(), 2);
        assert!(!gateway.is_initialized());
    }

    #[test]
    fn library_override_reaches_the_subsystem() {
        let (gateway, history) = gateway_with(ScriptedSubsystem::new());
        gateway
            .initialize(Some(Path::new("/opt/py/bin/python3")), InitMode::Silent)
            .unwrap();
        assert_eq!(
            history.libraries(),
            vec![Some(PathBuf::from("/opt/py/bin/python3"))]
        );
    }

    #[test]
    fn calls_require_initialization_and_reregister_paths_each_time() {
        let (gateway, history) = gateway_with(
            ScriptedSubsystem::new().respond(Procedure::ShirleyBaseline, json!([[0.0, 0.0]])),
        );
        let x = [1.0, 2.0];
        let call = ShirleyBaseline { x: &x, y: &x };

        assert!(matches!(
            gateway.call(&call),
            Err(SubsystemError::NotInitialized)
        ));

        gateway.initialize(None, InitMode::Silent).unwrap();
        assert_eq!(gateway.call(&call).unwrap(), vec![0.0, 0.0]);
        assert_eq!(gateway.call(&call).unwrap(), vec![0.0, 0.0]);

        let registrations = history.registrations();
        assert_eq!(registrations.len(), 2);
        assert_eq!(
            registrations[0],
            vec![PathBuf::from("/app"), PathBuf::from("/app/python")]
        );
        assert_eq!(history.last_args(Procedure::ShirleyBaseline).unwrap().len(), 2);
    }

    #[test]
    fn lost_subsystem_is_restarted_by_the_next_initialize() {
        let (gateway, history) = gateway_with(
            ScriptedSubsystem::new()
                .disconnect(Procedure::ShirleyBaseline, "the interpreter closed its output")
                .respond(Procedure::ShirleyBaseline, json!([[0.5, 0.5]])),
        );
        let x = [1.0, 2.0];
        let call = ShirleyBaseline { x: &x, y: &x };
        gateway.initialize(None, InitMode::Silent).unwrap();

        assert!(matches!(
            gateway.call(&call),
            Err(SubsystemError::Transport(_))
        ));
        assert!(!gateway.is_initialized());
        assert!(matches!(
            gateway.call(&call),
            Err(SubsystemError::NotInitialized)
        ));

        assert!(gateway.initialize(None, InitMode::Interactive).unwrap());
        assert_eq!(history.starts(), 2);
        assert_eq!(gateway.call(&call).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn raised_errors_keep_the_subsystem_running() {
        let (gateway, history) = gateway_with(
            ScriptedSubsystem::new().fail(Procedure::ShirleyBaseline, "ValueError: empty"),
        );
        let x = [1.0, 2.0];
        gateway.initialize(None, InitMode::Silent).unwrap();

        assert!(matches!(
            gateway.call(&ShirleyBaseline { x: &x, y: &x }),
            Err(SubsystemError::Raised { .. })
        ));
        assert!(gateway.is_initialized());
        assert_eq!(history.starts(), 1);
    }
}
