use super::subsystem::{NumericSubsystem, Procedure};
use super::{Gateway, InitMode};
use crate::engine::error::{EngineError, SubsystemError};
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct History {
    starts: usize,
    libraries: Vec<Option<PathBuf>>,
    registered: Vec<Vec<PathBuf>>,
    calls: Vec<(Procedure, Vec<Value>)>,
}

/// Shared view of everything a [`ScriptedSubsystem`] has been asked to do.
#[derive(Debug, Clone, Default)]
pub struct CallHistory {
    inner: Arc<Mutex<History>>,
}

impl CallHistory {
    fn lock(&self) -> MutexGuard<'_, History> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn starts(&self) -> usize {
        self.lock().starts
    }

    /// The library override passed to each `start` call, in order.
    pub fn libraries(&self) -> Vec<Option<PathBuf>> {
        self.lock().libraries.clone()
    }

    pub fn registrations(&self) -> Vec<Vec<PathBuf>> {
        self.lock().registered.clone()
    }

    pub fn procedures(&self) -> Vec<Procedure> {
        self.lock().calls.iter().map(|(p, _)| *p).collect()
    }

    pub fn calls_to(&self, procedure: Procedure) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|(p, _)| *p == procedure)
            .count()
    }

    pub fn last_args(&self, procedure: Procedure) -> Option<Vec<Value>> {
        self.lock()
            .calls
            .iter()
            .rev()
            .find(|(p, _)| *p == procedure)
            .map(|(_, args)| args.clone())
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Value(Value),
    Raise(String),
    Disconnect(String),
}

/// An in-process [`NumericSubsystem`] that answers from a script.
///
/// Replies are queued per procedure and consumed in order; the last queued reply for
/// a procedure is repeated once the queue is down to it. Calls to a procedure with no
/// script fail as if the subsystem raised. A scripted disconnect stops the subsystem
/// until it is started again. Useful for exercising the engine without a
/// Python installation.
#[derive(Debug, Default)]
pub struct ScriptedSubsystem {
    replies: HashMap<Procedure, VecDeque<Reply>>,
    start_failure: Option<String>,
    started: bool,
    history: CallHistory,
}

impl ScriptedSubsystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(mut self, procedure: Procedure, reply: Reply) -> Self {
        self.replies.entry(procedure).or_default().push_back(reply);
        self
    }

    pub fn respond(self, procedure: Procedure, value: Value) -> Self {
        self.push(procedure, Reply::Value(value))
    }

    pub fn fail(self, procedure: Procedure, message: impl Into<String>) -> Self {
        self.push(procedure, Reply::Raise(message.into()))
    }

    /// Queues a reply that behaves like the interpreter going away mid-call.
    pub fn disconnect(self, procedure: Procedure, message: impl Into<String>) -> Self {
        self.push(procedure, Reply::Disconnect(message.into()))
    }

    pub fn fail_start(mut self, message: impl Into<String>) -> Self {
        self.start_failure = Some(message.into());
        self
    }

    pub fn history(&self) -> CallHistory {
        self.history.clone()
    }

    /// Wraps the script in an initialized [`Gateway`] with no search paths.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::SubsystemInit`] when the script was told to fail start-up.
    pub fn into_ready_gateway(self) -> Result<(Gateway, CallHistory), EngineError> {
        let history = self.history();
        let gateway = Gateway::with_search_paths(Box::new(self), Vec::new());
        gateway.initialize(None, InitMode::Interactive)?;
        Ok((gateway, history))
    }
}

impl NumericSubsystem for ScriptedSubsystem {
    fn start(&mut self, library: Option<&Path>) -> Result<(), SubsystemError> {
        {
            let mut history = self.history.lock();
            history.starts += 1;
            history.libraries.push(library.map(Path::to_path_buf));
        }
        if let Some(message) = &self.start_failure {
            return Err(SubsystemError::Startup(message.clone()));
        }
        self.started = true;
        Ok(())
    }

    fn register_search_paths(&mut self, paths: &[PathBuf]) -> Result<(), SubsystemError> {
        if !self.started {
            return Err(SubsystemError::NotInitialized);
        }
        self.history.lock().registered.push(paths.to_vec());
        Ok(())
    }

    fn invoke(&mut self, procedure: Procedure, args: Vec<Value>) -> Result<Value, SubsystemError> {
        if !self.started {
            return Err(SubsystemError::NotInitialized);
        }
        self.history.lock().calls.push((procedure, args));

        let raised = |message: String| SubsystemError::Raised {
            module: procedure.module(),
            function: procedure.function(),
            message,
        };
        let queue = self
            .replies
            .get_mut(&procedure)
            .filter(|queue| !queue.is_empty())
            .ok_or_else(|| raised(format!("no scripted reply for {procedure}")))?;
        let reply = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        match reply {
            Some(Reply::Value(value)) => Ok(value),
            Some(Reply::Raise(message)) => Err(raised(message)),
            Some(Reply::Disconnect(message)) => {
                self.started = false;
                Err(SubsystemError::Transport(message))
            }
            None => Err(raised(format!("no scripted reply for {procedure}"))),
        }
    }
}
