use super::subsystem::{NumericSubsystem, Procedure};
use crate::engine::error::SubsystemError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};
use std::thread;
use tracing::{debug, info, warn};

const BRIDGE_SCRIPT: &str = include_str!("bridge.py");

#[cfg(windows)]
const DEFAULT_INTERPRETER: &str = "python";
#[cfg(not(windows))]
const DEFAULT_INTERPRETER: &str = "python3";

#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum BridgeRequest<'a> {
    Register {
        paths: &'a [PathBuf],
    },
    Call {
        module: &'a str,
        function: &'a str,
        args: Vec<Value>,
    },
    Exit,
}

#[derive(Debug, Deserialize)]
struct BridgeReply {
    ok: bool,
    #[serde(default)]
    value: Value,
    #[serde(default)]
    error: Option<String>,
}

fn encode_request(request: &BridgeRequest<'_>) -> Result<String, SubsystemError> {
    let mut line = serde_json::to_string(request)
        .map_err(|e| SubsystemError::Transport(format!("could not encode request: {e}")))?;
    line.push('\n');
    Ok(line)
}

fn decode_reply(line: &str, procedure: Option<Procedure>) -> Result<Value, SubsystemError> {
    let reply: BridgeReply = serde_json::from_str(line.trim()).map_err(|e| {
        SubsystemError::Transport(format!("unreadable reply {:?}: {e}", line.trim()))
    })?;
    if reply.ok {
        return Ok(reply.value);
    }
    let message = reply
        .error
        .unwrap_or_else(|| "unknown subsystem error".to_string());
    Err(match procedure {
        Some(procedure) => SubsystemError::Raised {
            module: procedure.module(),
            function: procedure.function(),
            message,
        },
        None => SubsystemError::Transport(message),
    })
}

struct BridgeProcess {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

impl BridgeProcess {
    fn exchange(
        &mut self,
        request: &BridgeRequest<'_>,
        procedure: Option<Procedure>,
    ) -> Result<Value, SubsystemError> {
        self.stdin.write_all(encode_request(request)?.as_bytes())?;
        self.stdin.flush()?;
        let line = self.read_line()?;
        decode_reply(&line, procedure)
    }

    fn read_line(&mut self) -> Result<String, SubsystemError> {
        let mut line = String::new();
        if self.stdout.read_line(&mut line)? == 0 {
            let status = self
                .child
                .try_wait()
                .ok()
                .flatten()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "still running".to_string());
            return Err(SubsystemError::Transport(format!(
                "the interpreter closed its output ({status})"
            )));
        }
        Ok(line)
    }

    fn shutdown(mut self) {
        if let Ok(line) = encode_request(&BridgeRequest::Exit) {
            let _ = self.stdin.write_all(line.as_bytes());
            let _ = self.stdin.flush();
        }
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// A persistent Python interpreter hosting the analysis modules.
///
/// The interpreter runs a small embedded bridge script that reads one JSON request per
/// line on stdin and answers with one JSON reply per line on stdout. Anything the
/// analysis modules print goes to the interpreter's stderr, which is forwarded to
/// `debug!` events.
#[derive(Default)]
pub struct PythonBridge {
    process: Option<BridgeProcess>,
}

impl PythonBridge {
    pub fn new() -> Self {
        Self::default()
    }

    fn interpreter(library: Option<&Path>) -> Result<PathBuf, SubsystemError> {
        match library {
            Some(path) if path.is_file() => Ok(path.to_path_buf()),
            Some(path) => Err(SubsystemError::Startup(format!(
                "interpreter {:?} does not exist",
                path
            ))),
            None => Ok(PathBuf::from(DEFAULT_INTERPRETER)),
        }
    }

    /// Sends one request; a process that can no longer be talked to is shut down so
    /// the next `start` launches a fresh one.
    fn exchange(
        &mut self,
        request: &BridgeRequest<'_>,
        procedure: Option<Procedure>,
    ) -> Result<Value, SubsystemError> {
        let process = self
            .process
            .as_mut()
            .ok_or(SubsystemError::NotInitialized)?;
        let result = process.exchange(request, procedure);
        if matches!(&result, Err(e) if e.is_disconnect()) {
            if let Some(process) = self.process.take() {
                warn!("Numerical subsystem stopped responding; shutting it down.");
                process.shutdown();
            }
        }
        result
    }
}

impl NumericSubsystem for PythonBridge {
    fn start(&mut self, library: Option<&Path>) -> Result<(), SubsystemError> {
        if self.process.is_some() {
            return Ok(());
        }

        let interpreter = Self::interpreter(library)?;
        info!("Starting numerical subsystem with interpreter {:?}", interpreter);

        let mut child = Command::new(&interpreter)
            .arg("-u")
            .arg("-c")
            .arg(BRIDGE_SCRIPT)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                SubsystemError::Startup(format!("could not launch {:?}: {e}", interpreter))
            })?;

        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            let _ = child.kill();
            return Err(SubsystemError::Startup(
                "interpreter pipes were not available".to_string(),
            ));
        };

        if let Some(stderr) = child.stderr.take() {
            let drain = thread::Builder::new()
                .name("subsystem-stderr".to_string())
                .spawn(move || {
                    for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                        debug!(target: "xpskit::subsystem", "{}", line);
                    }
                });
            if let Err(e) = drain {
                warn!("Could not forward subsystem diagnostics: {}", e);
            }
        }

        let mut process = BridgeProcess {
            child,
            stdin,
            stdout: BufReader::new(stdout),
        };

        let ready = match process
            .read_line()
            .and_then(|line| decode_reply(&line, None))
        {
            Ok(ready) => ready,
            Err(e) => {
                let _ = process.child.kill();
                let _ = process.child.wait();
                return Err(SubsystemError::Startup(format!(
                    "bridge did not become ready: {e}"
                )));
            }
        };
        let python = ready
            .get("python")
            .and_then(Value::as_str)
            .unwrap_or("unknown");
        info!(python, "Numerical subsystem ready.");

        self.process = Some(process);
        Ok(())
    }

    fn register_search_paths(&mut self, paths: &[PathBuf]) -> Result<(), SubsystemError> {
        self.exchange(&BridgeRequest::Register { paths }, None)
            .map(|_| ())
    }

    fn invoke(&mut self, procedure: Procedure, args: Vec<Value>) -> Result<Value, SubsystemError> {
        debug!("Calling {}", procedure);
        let request = BridgeRequest::Call {
            module: procedure.module(),
            function: procedure.function(),
            args,
        };
        self.exchange(&request, Some(procedure))
    }
}

impl Drop for PythonBridge {
    fn drop(&mut self) {
        if let Some(process) = self.process.take() {
            process.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    fn python_available() -> bool {
        Command::new(DEFAULT_INTERPRETER)
            .arg("--version")
            .output()
            .is_ok_and(|out| out.status.success())
    }

    fn module_dir(files: &[(&str, &str)]) -> TempDir {
        let dir = tempdir().unwrap();
        for (name, source) in files {
            fs::write(dir.path().join(name), source).unwrap();
        }
        dir
    }

    #[test]
    fn requests_are_tagged_by_op() {
        let paths = vec![PathBuf::from("/opt/xps"), PathBuf::from("/opt/xps/python")];
        let register = encode_request(&BridgeRequest::Register { paths: &paths }).unwrap();
        assert_eq!(
            register,
            "{\"op\":\"register\",\"paths\":[\"/opt/xps\",\"/opt/xps/python\"]}\n"
        );

        let call = encode_request(&BridgeRequest::Call {
            module: "XPSCAL",
            function: "shift",
            args: vec![json!(1.5)],
        })
        .unwrap();
        let parsed: Value = serde_json::from_str(call.trim()).unwrap();
        assert_eq!(parsed["op"], "call");
        assert_eq!(parsed["module"], "XPSCAL");
        assert_eq!(parsed["args"], json!([1.5]));

        assert_eq!(encode_request(&BridgeRequest::Exit).unwrap(), "{\"op\":\"exit\"}\n");
    }

    #[test]
    fn error_reply_carries_the_raising_procedure() {
        let err = decode_reply(
            r#"{"ok": false, "error": "ValueError: bad file"}"#,
            Some(Procedure::LoadAllSpe),
        )
        .unwrap_err();
        match err {
            SubsystemError::Raised {
                module,
                function,
                message,
            } => {
                assert_eq!(module, "XPSASC");
                assert_eq!(function, "load_allspe");
                assert_eq!(message, "ValueError: bad file");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn ok_reply_yields_value_and_garbage_is_transport_error() {
        assert_eq!(
            decode_reply("{\"ok\":true,\"value\":[1,2]}\n", None).unwrap(),
            json!([1, 2])
        );
        assert!(matches!(
            decode_reply("Traceback (most recent call last):", None),
            Err(SubsystemError::Transport(_))
        ));
    }

    #[test]
    fn missing_interpreter_path_fails_startup() {
        let dir = tempdir().unwrap();
        let mut bridge = PythonBridge::new();
        let err = bridge
            .start(Some(dir.path().join("no-such-python").as_path()))
            .unwrap_err();
        assert!(matches!(err, SubsystemError::Startup(_)));
    }

    #[test]
    fn calls_before_start_are_rejected() {
        let mut bridge = PythonBridge::new();
        assert!(matches!(
            bridge.invoke(Procedure::Shift, vec![]),
            Err(SubsystemError::NotInitialized)
        ));
    }

    #[test]
    fn real_interpreter_keeps_module_output_off_the_reply_channel() {
        if !python_available() {
            return;
        }
        let dir = module_dir(&[(
            "XPSCAL.py",
            "def atomic_percent(*args):\n    print('quantifying', len(args), 'regions')\n    return [float('nan'), float('inf'), 40.0]\n",
        )]);
        let mut bridge = PythonBridge::new();
        bridge.start(None).unwrap();
        bridge
            .register_search_paths(&[dir.path().to_path_buf()])
            .unwrap();

        let reply = bridge
            .invoke(Procedure::AtomicPercent, vec![json!([1.0, 2.0])])
            .unwrap();
        assert_eq!(reply, json!([null, null, 40.0]));

        let err = bridge.invoke(Procedure::Shift, vec![]).unwrap_err();
        assert!(matches!(err, SubsystemError::Raised { .. }), "{err:?}");
    }

    #[test]
    fn real_interpreter_that_dies_is_restarted_by_start() {
        if !python_available() {
            return;
        }
        let dir = module_dir(&[
            ("XPSASC.py", "import os\n\ndef load_allspe(path):\n    os._exit(3)\n"),
            ("XPSCAL.py", "def atomic_percent(*args):\n    return [100.0]\n"),
        ]);
        let paths = [dir.path().to_path_buf()];
        let mut bridge = PythonBridge::new();
        bridge.start(None).unwrap();
        bridge.register_search_paths(&paths).unwrap();

        let err = bridge
            .invoke(Procedure::LoadAllSpe, vec![json!("run.spe")])
            .unwrap_err();
        assert!(err.is_disconnect(), "{err:?}");
        assert!(matches!(
            bridge.invoke(Procedure::AtomicPercent, vec![]),
            Err(SubsystemError::NotInitialized)
        ));

        bridge.start(None).unwrap();
        bridge.register_search_paths(&paths).unwrap();
        assert_eq!(
            bridge.invoke(Procedure::AtomicPercent, vec![]).unwrap(),
            json!([100.0])
        );
    }
}
