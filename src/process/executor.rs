use std::io::{self, Write};
use std::os::unix::process::ExitStatusExt;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;

use tracing::{debug, warn};

use super::{signal, ProcessError};
use crate::core::status::Status;

/// Starts `program` with the given stdio bindings without waiting for it.
pub fn spawn(
    program: &str,
    args: &[String],
    stdin: Stdio,
    stdout: Stdio,
    stderr: Stdio,
) -> Result<Running, ProcessError> {
    let child = Command::new(program)
        .args(args)
        .stdin(stdin)
        .stdout(stdout)
        .stderr(stderr)
        .spawn()
        .map_err(|e| ProcessError::spawn(program, e))?;

    debug!(program, pid = child.id(), "spawned");
    Ok(Running::new(child, program))
}

/// Starts `program` detached from the session: null stdio, never waited by
/// the caller. A reaper thread collects the exit status.
pub fn spawn_detached(program: &str, args: &[String]) -> Result<u32, ProcessError> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| ProcessError::spawn(program, e))?;

    let pid = child.id();
    debug!(program, pid, "forked");

    let name = program.to_string();
    let reaper = thread::Builder::new()
        .name(format!("reap-{}", pid))
        .spawn(move || match child.wait() {
            Ok(status) => debug!(program = %name, pid, code = exit_code(status), "detached child exited"),
            Err(e) => warn!(program = %name, pid, error = %e, "failed to reap detached child"),
        });
    if let Err(e) = reaper {
        warn!(pid, error = %e, "could not start reaper thread");
    }

    Ok(pid)
}

/// Exit code of a finished child; signal deaths map to 128 + signal number.
pub fn exit_code(status: ExitStatus) -> i32 {
    match (status.code(), status.signal()) {
        (Some(code), _) => code,
        (None, Some(sig)) => 128 + sig,
        (None, None) => 1,
    }
}

/// A started external stage.
#[derive(Debug)]
pub struct Running {
    child: Child,
    program: String,
    terminate: bool,
}

impl Running {
    pub fn new(child: Child, program: &str) -> Self {
        Self {
            child,
            program: program.to_string(),
            terminate: false,
        }
    }

    /// Marks this stage as replacing the shell: its Status asks the loop to end.
    pub fn terminating(mut self, terminate: bool) -> Self {
        self.terminate = terminate;
        self
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Copies the child's captured stdout, if any, into `sink` until EOF.
    pub fn drain_into(&mut self, sink: &mut dyn Write) -> io::Result<u64> {
        match self.child.stdout.take() {
            Some(mut out) => {
                let copied = io::copy(&mut out, sink)?;
                sink.flush()?;
                Ok(copied)
            }
            None => Ok(0),
        }
    }

    /// Blocks until the child exits. Captured stdout left undrained is copied
    /// into `sink` first; failing to write there is fatal.
    pub fn wait(mut self, sink: &mut dyn Write) -> Status {
        if let Err(e) = self.drain_into(sink) {
            let _ = self.child.wait();
            return Status::fatal(e);
        }

        match self.child.wait() {
            Ok(status) => {
                if let Some(sig) = status.signal() {
                    debug!(program = %self.program, signal = %signal::signal_name(sig), "terminated by signal");
                }
                let code = exit_code(status);
                debug!(program = %self.program, code, "exited");
                if self.terminate {
                    Status::terminate(code)
                } else {
                    Status::with_code(code)
                }
            }
            Err(source) => Status::failure(ProcessError::Wait {
                program: self.program,
                source,
            }),
        }
    }
}
