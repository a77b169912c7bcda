use std::io;

use libc::{pid_t, SIGKILL};
use tracing::debug;

use crate::error::ShellError;
use crate::process::ProcessError;

/// Sends SIGKILL to `pid`.
pub fn kill(pid: pid_t) -> Result<(), ProcessError> {
    debug!(pid, "sending SIGKILL");
    let rc = unsafe { libc::kill(pid, SIGKILL) };
    if rc == -1 {
        return Err(ProcessError::Signal {
            pid,
            source: io::Error::last_os_error(),
        });
    }
    Ok(())
}

pub fn signal_name(signal: i32) -> String {
    signal_hook::low_level::signal_name(signal)
        .map(str::to_string)
        .unwrap_or_else(|| format!("signal {}", signal))
}

/// Keeps the shell alive on SIGINT; children still receive the default action.
pub fn setup_interrupt_handler(quiet: bool) -> Result<(), ShellError> {
    ctrlc::set_handler(move || {
        if !quiet {
            println!("\nUse 'exit' to exit the shell");
        }
    })?;
    Ok(())
}
