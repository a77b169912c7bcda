use std::fmt;
use std::io;

pub mod executor;
pub mod signal;

pub use executor::{spawn, spawn_detached, Running};

#[derive(Debug)]
pub enum ProcessError {
    CommandNotFound(String),
    PermissionDenied(String),
    Spawn { program: String, source: io::Error },
    Wait { program: String, source: io::Error },
    Signal { pid: i32, source: io::Error },
}

impl ProcessError {
    /// Classifies a failed `spawn` of `program`.
    pub fn spawn(program: &str, source: io::Error) -> Self {
        match source.kind() {
            io::ErrorKind::NotFound => ProcessError::CommandNotFound(program.to_string()),
            io::ErrorKind::PermissionDenied => ProcessError::PermissionDenied(program.to_string()),
            _ => ProcessError::Spawn {
                program: program.to_string(),
                source,
            },
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            ProcessError::CommandNotFound(_) => 127,
            ProcessError::PermissionDenied(_) => 126,
            _ => 1,
        }
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::CommandNotFound(cmd) => write!(f, "command not found: {}", cmd),
            ProcessError::PermissionDenied(cmd) => write!(f, "permission denied: {}", cmd),
            ProcessError::Spawn { program, source } => {
                write!(f, "failed to start {}: {}", program, source)
            }
            ProcessError::Wait { program, source } => {
                write!(f, "failed to wait for {}: {}", program, source)
            }
            ProcessError::Signal { pid, source } => write!(f, "kill: ({}): {}", pid, source),
        }
    }
}

impl std::error::Error for ProcessError {}
