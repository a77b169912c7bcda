use std::io::Write;

use tracing::debug;

pub mod executor;
pub mod pipeline;
pub mod streams;

use crate::core::state::SessionState;
use crate::core::status::Status;
use crate::input::LineSource;

use executor::settle;
use pipeline::Pipeline;
use streams::Streams;

const SYNTAX_ERROR_CODE: i32 = 2;

/// The read-eval loop around one session.
pub struct Shell {
    session: SessionState,
}

impl Shell {
    pub fn new(session: SessionState) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Prompts, reads and runs lines until a terminal Status comes up.
    pub fn run(&mut self, lines: &mut dyn LineSource, streams: &mut Streams<'_>) -> Status {
        loop {
            let prompt = self.session.prompt();
            let line = match lines.read_line(&prompt, streams.stdout) {
                Ok(Some(line)) => line,
                Ok(None) => {
                    debug!("end of input");
                    return match writeln!(streams.stdout).and_then(|_| streams.stdout.flush()) {
                        Ok(()) => Status::terminate(0),
                        Err(e) => Status::fatal(e),
                    };
                }
                Err(e) => return Status::fatal(e),
            };

            let status = self.execute_line(&line, streams);
            if status.exit() {
                return status;
            }
        }
    }

    /// Runs one line as if it had been typed at the prompt.
    pub fn execute_line(&mut self, line: &str, streams: &mut Streams<'_>) -> Status {
        let line = line.trim();
        if line.is_empty() {
            return Status::success();
        }

        match Pipeline::parse(line) {
            Ok(pipeline) => executor::run(pipeline, &mut self.session, streams),
            Err(e) => {
                let status = settle(Status::failure(e), &mut self.session, streams);
                self.session.set_last_exit_code(SYNTAX_ERROR_CODE);
                status
            }
        }
    }
}
