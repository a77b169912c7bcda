use tracing::debug;

use super::{Command, CommandError, Context, Launch};
use crate::core::status::Status;
use crate::process;
use crate::shell::pipeline::Stage;

/// `fork prog args...` starts `prog` in the background and returns at once.
#[derive(Clone, Default)]
pub struct ForkCommand;

impl Command for ForkCommand {
    fn execute(&self, stage: &Stage, _ctx: &mut Context<'_, '_>) -> Result<Launch, CommandError> {
        let Some((program, args)) = stage.args.split_first() else {
            return Ok(Launch::Done(Status::success()));
        };

        let pid = process::spawn_detached(program, args)?;
        debug!(program = %program, pid, "started detached");
        Ok(Launch::Done(Status::success()))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::commands::harness;
    use crate::core::state::SessionState;
    use crate::test_support::CwdGuard;
    use std::time::{Duration, Instant};

    fn session() -> SessionState {
        SessionState::with_identity("t", "h", "/").expect("session")
    }

    #[test]
    fn test_fork_without_args() {
        let _guard = CwdGuard::new();
        let mut session = session();
        assert!(harness::run(&mut session, "fork", false).status.is_success());
    }

    #[test]
    fn test_fork_does_not_wait() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let started = Instant::now();
        let outcome = harness::run(&mut session, "fork sleep 5", false);
        assert!(outcome.status.is_success());
        assert!(!outcome.status.exit());
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn test_fork_missing_program() {
        let _guard = CwdGuard::new();
        let mut session = session();

        let outcome = harness::run(&mut session, "fork vein-no-such-command", false);
        assert_eq!(outcome.status.code(), 127);
        assert!(!outcome.status.exit());
    }
}
