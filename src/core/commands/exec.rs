use super::{Command, CommandError, Context, Launch};
use crate::core::status::Status;
use crate::shell::pipeline::Stage;

/// `exec prog args...` runs `prog` in place of the shell: standalone, its
/// exit status ends the session.
#[derive(Clone, Default)]
pub struct ExecCommand;

impl Command for ExecCommand {
    fn execute(&self, stage: &Stage, ctx: &mut Context<'_, '_>) -> Result<Launch, CommandError> {
        let Some((program, args)) = stage.args.split_first() else {
            return Ok(Launch::Done(Status::success()));
        };

        let running = ctx.spawn(program, args)?.terminating(!stage.pipelined);
        Ok(Launch::Running(running))
    }
}

#[cfg(test)]
mod tests {
    use crate::core::commands::harness;
    use crate::core::state::SessionState;
    use crate::test_support::CwdGuard;

    fn session() -> SessionState {
        SessionState::with_identity("t", "h", "/").expect("session")
    }

    #[test]
    fn test_exec_without_args() {
        let _guard = CwdGuard::new();
        let mut session = session();
        let outcome = harness::run(&mut session, "exec", false);
        assert!(outcome.status.is_success());
        assert!(!outcome.status.exit());
    }

    #[test]
    fn test_exec_standalone_terminates() {
        let _guard = CwdGuard::new();
        let mut session = session();
        let outcome = harness::run(&mut session, "exec sh -c 'echo replaced; exit 3'", false);
        assert!(outcome.status.exit());
        assert_eq!(outcome.status.code(), 3);
        assert_eq!(outcome.stdout, "replaced\n");
    }

    #[test]
    fn test_exec_pipelined_only_reports_code() {
        let _guard = CwdGuard::new();
        let mut session = session();
        let outcome = harness::run(&mut session, "exec sh -c 'exit 3'", true);
        assert!(!outcome.status.exit());
        assert_eq!(outcome.status.code(), 3);
    }

    #[test]
    fn test_exec_missing_program_does_not_terminate() {
        let _guard = CwdGuard::new();
        let mut session = session();
        let outcome = harness::run(&mut session, "exec vein-no-such-command", false);
        assert!(!outcome.status.exit());
        assert_eq!(outcome.status.code(), 127);
        assert!(outcome.status.error().is_some());
    }
}
