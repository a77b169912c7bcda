use tracing::debug;

use super::{Command, CommandError, Context, Launch};
use crate::core::status::Status;
use crate::process::signal;
use crate::shell::pipeline::Stage;

#[derive(Clone, Default)]
pub struct KillCommand;

impl Command for KillCommand {
    fn execute(&self, stage: &Stage, ctx: &mut Context<'_, '_>) -> Result<Launch, CommandError> {
        let [arg] = stage.args.as_slice() else {
            return Err(CommandError::Usage("kill pid"));
        };
        let pid = arg
            .parse::<libc::pid_t>()
            .ok()
            .filter(|pid| *pid > 0)
            .ok_or_else(|| CommandError::InvalidPid(arg.clone()))?;

        if u32::try_from(pid).ok() == Some(ctx.session.pid()) {
            debug!(pid, "kill of the shell itself ignored");
            return Ok(Launch::Done(Status::success()));
        }

        signal::kill(pid)?;
        Ok(Launch::Done(Status::success()))
    }
}
