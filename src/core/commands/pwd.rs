use std::env;

use super::{Command, CommandError, Context, Launch};
use crate::core::status::Status;
use crate::shell::pipeline::Stage;

#[derive(Clone, Default)]
pub struct PwdCommand;

impl Command for PwdCommand {
    fn execute(&self, _stage: &Stage, ctx: &mut Context<'_, '_>) -> Result<Launch, CommandError> {
        let dir = env::current_dir().map_err(CommandError::Io)?;
        ctx.writeln(&dir.display().to_string())?;
        Ok(Launch::Done(Status::success()))
    }
}
