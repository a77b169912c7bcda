use std::env;

use super::{Command, CommandError, Context, Launch};
use crate::core::status::Status;
use crate::input::tokenize_with;
use crate::shell::pipeline::Stage;

/// Prints its arguments. The raw stage text is tokenized again so that `$?`
/// sees the session's last exit code.
#[derive(Clone, Default)]
pub struct EchoCommand;

impl Command for EchoCommand {
    fn execute(&self, stage: &Stage, ctx: &mut Context<'_, '_>) -> Result<Launch, CommandError> {
        let last_code = ctx.session.last_exit_code();
        let words = tokenize_with(&stage.raw, |name| match name {
            "?" => Some(last_code.to_string()),
            name => env::var(name).ok(),
        })?;

        let line = words.into_iter().skip(1).collect::<Vec<_>>().join(" ");
        ctx.writeln(&line)?;
        Ok(Launch::Done(Status::success()))
    }
}
