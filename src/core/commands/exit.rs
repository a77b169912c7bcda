use super::{Command, CommandError, Context, Launch};
use crate::core::status::Status;
use crate::shell::pipeline::Stage;

/// Ends the session. Inside a pipeline it only reports the code.
#[derive(Clone, Default)]
pub struct ExitCommand;

impl Command for ExitCommand {
    fn execute(&self, stage: &Stage, ctx: &mut Context<'_, '_>) -> Result<Launch, CommandError> {
        let code = match stage.args.as_slice() {
            [] => ctx.session.last_exit_code(),
            [arg] => arg
                .parse::<u8>()
                .map(i32::from)
                .map_err(|_| CommandError::NumericArgumentRequired {
                    command: "exit",
                    value: arg.clone(),
                })?,
            _ => return Err(CommandError::TooManyArguments("exit")),
        };

        let status = if stage.pipelined {
            Status::with_code(code)
        } else {
            Status::terminate(code)
        };
        Ok(Launch::Done(status))
    }
}
