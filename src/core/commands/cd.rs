use super::{Command, CommandError, Context, Launch};
use crate::core::status::Status;
use crate::path::PathExpander;
use crate::shell::pipeline::Stage;

#[derive(Clone, Default)]
pub struct CdCommand;

impl Command for CdCommand {
    fn execute(&self, stage: &Stage, ctx: &mut Context<'_, '_>) -> Result<Launch, CommandError> {
        let expander = PathExpander::new(ctx.session.home_dir());
        let target = if stage.args.is_empty() {
            expander.home().to_path_buf()
        } else {
            expander.expand(&stage.args.join(" "))
        };

        ctx.session
            .change_dir(&target)
            .map_err(|source| CommandError::ChangeDir {
                path: target.display().to_string(),
                source,
            })?;
        Ok(Launch::Done(Status::success()))
    }
}
