use std::io::{self, Write};

mod cd;
mod echo;
mod exec;
mod exit;
mod fork;
mod kill;
mod pwd;

pub use cd::CdCommand;
pub use echo::EchoCommand;
pub use exec::ExecCommand;
pub use exit::ExitCommand;
pub use fork::ForkCommand;
pub use kill::KillCommand;
pub use pwd::PwdCommand;

use crate::core::state::SessionState;
use crate::core::status::Status;
use crate::input::TokenizeError;
use crate::process::{self, ProcessError, Running};
use crate::shell::pipeline::Stage;
use crate::shell::streams::{Edges, Input, Output, PipeFeeder, Streams};

#[derive(Debug)]
pub enum CommandError {
    TooManyArguments(&'static str),
    Usage(&'static str),
    NumericArgumentRequired { command: &'static str, value: String },
    InvalidPid(String),
    ChangeDir { path: String, source: io::Error },
    Io(io::Error),
    /// Writing to the pipeline's own stdout failed.
    Output(io::Error),
    Process(ProcessError),
    Tokenize(TokenizeError),
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::TooManyArguments(cmd) => write!(f, "{}: too many arguments", cmd),
            CommandError::Usage(usage) => write!(f, "usage: {}", usage),
            CommandError::NumericArgumentRequired { command, value } => {
                write!(f, "{}: {}: numeric argument required", command, value)
            }
            CommandError::InvalidPid(pid) => write!(f, "kill: {}: invalid pid", pid),
            CommandError::ChangeDir { path, source } => write!(f, "cd: {}: {}", path, source),
            CommandError::Io(err) => write!(f, "IO error: {}", err),
            CommandError::Output(err) => write!(f, "output error: {}", err),
            CommandError::Process(err) => write!(f, "{}", err),
            CommandError::Tokenize(err) => write!(f, "{}", err),
        }
    }
}

impl std::error::Error for CommandError {}

impl From<ProcessError> for CommandError {
    fn from(err: ProcessError) -> Self {
        CommandError::Process(err)
    }
}

impl From<TokenizeError> for CommandError {
    fn from(err: TokenizeError) -> Self {
        CommandError::Tokenize(err)
    }
}

/// What launching a stage produced.
#[derive(Debug)]
pub enum Launch {
    /// Ran in-process and already finished.
    Done(Status),
    /// A child process the executor still has to wait for.
    Running(Running),
}

/// Everything a stage may touch while it is launched.
pub struct Context<'s, 'a> {
    pub session: &'s mut SessionState,
    streams: &'s mut Streams<'a>,
    edges: &'s Edges,
    stdin: Option<Input>,
    stdout: Option<Output>,
    /// Output bound for the next stage, handed over by `finish`.
    piped: Vec<u8>,
}

impl<'s, 'a> Context<'s, 'a> {
    pub fn new(
        session: &'s mut SessionState,
        streams: &'s mut Streams<'a>,
        edges: &'s Edges,
        stdin: Input,
        stdout: Output,
    ) -> Self {
        Self {
            session,
            streams,
            edges,
            stdin: Some(stdin),
            stdout: Some(stdout),
            piped: Vec::new(),
        }
    }

    /// Writes `line` and a newline to the stage's stdout.
    ///
    /// Towards a pipe the bytes are only buffered; the reader may not exist
    /// yet, so they are written once the stage is launched.
    pub fn writeln(&mut self, line: &str) -> Result<(), CommandError> {
        match self.stdout.as_ref() {
            Some(Output::Pipe(_)) => {
                self.piped.extend_from_slice(line.as_bytes());
                self.piped.push(b'\n');
                Ok(())
            }
            _ => writeln!(self.streams.stdout, "{}", line)
                .and_then(|_| self.streams.stdout.flush())
                .map_err(CommandError::Output),
        }
    }

    /// Starts `program` bound to this stage's stdin/stdout and the error edge.
    pub fn spawn(&mut self, program: &str, args: &[String]) -> Result<Running, CommandError> {
        let stdin = self.edges.stdin(self.stdin.take().unwrap_or(Input::Edge));
        let stdout = self.edges.stdout(self.stdout.take().unwrap_or(Output::Edge));
        let stderr = self
            .edges
            .stderr()
            .map_err(|e| ProcessError::spawn(program, e))?;

        if self.streams.inherit_stdio {
            // Keep earlier in-process output ahead of the child's.
            self.streams.flush().map_err(CommandError::Output)?;
        }
        Ok(process::spawn(program, args, stdin, stdout, stderr)?)
    }

    /// Closes the stage's endpoints. Buffered pipe output gets a feeder
    /// thread that owns the write end until the reader has taken it all.
    pub fn finish(mut self) -> io::Result<Option<PipeFeeder>> {
        match self.stdout.take() {
            Some(Output::Pipe(writer)) if !self.piped.is_empty() => {
                PipeFeeder::start(writer, std::mem::take(&mut self.piped)).map(Some)
            }
            _ => Ok(None),
        }
    }
}

pub trait Command {
    fn execute(&self, stage: &Stage, ctx: &mut Context<'_, '_>) -> Result<Launch, CommandError>;
}

/// Every name the dispatcher knows; anything else is `External`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Cd,
    Pwd,
    Echo,
    Kill,
    Ps,
    Fork,
    Exec,
    External,
}

const BUILTINS: [(&str, Builtin); 8] = [
    ("exit", Builtin::Exit),
    ("cd", Builtin::Cd),
    ("pwd", Builtin::Pwd),
    ("echo", Builtin::Echo),
    ("kill", Builtin::Kill),
    ("ps", Builtin::Ps),
    ("fork", Builtin::Fork),
    ("exec", Builtin::Exec),
];

impl Builtin {
    pub fn resolve(name: &str) -> Self {
        BUILTINS
            .iter()
            .find(|(builtin, _)| *builtin == name)
            .map(|(_, kind)| *kind)
            .unwrap_or(Builtin::External)
    }
}

impl Command for Builtin {
    fn execute(&self, stage: &Stage, ctx: &mut Context<'_, '_>) -> Result<Launch, CommandError> {
        match self {
            Builtin::Exit => ExitCommand.execute(stage, ctx),
            Builtin::Cd => CdCommand.execute(stage, ctx),
            Builtin::Pwd => PwdCommand.execute(stage, ctx),
            Builtin::Echo => EchoCommand.execute(stage, ctx),
            Builtin::Kill => KillCommand.execute(stage, ctx),
            Builtin::Fork => ForkCommand.execute(stage, ctx),
            Builtin::Exec => ExecCommand.execute(stage, ctx),
            // `ps` is the host's own process lister.
            Builtin::Ps | Builtin::External => Ok(Launch::Running(
                ctx.spawn(&stage.program, &stage.args)?,
            )),
        }
    }
}

/// Resolves `stage` and launches it. Failures come back as a finished Status.
pub fn dispatch(stage: &Stage, ctx: &mut Context<'_, '_>) -> Launch {
    match Builtin::resolve(&stage.program).execute(stage, ctx) {
        Ok(launch) => launch,
        Err(CommandError::Output(e)) => Launch::Done(Status::fatal(e)),
        Err(e) => Launch::Done(Status::failure(e)),
    }
}
