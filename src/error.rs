use crate::core::commands::CommandError;
use crate::core::config::ConfigError;
use crate::input::TokenizeError;
use crate::process::ProcessError;
use crate::shell::pipeline::ParseError;

#[derive(Debug)]
pub enum ShellError {
    Readline(rustyline::error::ReadlineError),
    Io(std::io::Error),
    HomeDirNotFound,
    UserNotFound,
    Parse(ParseError),
    Tokenize(TokenizeError),
    Command(CommandError),
    Process(ProcessError),
    Config(ConfigError),
    FlagError(String),
    CtrlC(String),
}

impl ShellError {
    /// Exit code recorded for a recoverable failure of this kind.
    pub fn exit_code(&self) -> i32 {
        match self {
            ShellError::Parse(_) | ShellError::Tokenize(_) | ShellError::FlagError(_) => 2,
            ShellError::Process(e) | ShellError::Command(CommandError::Process(e)) => e.exit_code(),
            _ => 1,
        }
    }
}

impl From<rustyline::error::ReadlineError> for ShellError {
    fn from(err: rustyline::error::ReadlineError) -> Self {
        ShellError::Readline(err)
    }
}

impl From<std::io::Error> for ShellError {
    fn from(err: std::io::Error) -> Self {
        ShellError::Io(err)
    }
}

impl From<ctrlc::Error> for ShellError {
    fn from(err: ctrlc::Error) -> Self {
        ShellError::CtrlC(err.to_string())
    }
}

impl From<ParseError> for ShellError {
    fn from(err: ParseError) -> Self {
        ShellError::Parse(err)
    }
}

impl From<TokenizeError> for ShellError {
    fn from(err: TokenizeError) -> Self {
        ShellError::Tokenize(err)
    }
}

impl From<CommandError> for ShellError {
    fn from(err: CommandError) -> Self {
        ShellError::Command(err)
    }
}

impl From<ProcessError> for ShellError {
    fn from(err: ProcessError) -> Self {
        ShellError::Process(err)
    }
}

impl From<ConfigError> for ShellError {
    fn from(err: ConfigError) -> Self {
        ShellError::Config(err)
    }
}

impl std::fmt::Display for ShellError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ShellError::Readline(e) => write!(f, "readline error: {}", e),
            ShellError::Io(e) => write!(f, "IO error: {}", e),
            ShellError::HomeDirNotFound => write!(f, "Home directory not found"),
            ShellError::UserNotFound => write!(f, "Current user not found"),
            ShellError::Parse(e) => write!(f, "{}", e),
            ShellError::Tokenize(e) => write!(f, "{}", e),
            ShellError::Command(e) => write!(f, "{}", e),
            ShellError::Process(e) => write!(f, "{}", e),
            ShellError::Config(e) => write!(f, "config error: {}", e),
            ShellError::FlagError(msg) => write!(f, "flag error: {}", msg),
            ShellError::CtrlC(msg) => write!(f, "Ctrl-C error: {}", msg),
        }
    }
}

impl std::error::Error for ShellError {}
