use std::fmt::Display;
use std::io::{self, Read, Write};
use std::process::Stdio;
use std::thread::{self, JoinHandle};

use os_pipe::{PipeReader, PipeWriter};

use crate::highlight::SyntaxHighlighter;

/// The outer endpoints of a pipeline.
///
/// With `inherit_stdio` the writers are this process's own stdout/stderr and
/// children inherit them directly. Otherwise children get `/dev/null` as
/// stdin and their output is copied into the writers.
pub struct Streams<'a> {
    pub stdout: &'a mut dyn Write,
    pub stderr: &'a mut dyn Write,
    pub inherit_stdio: bool,
    highlighter: SyntaxHighlighter,
}

impl<'a> Streams<'a> {
    pub fn inherited(stdout: &'a mut dyn Write, stderr: &'a mut dyn Write) -> Self {
        Self {
            stdout,
            stderr,
            inherit_stdio: true,
            highlighter: SyntaxHighlighter::plain(),
        }
    }

    pub fn captured(stdout: &'a mut dyn Write, stderr: &'a mut dyn Write) -> Self {
        Self {
            stdout,
            stderr,
            inherit_stdio: false,
            highlighter: SyntaxHighlighter::plain(),
        }
    }

    pub fn with_highlighter(mut self, highlighter: SyntaxHighlighter) -> Self {
        self.highlighter = highlighter;
        self
    }

    /// Writes one error line to the error sink.
    pub fn report(&mut self, error: &dyn Display) -> io::Result<()> {
        let line = self.highlighter.highlight_error(&error.to_string());
        writeln!(self.stderr, "{}", line)?;
        self.stderr.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()?;
        self.stderr.flush()
    }
}

/// Where a stage reads from.
pub enum Input {
    /// The pipeline's own stdin.
    Edge,
    Pipe(PipeReader),
}

/// Where a stage writes to.
pub enum Output {
    /// The pipeline's own stdout.
    Edge,
    Pipe(PipeWriter),
}

/// Turns stage endpoints into child stdio for one pipeline run.
///
/// In capture mode every child's stderr is a clone of one shared pipe whose
/// reader is drained on a background thread; dropping `Edges` closes the
/// orchestrator's copy so the drain sees end-of-stream once children exit.
pub struct Edges {
    inherit: bool,
    errors: Option<PipeWriter>,
}

impl Edges {
    pub fn new(inherit: bool) -> io::Result<(Self, Option<ErrorDrain>)> {
        if inherit {
            return Ok((
                Self {
                    inherit,
                    errors: None,
                },
                None,
            ));
        }

        let (reader, writer) = os_pipe::pipe()?;
        let drain = ErrorDrain::start(reader)?;
        Ok((
            Self {
                inherit,
                errors: Some(writer),
            },
            Some(drain),
        ))
    }

    pub fn stdin(&self, input: Input) -> Stdio {
        match input {
            Input::Pipe(reader) => reader.into(),
            Input::Edge if self.inherit => Stdio::inherit(),
            Input::Edge => Stdio::null(),
        }
    }

    pub fn stdout(&self, output: Output) -> Stdio {
        match output {
            Output::Pipe(writer) => writer.into(),
            Output::Edge if self.inherit => Stdio::inherit(),
            Output::Edge => Stdio::piped(),
        }
    }

    pub fn stderr(&self) -> io::Result<Stdio> {
        match &self.errors {
            Some(writer) => Ok(writer.try_clone()?.into()),
            None => Ok(Stdio::inherit()),
        }
    }
}

/// Collects captured child stderr until every writer is closed.
pub struct ErrorDrain {
    handle: JoinHandle<io::Result<Vec<u8>>>,
}

impl ErrorDrain {
    fn start(mut reader: PipeReader) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name("stderr-drain".to_string())
            .spawn(move || {
                let mut collected = Vec::new();
                reader.read_to_end(&mut collected)?;
                Ok(collected)
            })?;
        Ok(Self { handle })
    }

    pub fn finish(self) -> io::Result<Vec<u8>> {
        self.handle
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "stderr drain thread panicked"))?
    }
}

/// Writes a built-in's buffered output into the pipe towards the next stage
/// on its own thread, so launching never blocks on a full pipe.
pub struct PipeFeeder {
    handle: JoinHandle<io::Result<()>>,
}

impl PipeFeeder {
    pub fn start(mut writer: PipeWriter, bytes: Vec<u8>) -> io::Result<Self> {
        let handle = thread::Builder::new()
            .name("pipe-feeder".to_string())
            .spawn(move || {
                writer.write_all(&bytes)?;
                writer.flush()
            })?;
        Ok(Self { handle })
    }

    /// Waits until every byte was taken by the reader or the reader went away.
    pub fn finish(self) -> io::Result<()> {
        self.handle
            .join()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "pipe feeder thread panicked"))?
    }
}
