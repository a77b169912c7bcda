use std::io::{BufRead, Write};

use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use crate::error::ShellError;
use crate::highlight::SyntaxHighlighter;

/// Where the read-eval loop gets its lines from.
pub trait LineSource {
    /// Shows `prompt` and reads one line. `None` means end of input.
    fn read_line(&mut self, prompt: &str, out: &mut dyn Write)
        -> Result<Option<String>, ShellError>;
}

/// Reads newline-terminated lines from any buffered reader, writing the
/// prompt to the shell's output first.
pub struct PlainReader<R> {
    reader: R,
}

impl<R: BufRead> PlainReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for PlainReader<R> {
    fn read_line(
        &mut self,
        prompt: &str,
        out: &mut dyn Write,
    ) -> Result<Option<String>, ShellError> {
        out.write_all(prompt.as_bytes())?;
        out.flush()?;

        let mut line = Vec::new();
        self.reader.read_until(b'\n', &mut line)?;
        // A final line without its newline counts as end of input.
        if line.last() != Some(&b'\n') {
            return Ok(None);
        }
        // Stray bytes are replaced rather than ending the session.
        Ok(Some(String::from_utf8_lossy(&line).into_owned()))
    }
}

/// Interactive line editing for terminals. Lines are never added to history.
pub struct LineEditor {
    editor: DefaultEditor,
    highlighter: SyntaxHighlighter,
}

impl LineEditor {
    pub fn new() -> Result<Self, ShellError> {
        Ok(Self {
            editor: DefaultEditor::new()?,
            highlighter: SyntaxHighlighter::new(),
        })
    }
}

impl LineSource for LineEditor {
    fn read_line(
        &mut self,
        prompt: &str,
        _out: &mut dyn Write,
    ) -> Result<Option<String>, ShellError> {
        let prompt = self.highlighter.highlight_prompt(prompt);
        match self.editor.readline(&prompt) {
            Ok(line) => Ok(Some(line)),
            Err(ReadlineError::Interrupted) => Ok(Some(String::new())),
            Err(ReadlineError::Eof) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
