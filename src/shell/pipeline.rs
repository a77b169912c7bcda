use std::fmt;

use crate::error::ShellError;
use crate::input::tokenize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedPipe,
    UnterminatedQuote,
    EmptyCommand(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::UnexpectedPipe => write!(f, "syntax error near unexpected token `|'"),
            ParseError::UnterminatedQuote => write!(f, "syntax error: unterminated quote"),
            ParseError::EmptyCommand(raw) => write!(f, "syntax error: empty command `{}'", raw),
        }
    }
}

impl std::error::Error for ParseError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum QuoteState {
    Unquoted,
    SingleQuoted,
    DoubleQuoted,
    Escaped,
}

/// Splits a line into raw stage strings at unquoted `|`.
///
/// Quotes and backslashes are kept in the stage text; they only stop a `|`
/// or a closing quote from being recognised. Each stage is trimmed.
pub fn parse(line: &str) -> Result<Vec<String>, ParseError> {
    let mut stages = Vec::new();
    let mut current = String::new();
    let mut state = QuoteState::Unquoted;

    for c in line.chars() {
        state = match (state, c) {
            (QuoteState::Unquoted, '|') => {
                stages.push(current.trim().to_string());
                current.clear();
                continue;
            }
            (QuoteState::Unquoted, '\'') => QuoteState::SingleQuoted,
            (QuoteState::Unquoted, '"') => QuoteState::DoubleQuoted,
            (QuoteState::SingleQuoted, '\'') => QuoteState::Unquoted,
            (QuoteState::DoubleQuoted, '"') => QuoteState::Unquoted,
            (QuoteState::DoubleQuoted, '\\') => QuoteState::Escaped,
            (QuoteState::Escaped, _) => QuoteState::DoubleQuoted,
            (state, _) => state,
        };
        current.push(c);
    }
    stages.push(current.trim().to_string());

    if state != QuoteState::Unquoted {
        return Err(ParseError::UnterminatedQuote);
    }
    // Covers a leading or trailing `|` as well as `a || b`.
    if stages.iter().any(String::is_empty) {
        return Err(ParseError::UnexpectedPipe);
    }

    Ok(stages)
}

/// One command of a pipeline, tokenized and ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub program: String,
    pub args: Vec<String>,
    /// Stage text as typed, before tokenizing.
    pub raw: String,
    /// Part of a multi-stage pipeline; `exit` and `exec` do not end the shell then.
    pub pipelined: bool,
}

impl Stage {
    pub fn from_raw(raw: &str) -> Result<Self, ShellError> {
        let mut words = tokenize(raw)?.into_iter();
        let program = words
            .next()
            .ok_or_else(|| ParseError::EmptyCommand(raw.to_string()))?;

        Ok(Self {
            program,
            args: words.collect(),
            raw: raw.to_string(),
            pipelined: true,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn parse(line: &str) -> Result<Self, ShellError> {
        let stages = parse(line)?
            .iter()
            .map(|raw| Stage::from_raw(raw))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { stages })
    }

    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_on_unquoted_pipes() {
        assert_eq!(
            parse("ls -la | grep x |wc -l").expect("parse"),
            vec!["ls -la", "grep x", "wc -l"]
        );
        assert_eq!(parse("  pwd  ").expect("parse"), vec!["pwd"]);
    }

    #[test]
    fn test_single_quoted_pipe_is_literal() {
        assert_eq!(parse("echo 'a|b'").expect("parse"), vec!["echo 'a|b'"]);
        assert_eq!(parse("echo 'a\\'|cat").expect("parse"), vec!["echo 'a\\'", "cat"]);
    }

    #[test]
    fn test_double_quotes_and_escapes() {
        assert_eq!(parse("echo \"a|b\"").expect("parse"), vec!["echo \"a|b\""]);
        assert_eq!(
            parse("echo \"x\\\"|y\" | cat").expect("parse"),
            vec!["echo \"x\\\"|y\"", "cat"]
        );
    }

    #[test]
    fn test_pipe_at_edges_is_error() {
        assert_eq!(parse("| ls"), Err(ParseError::UnexpectedPipe));
        assert_eq!(parse("ls |"), Err(ParseError::UnexpectedPipe));
        assert_eq!(parse("ls | | wc"), Err(ParseError::UnexpectedPipe));
        assert_eq!(parse("ls || wc"), Err(ParseError::UnexpectedPipe));
    }

    #[test]
    fn test_unterminated_quotes() {
        assert_eq!(parse("echo 'abc"), Err(ParseError::UnterminatedQuote));
        assert_eq!(parse("echo \"abc | cat"), Err(ParseError::UnterminatedQuote));
        assert_eq!(parse("echo \"abc\\"), Err(ParseError::UnterminatedQuote));
    }

    #[test]
    fn test_pipeline_stages() {
        let stages = Pipeline::parse("echo 'a b' | cat -n")
            .expect("pipeline")
            .into_stages();
        assert_eq!(stages.len(), 2);

        let first = &stages[0];
        assert_eq!(first.program, "echo");
        assert_eq!(first.args, vec!["a b"]);
        assert_eq!(first.raw, "echo 'a b'");
        assert!(first.pipelined);

        assert_eq!(stages[1].args, vec!["-n"]);
    }

    #[test]
    fn test_stage_without_words() {
        let result = Pipeline::parse("$VEIN_SURELY_UNSET_VARIABLE");
        assert!(matches!(
            result,
            Err(ShellError::Parse(ParseError::EmptyCommand(_)))
        ));
    }
}
