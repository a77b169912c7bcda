//! Word splitting for a single stage.
//!
//! Quoting follows the usual shell rules: single quotes are fully literal,
//! double quotes allow `$` expansion and a handful of backslash escapes, and
//! an unquoted backslash takes the next character literally. `$NAME` and
//! `${NAME}` are expanded through a caller supplied lookup. Expanded text is
//! never split again.

use std::env;
use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenizeError {
    UnterminatedQuote,
    UnterminatedBrace,
    BadSubstitution(String),
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenizeError::UnterminatedQuote => write!(f, "syntax error: unterminated quote"),
            TokenizeError::UnterminatedBrace => write!(f, "syntax error: missing '}}'"),
            TokenizeError::BadSubstitution(text) => write!(f, "${{{}}}: bad substitution", text),
        }
    }
}

impl std::error::Error for TokenizeError {}

/// Splits `input` into words, expanding references from the process environment.
pub fn tokenize(input: &str) -> Result<Vec<String>, TokenizeError> {
    tokenize_with(input, |name| env::var(name).ok())
}

/// Splits `input` into words, expanding references through `lookup`.
///
/// `$?` is passed to the lookup as `?`; when the lookup has nothing for it
/// the text stays as written.
pub fn tokenize_with<F>(input: &str, lookup: F) -> Result<Vec<String>, TokenizeError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut words = Vec::new();
    let mut word = String::new();
    // Set once the current word exists, even if it is still empty ("").
    let mut started = false;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if started {
                    words.push(std::mem::take(&mut word));
                    started = false;
                }
            }
            '\'' => {
                started = true;
                loop {
                    match chars.next() {
                        Some('\'') => break,
                        Some(c) => word.push(c),
                        None => return Err(TokenizeError::UnterminatedQuote),
                    }
                }
            }
            '"' => {
                started = true;
                read_double_quoted(&mut chars, &mut word, &lookup)?;
            }
            '\\' => {
                started = true;
                if let Some(next) = chars.next() {
                    word.push(next);
                }
            }
            '$' => {
                let expanded = expand(&mut chars, &lookup)?;
                if !expanded.is_empty() {
                    started = true;
                    word.push_str(&expanded);
                }
            }
            c => {
                started = true;
                word.push(c);
            }
        }
    }

    if started {
        words.push(word);
    }
    Ok(words)
}

fn read_double_quoted<F>(
    chars: &mut Peekable<Chars<'_>>,
    word: &mut String,
    lookup: &F,
) -> Result<(), TokenizeError>
where
    F: Fn(&str) -> Option<String>,
{
    loop {
        match chars.next() {
            Some('"') => return Ok(()),
            Some('\\') => match chars.next() {
                Some(c @ ('"' | '\\' | '$' | '`')) => word.push(c),
                Some('\n') => {}
                Some(c) => {
                    word.push('\\');
                    word.push(c);
                }
                None => return Err(TokenizeError::UnterminatedQuote),
            },
            Some('$') => {
                let expanded = expand(chars, lookup)?;
                word.push_str(&expanded);
            }
            Some(c) => word.push(c),
            None => return Err(TokenizeError::UnterminatedQuote),
        }
    }
}

/// Expands the reference following a `$` that has already been consumed.
fn expand<F>(chars: &mut Peekable<Chars<'_>>, lookup: &F) -> Result<String, TokenizeError>
where
    F: Fn(&str) -> Option<String>,
{
    match chars.peek().copied() {
        Some('?') => {
            chars.next();
            Ok(lookup("?").unwrap_or_else(|| "$?".to_string()))
        }
        Some('{') => {
            chars.next();
            let mut name = String::new();
            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(c) => name.push(c),
                    None => return Err(TokenizeError::UnterminatedBrace),
                }
            }
            if name == "?" {
                return Ok(lookup("?").unwrap_or_else(|| "${?}".to_string()));
            }
            if !is_name(&name) {
                return Err(TokenizeError::BadSubstitution(name));
            }
            Ok(lookup(&name).unwrap_or_default())
        }
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '_' || c.is_ascii_alphanumeric() {
                    name.push(c);
                    chars.next();
                } else {
                    break;
                }
            }
            Ok(lookup(&name).unwrap_or_default())
        }
        _ => Ok("$".to_string()),
    }
}

fn is_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}
