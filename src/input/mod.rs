pub mod reader;
pub mod tokenizer;

pub use reader::{LineEditor, LineSource, PlainReader};
pub use tokenizer::{tokenize, tokenize_with, TokenizeError};
