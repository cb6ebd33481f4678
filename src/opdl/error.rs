//! OPDL lexing and parsing errors.

use miette::Diagnostic;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors produced while reading OPDL source text.
#[derive(Debug, Error, Diagnostic)]
pub enum OpdlError {
    #[error("malformed OPDL input at byte {offset}: \"{fragment}\"")]
    #[diagnostic(
        code(phora::opdl::lex),
        help(
            "The OPDL lexer could not tokenize this text. Check for an unterminated \
             string literal or a stray quote character; comments start with `;`."
        )
    )]
    Lex { offset: usize, fragment: String },

    #[error("keyword :{name} is followed by positional arguments")]
    #[diagnostic(
        code(phora::opdl::keyword_placement),
        help("Keyword arguments must come after all positional arguments, e.g. `(type Dog :bases (Animal))`.")
    )]
    KeywordPlacement { name: String },

    #[error("keyword :{name} given twice in one expression")]
    #[diagnostic(
        code(phora::opdl::duplicate_keyword),
        help("Merge the two values into one list, e.g. `:bases (A B)` instead of `:bases (A) :bases (B)`.")
    )]
    DuplicateKeyword { name: String },

    #[error("keyword :{name} has no value")]
    #[diagnostic(
        code(phora::opdl::keyword_without_value),
        help("Every keyword needs a value before the closing parenthesis, e.g. `:nouns (dog)`.")
    )]
    KeywordWithoutValue { name: String },

    #[error("incomplete OPDL input: {depth} item(s) left unparsed")]
    #[diagnostic(
        code(phora::opdl::incomplete),
        help(
            "Top-level forms must be complete parenthesized expressions. \
             Check for a missing `)` or a bare symbol outside any expression."
        )
    )]
    Incomplete { depth: usize },
}

impl OpdlError {
    /// Where this error sits in the crate-wide error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            OpdlError::Lex { .. } => ErrorKind::Lex,
            _ => ErrorKind::Parse,
        }
    }
}

/// Result type for OPDL operations.
pub type OpdlResult<T> = std::result::Result<T, OpdlError>;
