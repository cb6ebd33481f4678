//! Rich diagnostic error types for the grammar subsystem.
//!
//! Follows the miette pattern used across the crate: every error variant
//! carries `#[diagnostic(code(...), help(...))]` so the user knows exactly
//! what went wrong in a grammar definition and how to fix it.

use miette::Diagnostic;
use thiserror::Error;

use crate::error::ErrorKind;

/// Errors produced while lexing and parsing grammar definitions.
#[derive(Debug, Error, Diagnostic)]
pub enum GrammarError {
    #[error("malformed grammar input at byte {offset}: \"{fragment}\"")]
    #[diagnostic(
        code(phora::grammar::lex),
        help(
            "The grammar lexer could not tokenize this text. Names may not contain \
             digits or any of `/ \\ ( ) . [ ] : = , λ Λ`, and weights must be written \
             as 0, 1 or a decimal such as 0.25. Comments start with `#`."
        )
    )]
    Lex { offset: usize, fragment: String },

    #[error("incomplete parse: {depth} symbol(s) left on the stack at byte {offset}")]
    #[diagnostic(
        code(phora::grammar::incomplete),
        help(
            "The grammar source ended in the middle of a definition. Each definition \
             has the form `word := Type [sense w, default] : production`; check for an \
             unterminated predicate (missing `)`), a dangling `λx.` or a missing `:`."
        )
    )]
    Incomplete { depth: usize, offset: usize },

    #[error("invalid grammar construct: {message}")]
    #[diagnostic(
        code(phora::grammar::construction),
        help(
            "A value of the wrong kind was supplied while building a type, production \
             or lexical entry. Sense weights must lie in (0, 1] and the default weight \
             in [0, 1]."
        )
    )]
    Construction { message: String },
}

impl GrammarError {
    /// Where this error sits in the crate-wide error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GrammarError::Lex { .. } => ErrorKind::Lex,
            GrammarError::Incomplete { .. } => ErrorKind::Parse,
            GrammarError::Construction { .. } => ErrorKind::Construction,
        }
    }

    pub(crate) fn construction(message: impl Into<String>) -> Self {
        GrammarError::Construction {
            message: message.into(),
        }
    }
}

/// Result type for grammar operations.
pub type GrammarResult<T> = std::result::Result<T, GrammarError>;
