//! Crate-wide error type and error taxonomy.
//!
//! Each subsystem defines its own error enum with miette `#[diagnostic]`
//! derives. [`PhoraError`] wraps them all without losing codes or help text,
//! and [`ErrorKind`] gives every error its coarse class.

use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::grammar::GrammarError;
use crate::kb::KbError;
use crate::opdl::OpdlError;

/// Coarse class of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Input text could not be tokenized.
    Lex,
    /// Tokens did not form a complete, well-placed structure.
    Parse,
    /// An `import` had no base path or its file could not be read.
    Import,
    /// A value of the wrong kind where a specific one was required.
    Construction,
    Config,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::Lex => "lex error",
            ErrorKind::Parse => "parse error",
            ErrorKind::Import => "import error",
            ErrorKind::Construction => "construction error",
            ErrorKind::Config => "config error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error, Diagnostic)]
pub enum PhoraError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Opdl(#[from] OpdlError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Kb(#[from] KbError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),
}

impl PhoraError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PhoraError::Grammar(e) => e.kind(),
            PhoraError::Opdl(e) => e.kind(),
            PhoraError::Kb(e) => e.kind(),
            PhoraError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type PhoraResult<T> = std::result::Result<T, PhoraError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grammar_error_converts_and_keeps_kind() {
        let err: PhoraError = crate::grammar::parse_lexicon("x := N : p(a").unwrap_err().into();
        assert!(matches!(err, PhoraError::Grammar(GrammarError::Incomplete { .. })));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn kb_error_wraps_opdl_error() {
        let err: PhoraError = crate::kb::KnowledgeBase::from_source("(type A :bases (B) :bases (C))")
            .unwrap_err()
            .into();
        assert!(matches!(
            err,
            PhoraError::Kb(KbError::Opdl(OpdlError::DuplicateKeyword { .. }))
        ));
        assert_eq!(err.kind(), ErrorKind::Parse);
    }

    #[test]
    fn config_errors_have_config_kind() {
        let err: PhoraError = crate::config::PhoraConfig::from_toml_str("[query]\nbase_discount = 2.0")
            .unwrap_err()
            .into();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn display_messages_are_descriptive() {
        let err = OpdlError::KeywordPlacement {
            name: "bases".into(),
        };
        assert!(err.to_string().contains(":bases"));
        assert_eq!(ErrorKind::Import.to_string(), "import error");
    }
}
