//! Knowledge-base loading errors.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

use crate::error::ErrorKind;
use crate::opdl::OpdlError;

/// Errors from loading OPDL declarations into a knowledge base.
#[derive(Debug, Error, Diagnostic)]
pub enum KbError {
    #[error("cannot import \"{target}\": source has no base path")]
    #[diagnostic(
        code(phora::kb::import_without_path),
        help(
            "Imports resolve relative to the importing file. Load the source with \
             `KnowledgeBase::load_file`, or pass a base path to `load`."
        )
    )]
    ImportWithoutPath { target: String },

    #[error("cannot read {}", path.display())]
    #[diagnostic(
        code(phora::kb::import_io),
        help("Check that the file exists and is readable. Import paths are relative to the importing file.")
    )]
    ImportIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown declaration `{head}`")]
    #[diagnostic(
        code(phora::kb::unknown_declaration),
        help("Top-level forms must start with `import`, `type` or `object`.")
    )]
    UnknownDeclaration { head: String },

    #[error("malformed declaration: {message}")]
    #[diagnostic(
        code(phora::kb::construction),
        help(
            "Declarations look like `(type Name :bases (A B))` or `(object name :type (T))`. \
             Keyword values must be lists of symbols or strings."
        )
    )]
    Construction { message: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Opdl(#[from] OpdlError),
}

impl KbError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            KbError::ImportWithoutPath { .. } | KbError::ImportIo { .. } => ErrorKind::Import,
            KbError::UnknownDeclaration { .. } => ErrorKind::Parse,
            KbError::Construction { .. } => ErrorKind::Construction,
            KbError::Opdl(e) => e.kind(),
        }
    }

    pub(crate) fn construction(message: impl Into<String>) -> Self {
        KbError::Construction {
            message: message.into(),
        }
    }
}

/// Result type for knowledge-base operations.
pub type KbResult<T> = std::result::Result<T, KbError>;
