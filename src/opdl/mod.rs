//! OPDL: the s-expression language knowledge bases are written in.
//!
//! ```text
//! ; comments run to end of line
//! (import "animals.opdl")
//! (type Dog :bases (Animal) :nouns (dog hound))
//! (object rex :type (Dog))
//! ```
//!
//! This module only turns text into [`SExpr`] trees. Interpreting the
//! declarations is the knowledge base's job (see [`crate::kb`]).

pub mod error;
pub mod lexer;
pub mod parser;

pub use error::{OpdlError, OpdlResult};
pub use lexer::{OpdlToken, lex};
pub use parser::{Expr, OpdlParser, SExpr, parse};
