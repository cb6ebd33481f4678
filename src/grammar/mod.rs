//! Categorial grammar: lexicon definitions and chart parsing.
//!
//! A grammar source is a list of definitions, one per word sense:
//!
//! ```text
//! dog  := N : dog
//! bank := N [Place 0.8, 0.1] : river_bank
//! sees := (S\N)/N : λy.λx.sees(x, y)
//! ```
//!
//! Each definition pairs a word with a category ([`Cat`]), optional sense
//! weights ([`SenseWeights`]) and a logical form ([`Term`]). The chart parser
//! combines adjacent categories by function application and applies the
//! matching logical forms, so a full parse carries both a category and a
//! meaning.
//!
//! ## Architecture
//!
//! ```text
//! grammar text ──→ lexer ──→ parser ──→ Lexicon
//!                                          │
//!                     words ──→ ChartParser ──→ Vec<Derivation>
//!                                          │
//!                          KnowledgeBase (sense weights vs. context)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use akh_phora::grammar::{Lexicon, chartparse};
//! use akh_phora::kb::KnowledgeBase;
//!
//! let lexicon = Lexicon::from_source(r"
//!     dog  := N : dog
//!     cat  := N : cat
//!     sees := (S\N)/N : λy.λx.sees(x, y)
//! ").unwrap();
//! let kb = KnowledgeBase::default();
//! let parses = chartparse(&["dog", "sees", "cat"], &lexicon, &kb, None).unwrap();
//! assert_eq!(parses[0].term.to_string(), "sees(dog, cat)");
//! ```

pub mod abs;
pub mod cat;
pub mod chart;
pub mod error;
pub mod lexer;
pub mod lexicon;
pub mod parser;

pub use abs::Term;
pub use cat::{Cat, Derivation, Direction, combine};
pub use chart::{Chart, ChartParser, chartparse};
pub use error::{GrammarError, GrammarResult};
pub use lexer::{Lexeme, Span, Token, lex};
pub use lexicon::{DEFAULT_WEIGHT, LexicalEntry, Lexicon, SenseWeights};
pub use parser::{GrammarParser, parse_lexicon, parse_lexicon_with_default};
