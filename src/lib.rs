// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # akh-phora
//!
//! A probabilistic categorial-grammar parser grounded in a typed knowledge
//! base.
//!
//! ## Architecture
//!
//! - **Grammar** (`grammar`): definition lexer, shift-reduce definition
//!   parser, category algebra, logical-form terms, and a CKY-style chart
//!   parser scoring derivations by sense weights
//! - **OPDL** (`opdl`): s-expression reader for knowledge sources
//! - **Knowledge base** (`kb`): types, objects, lexical index, imports and
//!   the probabilistic `query_is` subtype relation
//! - **Grounding** (`ground`, `nlp`): tag a sentence, parse it, resolve its
//!   content words to knowledge-base objects
//! - **Configuration** (`config`): TOML-backed tuning knobs
//!
//! ## Library usage
//!
//! ```
//! use akh_phora::grammar::Lexicon;
//! use akh_phora::ground::Grounder;
//! use akh_phora::kb::KnowledgeBase;
//! use akh_phora::nlp::WhitespaceTagger;
//!
//! let kb = KnowledgeBase::from_source(
//!     "(type Animal) (type Dog :bases (Animal) :nouns (dog)) (object rex :type (Dog))",
//! ).unwrap();
//! let lexicon = Lexicon::from_source(r"
//!     dog := N : dog
//!     barks := S\N : λx.barks(x)
//! ").unwrap();
//!
//! let result = Grounder::new(&lexicon, &kb)
//!     .ground_sentence("dog barks", &WhitespaceTagger::new(&kb), None);
//! assert_eq!(result.best_parse().unwrap().term.to_string(), "barks(dog)");
//! assert_eq!(result.words[0].candidates[0].object, "rex");
//! ```

pub mod config;
pub mod error;
pub mod grammar;
pub mod ground;
pub mod kb;
pub mod nlp;
pub mod opdl;

pub use error::{ErrorKind, PhoraError, PhoraResult};
