//! Typed views of OPDL `type` and `object` declarations.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::opdl::{Expr, SExpr};

use super::error::{KbError, KbResult};

/// Coarse word class under which a type indexes its words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LexicalCategory {
    Adjectives,
    Pronouns,
    Nouns,
}

impl LexicalCategory {
    pub const ALL: [LexicalCategory; 3] = [
        LexicalCategory::Nouns,
        LexicalCategory::Pronouns,
        LexicalCategory::Adjectives,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            LexicalCategory::Adjectives => "adjectives",
            LexicalCategory::Pronouns => "pronouns",
            LexicalCategory::Nouns => "nouns",
        }
    }

    /// OPDL keyword that lists words of this category.
    pub fn keyword(self) -> &'static str {
        match self {
            LexicalCategory::Adjectives => "provides-adjectives",
            LexicalCategory::Pronouns => "pronouns",
            LexicalCategory::Nouns => "nouns",
        }
    }
}

impl std::fmt::Display for LexicalCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LexicalCategory {
    type Err = String;

    /// Accepts the category names plus common part-of-speech tags
    /// (`JJ`, `ADJ`, `PRP`, `PRON`, `NN`, `NNS`, `NNP`, `PROPN`, ...).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "adjectives" | "adjective" | "adj" | "jj" | "jjr" | "jjs" => {
                Ok(LexicalCategory::Adjectives)
            }
            "pronouns" | "pronoun" | "pron" | "prp" | "prp$" | "wp" => {
                Ok(LexicalCategory::Pronouns)
            }
            "nouns" | "noun" | "n" | "nn" | "nns" | "nnp" | "nnps" | "propn" => {
                Ok(LexicalCategory::Nouns)
            }
            other => Err(format!("unknown lexical category: {other}")),
        }
    }
}

/// `(type Name :bases (...) :antibases (...) :provides-adjectives (...)
/// :pronouns (...) :nouns (...))`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpdlType {
    pub name: String,
    pub bases: BTreeSet<String>,
    pub antibases: BTreeSet<String>,
    pub adjectives: BTreeSet<String>,
    pub pronouns: BTreeSet<String>,
    pub nouns: BTreeSet<String>,
}

impl OpdlType {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn from_sexpr(expr: &SExpr) -> KbResult<Self> {
        let mut ty = Self::new(declared_name(expr)?);
        for (keyword, value) in &expr.kwargs {
            let slot = match keyword.as_str() {
                "bases" => &mut ty.bases,
                "antibases" => &mut ty.antibases,
                "provides-adjectives" => &mut ty.adjectives,
                "pronouns" => &mut ty.pronouns,
                "nouns" => &mut ty.nouns,
                other => {
                    tracing::warn!(ty = %ty.name, keyword = other, "ignoring unknown type keyword");
                    continue;
                }
            };
            *slot = name_set(keyword, value)?;
        }
        Ok(ty)
    }

    pub fn words(&self, category: LexicalCategory) -> &BTreeSet<String> {
        match category {
            LexicalCategory::Adjectives => &self.adjectives,
            LexicalCategory::Pronouns => &self.pronouns,
            LexicalCategory::Nouns => &self.nouns,
        }
    }
}

/// `(object Name :type (...))`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OpdlObject {
    pub name: String,
    pub types: BTreeSet<String>,
}

impl OpdlObject {
    pub fn from_sexpr(expr: &SExpr) -> KbResult<Self> {
        let mut object = Self {
            name: declared_name(expr)?,
            types: BTreeSet::new(),
        };
        for (keyword, value) in &expr.kwargs {
            if keyword == "type" {
                object.types = name_set(keyword, value)?;
            } else {
                tracing::warn!(object = %object.name, keyword = %keyword, "ignoring unknown object keyword");
            }
        }
        Ok(object)
    }
}

/// The second positional argument: `Dog` in `(type Dog ...)`.
pub(crate) fn declared_name(expr: &SExpr) -> KbResult<String> {
    let head = expr.head().unwrap_or("declaration");
    match expr.args.get(1) {
        Some(arg) => arg
            .as_atom()
            .map(str::to_string)
            .ok_or_else(|| KbError::construction(format!("{head} name must be a symbol or string, found {arg}"))),
        None => Err(KbError::construction(format!("{head} declaration has no name"))),
    }
}

fn name_set(keyword: &str, value: &Expr) -> KbResult<BTreeSet<String>> {
    let list = value.as_list().ok_or_else(|| {
        KbError::construction(format!(":{keyword} expects a list, found {value}"))
    })?;
    list.args
        .iter()
        .map(|item| {
            item.as_atom().map(str::to_string).ok_or_else(|| {
                KbError::construction(format!(
                    ":{keyword} items must be symbols or strings, found {item}"
                ))
            })
        })
        .collect()
}
