//! Tokenizing and tagging seam.
//!
//! The grounding pipeline needs words and coarse lexical categories. Real
//! taggers (POS models, noun-phrase chunkers) live outside this crate and
//! plug in through [`Tagger`]. [`WhitespaceTagger`] is the built-in baseline:
//! it splits on whitespace and asks the knowledge base which categories
//! declare each word.

use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::kb::KnowledgeBase;
pub use crate::kb::LexicalCategory;

/// Canonical form used for word lookups: NFKC, trimmed, lowercased.
pub fn normalize(word: &str) -> String {
    let folded: String = word.nfkc().collect();
    folded.trim().to_lowercase()
}

/// One tagged word of a sentence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaggedSpan {
    /// The word as it appeared in the sentence, punctuation stripped.
    pub surface: String,
    /// Normalized form, used for knowledge-base lookups.
    pub text: String,
    /// Byte offsets of `surface` in the sentence.
    pub start: usize,
    pub end: usize,
    /// Categories the tagger assigned; empty when unknown.
    pub categories: Vec<LexicalCategory>,
}

impl TaggedSpan {
    /// The category when the tagger settled on exactly one.
    pub fn category(&self) -> Option<LexicalCategory> {
        match self.categories.as_slice() {
            [only] => Some(*only),
            _ => None,
        }
    }
}

/// Splits a sentence into tagged words.
pub trait Tagger {
    fn tag(&self, sentence: &str) -> Vec<TaggedSpan>;
}

/// Whitespace tokenizer tagging words by knowledge-base lookup.
pub struct WhitespaceTagger<'a> {
    kb: &'a KnowledgeBase,
}

impl<'a> WhitespaceTagger<'a> {
    pub fn new(kb: &'a KnowledgeBase) -> Self {
        Self { kb }
    }
}

impl Tagger for WhitespaceTagger<'_> {
    fn tag(&self, sentence: &str) -> Vec<TaggedSpan> {
        let mut spans = Vec::new();
        let mut offset = 0;
        for raw in sentence.split_whitespace() {
            let Some(found) = sentence[offset..].find(raw) else {
                continue;
            };
            let raw_start = offset + found;
            offset = raw_start + raw.len();

            let trimmed = raw.trim_start_matches(|c: char| !c.is_alphanumeric());
            let start = raw_start + (raw.len() - trimmed.len());
            let surface = trimmed.trim_end_matches(|c: char| !c.is_alphanumeric());
            if surface.is_empty() {
                continue;
            }
            spans.push(TaggedSpan {
                surface: surface.to_string(),
                text: normalize(surface),
                start,
                end: start + surface.len(),
                categories: self.kb.categories_of(surface),
            });
        }
        spans
    }
}
