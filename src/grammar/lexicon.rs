//! Lexical entries and the lexicon index.
//!
//! A lexical entry pairs a surface word with a category, a logical form and
//! a table of sense weights. Entries are built once by the grammar parser and
//! never mutated afterwards.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::kb::KnowledgeBase;

use super::abs::Term;
use super::cat::Cat;
use super::error::{GrammarError, GrammarResult};
use super::parser;

/// Baseline probability of an entry with no applicable sense weight.
pub const DEFAULT_WEIGHT: f64 = 0.05;

/// Per-context multipliers for one lexical entry.
///
/// `senses` maps a knowledge-base type name to a weight in (0, 1]. When the
/// parse context is a subtype of a sense, that weight applies; otherwise the
/// default does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SenseWeights {
    senses: BTreeMap<String, f64>,
    default: f64,
}

impl SenseWeights {
    /// An empty table with the given default weight.
    pub fn new(default: f64) -> GrammarResult<Self> {
        if !(0.0..=1.0).contains(&default) {
            return Err(GrammarError::construction(format!(
                "default weight {default} is outside [0, 1]"
            )));
        }
        Ok(Self {
            senses: BTreeMap::new(),
            default,
        })
    }

    /// Add a sense weight. Later insertions of the same sense win.
    pub fn insert(&mut self, sense: impl Into<String>, weight: f64) -> GrammarResult<()> {
        let sense = sense.into();
        if !(weight > 0.0 && weight <= 1.0) {
            return Err(GrammarError::construction(format!(
                "weight {weight} for sense \"{sense}\" is outside (0, 1]"
            )));
        }
        self.senses.insert(sense, weight);
        Ok(())
    }

    pub fn get(&self, sense: &str) -> Option<f64> {
        self.senses.get(sense).copied()
    }

    pub fn default_weight(&self) -> f64 {
        self.default
    }

    pub fn senses(&self) -> impl Iterator<Item = (&str, f64)> {
        self.senses.iter().map(|(k, v)| (k.as_str(), *v))
    }

    pub fn is_empty(&self) -> bool {
        self.senses.is_empty()
    }
}

impl Default for SenseWeights {
    fn default() -> Self {
        Self {
            senses: BTreeMap::new(),
            default: DEFAULT_WEIGHT,
        }
    }
}

impl std::fmt::Display for SenseWeights {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (sense, weight) in &self.senses {
            write!(f, "{sense} {weight}, ")?;
        }
        write!(f, "{}]", self.default)
    }
}

/// One definition from a grammar source: `word := Cat [weights] : term`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LexicalEntry {
    word: String,
    cat: Cat,
    term: Term,
    weights: SenseWeights,
}

impl LexicalEntry {
    pub fn new(
        word: impl Into<String>,
        cat: Cat,
        term: Term,
        weights: SenseWeights,
    ) -> GrammarResult<Self> {
        let word = word.into();
        if word.is_empty() {
            return Err(GrammarError::construction("lexical entry word is empty"));
        }
        Ok(Self {
            word,
            cat,
            term,
            weights,
        })
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn cat(&self) -> &Cat {
        &self.cat
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn weights(&self) -> &SenseWeights {
        &self.weights
    }

    /// Probability that this entry is the intended reading in `context`.
    ///
    /// Starts at the default weight. With a context type, every sense `s`
    /// with weight `w` competes with `w * query_is(context, s)` and the
    /// best score wins.
    pub fn probability(&self, context: Option<&str>, kb: &KnowledgeBase) -> f64 {
        let mut best = self.weights.default_weight();
        let Some(context) = context else {
            return best;
        };
        for (sense, weight) in self.weights.senses() {
            let p = weight * kb.query_is(context, sense);
            if p > best {
                best = p;
            }
        }
        best
    }
}

impl std::fmt::Display for LexicalEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The table is always written: the entry cannot tell whether its
        // default came from the source or from the parser's configuration.
        write!(f, "{} := {} {} : {}", self.word, self.cat, self.weights, self.term)
    }
}

/// All lexical entries of a grammar, indexed by surface word.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    entries: Vec<LexicalEntry>,
    by_word: HashMap<String, Vec<usize>>,
}

impl Lexicon {
    pub fn new(entries: Vec<LexicalEntry>) -> Self {
        let mut by_word: HashMap<String, Vec<usize>> = HashMap::new();
        for (i, entry) in entries.iter().enumerate() {
            by_word.entry(entry.word.clone()).or_default().push(i);
        }
        Self { entries, by_word }
    }

    /// Parse a grammar source into a lexicon. Nothing is kept on error.
    pub fn from_source(source: &str) -> GrammarResult<Self> {
        parser::parse_lexicon(source).map(Self::new)
    }

    /// Like [`Lexicon::from_source`] with a custom default weight.
    pub fn from_source_with_default(source: &str, default_weight: f64) -> GrammarResult<Self> {
        parser::parse_lexicon_with_default(source, default_weight).map(Self::new)
    }

    pub fn entries(&self) -> &[LexicalEntry] {
        &self.entries
    }

    /// Entries whose word is exactly `word`, in definition order.
    pub fn entries_for<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a LexicalEntry> + 'a {
        self.by_word
            .get(word)
            .into_iter()
            .flatten()
            .map(|&i| &self.entries[i])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<LexicalEntry> for Lexicon {
    fn from_iter<I: IntoIterator<Item = LexicalEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kb() -> KnowledgeBase {
        KnowledgeBase::from_source(
            "(type Animal) (type Dog :bases (Animal)) (type Place)",
        )
        .unwrap()
    }

    fn bank(weights: SenseWeights) -> LexicalEntry {
        LexicalEntry::new("bank", Cat::atom("N"), Term::var("bank"), weights).unwrap()
    }

    #[test]
    fn weights_validate_range() {
        let mut w = SenseWeights::default();
        assert!(w.insert("Place", 0.5).is_ok());
        assert!(w.insert("Place", 0.0).is_err());
        assert!(w.insert("Place", 1.5).is_err());
        assert!(SenseWeights::new(1.5).is_err());
        assert!(SenseWeights::new(0.0).is_ok());
    }

    #[test]
    fn probability_without_context_is_default() {
        let mut w = SenseWeights::default();
        w.insert("Place", 0.9).unwrap();
        assert_eq!(bank(w).probability(None, &kb()), DEFAULT_WEIGHT);
    }

    #[test]
    fn probability_uses_matching_sense() {
        let mut w = SenseWeights::default();
        w.insert("Animal", 0.5).unwrap();
        let entry = bank(w);
        // Dog is-a Animal at 0.9, times the 0.5 sense weight.
        let p = entry.probability(Some("Dog"), &kb());
        assert!((p - 0.45).abs() < 1e-12, "p={p}");
    }

    #[test]
    fn probability_never_drops_below_default() {
        let mut w = SenseWeights::new(0.3).unwrap();
        w.insert("Place", 0.1).unwrap();
        let entry = bank(w);
        assert_eq!(entry.probability(Some("Dog"), &kb()), 0.3);
    }

    #[test]
    fn empty_word_rejected() {
        let err = LexicalEntry::new("", Cat::atom("N"), Term::var("x"), SenseWeights::default())
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Construction);
    }

    #[test]
    fn index_by_word() {
        let lexicon = Lexicon::from_source("a := N : x  b := N : y  a := S : z").unwrap();
        assert_eq!(lexicon.len(), 3);
        let cats: Vec<String> = lexicon.entries_for("a").map(|e| e.cat().to_string()).collect();
        assert_eq!(cats, vec!["N", "S"]);
        assert_eq!(lexicon.entries_for("missing").count(), 0);
    }

    #[test]
    fn display_round_trips_through_parser() {
        let source = r"bank := N [Place 0.5, 0.25] : bank()";
        let lexicon = Lexicon::from_source(source).unwrap();
        let shown = lexicon.entries()[0].to_string();
        let reparsed = Lexicon::from_source(&shown).unwrap();
        assert_eq!(reparsed.entries(), lexicon.entries());
    }

    #[test]
    fn display_keeps_configured_default() {
        let lexicon = Lexicon::from_source_with_default("dog := N : dog", 0.5).unwrap();
        let shown = lexicon.entries()[0].to_string();
        assert_eq!(shown, "dog := N [0.5] : dog");
        let reparsed = Lexicon::from_source(&shown).unwrap();
        assert_eq!(reparsed.entries()[0].weights().default_weight(), 0.5);
        assert_eq!(reparsed.entries(), lexicon.entries());
    }
}
