//! Bottom-up chart parser over lexical entries.
//!
//! Cell `(start, len)` holds every derivation covering `len` words from
//! `start`. Single-word cells are seeded from the lexicon; longer spans are
//! built by trying [`combine`] on every split point. Nothing is deduplicated
//! or pruned, so ambiguous grammars keep all of their derivations.
//!
//! Cells of the same span length only read shorter spans, so each length is
//! filled in parallel with rayon once the sentence is long enough.

use rayon::prelude::*;

use crate::config::ChartConfig;
use crate::kb::KnowledgeBase;

use super::cat::{Derivation, combine};
use super::lexicon::Lexicon;

/// The filled table of one chart parse.
#[derive(Debug, Clone)]
pub struct Chart {
    words: usize,
    cells: Vec<Vec<Derivation>>,
}

impl Chart {
    fn new(words: usize) -> Self {
        Self {
            words,
            cells: vec![Vec::new(); words * words],
        }
    }

    fn index(&self, start: usize, len: usize) -> Option<usize> {
        (len >= 1 && start + len <= self.words).then(|| start * self.words + len - 1)
    }

    /// Derivations spanning `len` words from `start`. Empty when out of range.
    pub fn cell(&self, start: usize, len: usize) -> &[Derivation] {
        self.index(start, len)
            .map(|i| self.cells[i].as_slice())
            .unwrap_or(&[])
    }

    fn set(&mut self, start: usize, len: usize, cell: Vec<Derivation>) {
        if let Some(i) = self.index(start, len) {
            self.cells[i] = cell;
        }
    }

    /// Number of words the chart was built over.
    pub fn words(&self) -> usize {
        self.words
    }

    /// Total derivations across all cells.
    pub fn derivation_count(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    /// Every derivation of `(start, len)` reachable from one split point.
    fn combine_span(&self, start: usize, len: usize) -> Vec<Derivation> {
        let mut cell = Vec::new();
        for split in 1..len {
            for left in self.cell(start, split) {
                for right in self.cell(start + split, len - split) {
                    if let Some(d) = combine(left, right) {
                        cell.push(d);
                    }
                }
            }
        }
        cell
    }
}

/// Chart parser bound to one lexicon and knowledge base.
pub struct ChartParser<'a> {
    lexicon: &'a Lexicon,
    kb: &'a KnowledgeBase,
    config: ChartConfig,
}

impl<'a> ChartParser<'a> {
    pub fn new(lexicon: &'a Lexicon, kb: &'a KnowledgeBase) -> Self {
        Self {
            lexicon,
            kb,
            config: ChartConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ChartConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    /// Fill the whole chart for `words`.
    ///
    /// Lexical probabilities are scored against `context`, a knowledge-base
    /// type name, when one is given.
    pub fn fill<S: AsRef<str>>(&self, words: &[S], context: Option<&str>) -> Chart {
        let n = words.len();
        let mut chart = Chart::new(n);

        for (i, word) in words.iter().enumerate() {
            let cell = self
                .lexicon
                .entries_for(word.as_ref())
                .map(|entry| {
                    Derivation::new(
                        entry.cat().clone(),
                        entry.term().clone(),
                        entry.probability(context, self.kb),
                    )
                })
                .collect();
            chart.set(i, 1, cell);
        }

        let parallel = self.config.parallel && n >= self.config.parallel_min_words;
        for len in 2..=n {
            let cells: Vec<Vec<Derivation>> = if parallel {
                (0..=n - len)
                    .into_par_iter()
                    .map(|start| chart.combine_span(start, len))
                    .collect()
            } else {
                (0..=n - len)
                    .map(|start| chart.combine_span(start, len))
                    .collect()
            };
            for (start, cell) in cells.into_iter().enumerate() {
                chart.set(start, len, cell);
            }
        }
        chart
    }

    /// Parse `words` and return the full-span derivations of the start
    /// category.
    ///
    /// `None` means no parse: the input is out of lexicon or ungrammatical.
    /// That is an ordinary outcome, not an error.
    pub fn parse<S: AsRef<str>>(&self, words: &[S], context: Option<&str>) -> Option<Vec<Derivation>> {
        if words.is_empty() {
            return None;
        }
        let chart = self.fill(words, context);
        let parses: Vec<Derivation> = chart
            .cell(0, words.len())
            .iter()
            .filter(|d| d.cat.is_atom_named(&self.config.start_symbol))
            .cloned()
            .collect();
        tracing::debug!(
            words = words.len(),
            derivations = chart.derivation_count(),
            parses = parses.len(),
            "chart parse"
        );
        if parses.is_empty() { None } else { Some(parses) }
    }
}

/// Convenience wrapper: parse `words` with default chart settings.
pub fn chartparse<S: AsRef<str>>(
    words: &[S],
    lexicon: &Lexicon,
    kb: &KnowledgeBase,
    context: Option<&str>,
) -> Option<Vec<Derivation>> {
    ChartParser::new(lexicon, kb).parse(words, context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Cat, Term};

    const GRAMMAR: &str = r"
        dog := N : dog
        cat := N : cat
        verb := (S\N)/N : λy.λx.sees(x,y)
        sleeps := S\N : λx.sleeps(x)
        big := N/N : λx.big(x)
    ";

    fn setup() -> (Lexicon, KnowledgeBase) {
        (
            Lexicon::from_source(GRAMMAR).unwrap(),
            KnowledgeBase::default(),
        )
    }

    #[test]
    fn transitive_sentence() {
        let (lexicon, kb) = setup();
        let parses = chartparse(&["dog", "verb", "dog"], &lexicon, &kb, None).unwrap();
        assert_eq!(parses.len(), 1);
        assert_eq!(parses[0].cat, Cat::atom("S"));
        assert_eq!(
            parses[0].term,
            Term::predicate("sees", vec![Term::var("dog"), Term::var("dog")])
        );
        let expected = 0.05f64.powi(3);
        assert!((parses[0].probability - expected).abs() < 1e-15);
    }

    #[test]
    fn argument_order_follows_lambdas() {
        let (lexicon, kb) = setup();
        let parses = chartparse(&["dog", "verb", "cat"], &lexicon, &kb, None).unwrap();
        assert_eq!(parses[0].term.to_string(), "sees(dog, cat)");
    }

    #[test]
    fn intransitive_with_modifier() {
        let (lexicon, kb) = setup();
        let parses = chartparse(&["big", "dog", "sleeps"], &lexicon, &kb, None).unwrap();
        assert_eq!(parses.len(), 1);
        assert_eq!(parses[0].term.to_string(), "sleeps(big(dog))");
    }

    #[test]
    fn non_sentence_span_is_no_parse() {
        let (lexicon, kb) = setup();
        // "big dog" covers the span as N, not S.
        assert!(chartparse(&["big", "dog"], &lexicon, &kb, None).is_none());
    }

    #[test]
    fn unknown_word_is_no_parse() {
        let (lexicon, kb) = setup();
        assert!(chartparse(&["dog", "flies"], &lexicon, &kb, None).is_none());
        assert!(chartparse::<&str>(&[], &lexicon, &kb, None).is_none());
    }

    #[test]
    fn chart_cells_hold_partial_spans() {
        let (lexicon, kb) = setup();
        let chart = ChartParser::new(&lexicon, &kb).fill(&["dog", "verb", "cat"], None);
        assert_eq!(chart.words(), 3);
        assert_eq!(chart.cell(0, 1).len(), 1);
        assert!(chart.cell(0, 2).is_empty());
        assert_eq!(chart.cell(1, 2)[0].cat.to_string(), r"S\N");
        assert!(chart.cell(2, 2).is_empty());
    }

    #[test]
    fn ambiguity_is_preserved() {
        let lexicon = Lexicon::from_source(
            r"
            bank := N : river_bank
            bank := N : money_bank
            closed := S\N : λx.closed(x)
            ",
        )
        .unwrap();
        let kb = KnowledgeBase::default();
        let parses = chartparse(&["bank", "closed"], &lexicon, &kb, None).unwrap();
        let forms: Vec<String> = parses.iter().map(|d| d.term.to_string()).collect();
        assert_eq!(forms, vec!["closed(river_bank)", "closed(money_bank)"]);
    }

    #[test]
    fn context_weights_scale_probability() {
        let lexicon = Lexicon::from_source(
            r"
            bank := N [Place 0.8, 0.1] : river_bank
            bank := N [Company 0.8, 0.1] : money_bank
            closed := S\N [1] : λx.closed(x)
            ",
        )
        .unwrap();
        let kb = KnowledgeBase::from_source(
            "(type Place) (type Company) (type Riverside :bases (Place))",
        )
        .unwrap();
        let parses = chartparse(&["bank", "closed"], &lexicon, &kb, Some("Riverside")).unwrap();
        let best = parses
            .iter()
            .max_by(|a, b| a.probability.total_cmp(&b.probability))
            .unwrap();
        assert_eq!(best.term.to_string(), "closed(river_bank)");
        assert!((best.probability - 0.8 * 0.9).abs() < 1e-12);
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let (lexicon, kb) = setup();
        let words = ["big", "big", "big", "dog", "verb", "big", "cat"];
        let sequential = ChartParser::new(&lexicon, &kb)
            .with_config(ChartConfig {
                parallel: false,
                ..ChartConfig::default()
            })
            .parse(&words, None);
        let parallel = ChartParser::new(&lexicon, &kb)
            .with_config(ChartConfig {
                parallel: true,
                parallel_min_words: 1,
                ..ChartConfig::default()
            })
            .parse(&words, None);
        assert_eq!(sequential, parallel);
        assert_eq!(
            sequential.unwrap()[0].term.to_string(),
            "sees(big(big(big(dog))), big(cat))"
        );
    }

    #[test]
    fn custom_start_symbol() {
        let (lexicon, kb) = setup();
        let parser = ChartParser::new(&lexicon, &kb).with_config(ChartConfig {
            start_symbol: "N".into(),
            ..ChartConfig::default()
        });
        let parses = parser.parse(&["big", "dog"], None).unwrap();
        assert_eq!(parses[0].term.to_string(), "big(dog)");
    }
}
