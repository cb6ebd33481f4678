//! Grounding pipeline: sentence → parses → knowledge-base objects.
//!
//! The sentence is tagged, chart-parsed, and the content words of the most
//! probable parse are resolved against the knowledge base. Without a parse
//! every tagged word is resolved instead, so ungrammatical input still
//! grounds what it can.

use serde::Serialize;

use crate::config::ChartConfig;
use crate::grammar::{ChartParser, Derivation, Lexicon};
use crate::kb::{Grounding, KnowledgeBase, LexicalCategory};
use crate::nlp::{Tagger, TaggedSpan, normalize};

/// Candidate referents of one word.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WordGrounding {
    pub word: String,
    pub category: Option<LexicalCategory>,
    /// Most likely first.
    pub candidates: Vec<Grounding>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SentenceGrounding {
    pub spans: Vec<TaggedSpan>,
    /// Every full parse; empty when the sentence has none.
    pub parses: Vec<Derivation>,
    /// Index into `parses` of the most probable parse.
    pub best: Option<usize>,
    pub words: Vec<WordGrounding>,
}

impl SentenceGrounding {
    pub fn best_parse(&self) -> Option<&Derivation> {
        self.best.map(|i| &self.parses[i])
    }
}

/// Binds a lexicon and knowledge base for repeated grounding.
pub struct Grounder<'a> {
    lexicon: &'a Lexicon,
    kb: &'a KnowledgeBase,
    chart: ChartConfig,
}

impl<'a> Grounder<'a> {
    pub fn new(lexicon: &'a Lexicon, kb: &'a KnowledgeBase) -> Self {
        Self {
            lexicon,
            kb,
            chart: ChartConfig::default(),
        }
    }

    pub fn with_chart_config(mut self, chart: ChartConfig) -> Self {
        self.chart = chart;
        self
    }

    /// Chart-parse already tokenized words.
    pub fn parse<S: AsRef<str>>(&self, words: &[S], context: Option<&str>) -> Option<Vec<Derivation>> {
        ChartParser::new(self.lexicon, self.kb)
            .with_config(self.chart.clone())
            .parse(words, context)
    }

    /// The word the chart sees for `span`. Lexicon words match exactly, so
    /// the surface form wins; the normalized form is only used when the
    /// lexicon knows it and not the surface (a capitalized first word).
    fn chart_word<'s>(&self, span: &'s TaggedSpan) -> &'s str {
        let known = |w: &str| self.lexicon.entries_for(w).next().is_some();
        if !known(&span.surface) && known(&span.text) {
            &span.text
        } else {
            &span.surface
        }
    }

    pub fn ground_sentence(
        &self,
        sentence: &str,
        tagger: &dyn Tagger,
        context: Option<&str>,
    ) -> SentenceGrounding {
        let spans = tagger.tag(sentence);
        let words: Vec<&str> = spans.iter().map(|s| self.chart_word(s)).collect();
        let parses = self.parse(&words, context).unwrap_or_default();

        let mut best: Option<usize> = None;
        for (i, parse) in parses.iter().enumerate() {
            if best.is_none_or(|b| parse.probability > parses[b].probability) {
                best = Some(i);
            }
        }

        let focus: Vec<String> = match best {
            Some(i) => parses[i].term.leaf_names(),
            None => {
                let mut seen = Vec::new();
                for word in &words {
                    if !seen.iter().any(|w: &String| w == word) {
                        seen.push(word.to_string());
                    }
                }
                seen
            }
        };

        let grounded: Vec<WordGrounding> = focus
            .into_iter()
            .map(|word| {
                let norm = normalize(&word);
                let category = spans
                    .iter()
                    .find(|s| s.text == norm)
                    .and_then(TaggedSpan::category);
                WordGrounding {
                    candidates: self.kb.ground(&word, category),
                    word,
                    category,
                }
            })
            .collect();

        tracing::debug!(
            words = spans.len(),
            parses = parses.len(),
            grounded = grounded.iter().filter(|w| !w.candidates.is_empty()).count(),
            "grounded sentence"
        );

        SentenceGrounding {
            spans,
            parses,
            best,
            words: grounded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::WhitespaceTagger;

    const GRAMMAR: &str = r"
        the := N/N : λx.x
        dog := N : dog
        park := N : park
        sleeps := S\N : λx.sleeps(x)
        in := (S\S)/N : λp.λe.in(e, p)
    ";

    const WORLD: &str = "
        (type Animal :nouns (animal))
        (type Dog :bases (Animal) :nouns (dog))
        (type Place :nouns (park place))
        (object rex :type (Dog))
        (object central :type (Place))
    ";

    fn fixtures() -> (Lexicon, KnowledgeBase) {
        (
            Lexicon::from_source(GRAMMAR).unwrap(),
            KnowledgeBase::from_source(WORLD).unwrap(),
        )
    }

    #[test]
    fn grounds_leaves_of_best_parse() {
        let (lexicon, kb) = fixtures();
        let grounder = Grounder::new(&lexicon, &kb);
        let result = grounder.ground_sentence("The dog sleeps.", &WhitespaceTagger::new(&kb), None);
        let best = result.best_parse().unwrap();
        assert_eq!(best.term.to_string(), "sleeps(dog)");
        assert_eq!(result.words.len(), 1);
        assert_eq!(result.words[0].word, "dog");
        assert_eq!(result.words[0].category, Some(LexicalCategory::Nouns));
        assert_eq!(result.words[0].candidates[0].object, "rex");
        assert_eq!(result.words[0].candidates[0].probability, 1.0);
    }

    #[test]
    fn modifier_leaves_are_all_grounded() {
        let (lexicon, kb) = fixtures();
        let grounder = Grounder::new(&lexicon, &kb);
        let result =
            grounder.ground_sentence("the dog sleeps in the park", &WhitespaceTagger::new(&kb), None);
        assert_eq!(
            result.best_parse().unwrap().term.to_string(),
            "in(sleeps(dog), park)"
        );
        let words: Vec<&str> = result.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["dog", "park"]);
        assert_eq!(result.words[1].candidates[0].object, "central");
    }

    #[test]
    fn no_parse_grounds_every_word() {
        let (lexicon, kb) = fixtures();
        let grounder = Grounder::new(&lexicon, &kb);
        let result = grounder.ground_sentence("dog park dog", &WhitespaceTagger::new(&kb), None);
        assert!(result.parses.is_empty());
        assert!(result.best.is_none());
        let words: Vec<&str> = result.words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(words, vec!["dog", "park"]);
    }

    #[test]
    fn capitalized_lexicon_words_parse() {
        let lexicon = Lexicon::from_source(r"
            Rex := N : rex
            sleeps := S\N : λx.sleeps(x)
        ")
        .unwrap();
        let kb = KnowledgeBase::from_source(WORLD).unwrap();
        let result =
            Grounder::new(&lexicon, &kb).ground_sentence("Rex sleeps", &WhitespaceTagger::new(&kb), None);
        assert_eq!(result.parses.len(), 1);
        assert_eq!(result.best_parse().unwrap().term.to_string(), "sleeps(rex)");
        assert_eq!(result.words[0].candidates[0].object, "rex");
        assert_eq!(result.words[0].candidates[0].probability, 1.0);

        // The lowercased form does not match an uppercase-only entry.
        let result =
            Grounder::new(&lexicon, &kb).ground_sentence("rex sleeps", &WhitespaceTagger::new(&kb), None);
        assert!(result.parses.is_empty());
    }

    #[test]
    fn parse_respects_chart_config() {
        let (lexicon, kb) = fixtures();
        let grounder = Grounder::new(&lexicon, &kb).with_chart_config(ChartConfig {
            start_symbol: "N".into(),
            ..ChartConfig::default()
        });
        let parses = grounder.parse(&["the", "dog"], None).unwrap();
        assert_eq!(parses[0].term.to_string(), "dog");
    }
}
