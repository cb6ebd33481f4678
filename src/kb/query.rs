//! Subtype queries and object grounding.
//!
//! `query_is(a, b)` scores how strongly type `a` is a kind of `b`. Each step
//! up a declared base costs `base_discount`; when that search finds nothing
//! better than `fallback_threshold`, every other type is tried at the much
//! steeper `fallback_discount`. A visited set owned by the top-level call
//! keeps cyclic hierarchies finite.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::{KnowledgeBase, LexicalCategory};
use crate::nlp::normalize;

/// One object a word may refer to, with its score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grounding {
    pub object: String,
    pub probability: f64,
}

impl KnowledgeBase {
    /// Probability in [0, 1] that type `a` is a subtype of type `b`.
    pub fn query_is(&self, a: &str, b: &str) -> f64 {
        self.query_is_with_floor(a, b, 0.0)
    }

    /// [`KnowledgeBase::query_is`] with a caller-supplied floor. A floor of
    /// 1.0 short-circuits to certainty.
    pub fn query_is_with_floor(&self, a: &str, b: &str, floor: f64) -> f64 {
        let mut visited = HashSet::new();
        self.explore(a, b, floor, &mut visited)
    }

    fn explore<'q>(&'q self, a: &'q str, b: &str, floor: f64, visited: &mut HashSet<&'q str>) -> f64 {
        if a == b || floor >= 1.0 {
            return 1.0;
        }
        let ty = self.types.get(a);
        if ty.is_some_and(|t| t.antibases.contains(b)) {
            return 0.0;
        }
        visited.insert(a);

        let mut alpha: f64 = 0.0;
        if let Some(ty) = ty {
            for base in &ty.bases {
                if visited.contains(base.as_str()) {
                    continue;
                }
                alpha = alpha.max(self.config.base_discount * self.explore(base, b, floor, visited));
            }
        }

        if alpha < self.config.fallback_threshold {
            for name in self.types.keys() {
                if visited.contains(name.as_str()) || ty.is_some_and(|t| t.bases.contains(name)) {
                    continue;
                }
                alpha = alpha
                    .max(self.config.fallback_discount * self.explore(name, b, floor, visited));
            }
        }
        alpha
    }

    /// Probability that `word` (of `category`, if known) refers to `object`.
    ///
    /// 1.0 when the word is the object's own name. Otherwise the word is
    /// mapped to the types that declare it (or, as a noun, that it names)
    /// and the best `query_is(object type, word type)` wins.
    pub fn resolve(&self, word: &str, category: Option<LexicalCategory>, object: &str) -> f64 {
        let Some(obj) = self.objects.get(object) else {
            return 0.0;
        };
        let norm = normalize(word);
        if normalize(&obj.name) == norm {
            return 1.0;
        }
        let candidates = self.candidate_types(&norm, category);
        let mut best: f64 = 0.0;
        for candidate in &candidates {
            for ty in &obj.types {
                best = best.max(self.query_is(ty, candidate));
            }
        }
        best
    }

    /// Every object `word` may refer to, most likely first. Objects scoring
    /// zero are left out.
    pub fn ground(&self, word: &str, category: Option<LexicalCategory>) -> Vec<Grounding> {
        let mut out: Vec<Grounding> = self
            .objects
            .keys()
            .map(|object| Grounding {
                object: object.clone(),
                probability: self.resolve(word, category, object),
            })
            .filter(|g| g.probability > 0.0)
            .collect();
        // Stable sort keeps name order among ties.
        out.sort_by(|a, b| b.probability.total_cmp(&a.probability));
        out
    }

    fn candidate_types(&self, norm: &str, category: Option<LexicalCategory>) -> BTreeSet<&str> {
        let categories = match category {
            Some(c) => vec![c],
            None => LexicalCategory::ALL.to_vec(),
        };
        let mut out: BTreeSet<&str> = categories
            .into_iter()
            .filter_map(|c| self.baserefs.get(&c).and_then(|words| words.get(norm)))
            .flatten()
            .map(String::as_str)
            .collect();
        if matches!(category, None | Some(LexicalCategory::Nouns)) {
            out.extend(
                self.types
                    .keys()
                    .filter(|name| normalize(name) == norm)
                    .map(String::as_str),
            );
        }
        out
    }
}
