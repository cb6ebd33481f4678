//! Categorial types and the application rules that combine them.
//!
//! A [`Cat`] is either an atomic category (`N`, `S`, ...) or a slash
//! category that still needs one argument on a given side. Only the two
//! application rules exist: forward (`X/Y  Y → X`) and backward
//! (`Y  X\Y → X`).

use serde::{Deserialize, Serialize};

use super::abs::Term;

/// Which side a slash category expects its missing argument on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// `X\Y`: the argument appears to the left.
    Left,
    /// `X/Y`: the argument appears to the right.
    Right,
}

impl Direction {
    pub fn symbol(self) -> char {
        match self {
            Direction::Left => '\\',
            Direction::Right => '/',
        }
    }
}

/// Grammatical category of a lexical entry or chart derivation.
///
/// Equality is structural, so `(S\N)/N` equals any other `(S\N)/N`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cat {
    Atom(String),
    Missing {
        direction: Direction,
        result: Box<Cat>,
        argument: Box<Cat>,
    },
}

impl Cat {
    pub fn atom(name: impl Into<String>) -> Self {
        Cat::Atom(name.into())
    }

    /// `result\argument`
    pub fn left(result: Cat, argument: Cat) -> Self {
        Cat::Missing {
            direction: Direction::Left,
            result: Box::new(result),
            argument: Box::new(argument),
        }
    }

    /// `result/argument`
    pub fn right(result: Cat, argument: Cat) -> Self {
        Cat::Missing {
            direction: Direction::Right,
            result: Box::new(result),
            argument: Box::new(argument),
        }
    }

    pub fn is_atom(&self) -> bool {
        matches!(self, Cat::Atom(_))
    }

    /// Whether this is the atomic category `name`.
    pub fn is_atom_named(&self, name: &str) -> bool {
        matches!(self, Cat::Atom(n) if n == name)
    }

    /// If this category still wants an argument on `direction`, return
    /// `(result, argument)`.
    fn wants(&self, direction: Direction) -> Option<(&Cat, &Cat)> {
        match self {
            Cat::Missing {
                direction: d,
                result,
                argument,
            } if *d == direction => Some((result, argument)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Cat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cat::Atom(name) => write!(f, "{name}"),
            Cat::Missing {
                direction,
                result,
                argument,
            } => {
                if result.is_atom() {
                    write!(f, "{result}")?;
                } else {
                    write!(f, "({result})")?;
                }
                write!(f, "{}", direction.symbol())?;
                if argument.is_atom() {
                    write!(f, "{argument}")
                } else {
                    write!(f, "({argument})")
                }
            }
        }
    }
}

/// A scored partial parse: category, logical form and probability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Derivation {
    pub cat: Cat,
    pub term: Term,
    pub probability: f64,
}

impl Derivation {
    pub fn new(cat: Cat, term: Term, probability: f64) -> Self {
        Self {
            cat,
            term,
            probability,
        }
    }
}

impl std::fmt::Display for Derivation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} : {} ({:.4})", self.cat, self.term, self.probability)
    }
}

/// Combine two adjacent derivations by forward or backward application.
///
/// Returns `None` when neither side is looking for the other's category.
/// That is the common case while filling a chart and is not an error.
pub fn combine(left: &Derivation, right: &Derivation) -> Option<Derivation> {
    let probability = left.probability * right.probability;
    if let Some((result, argument)) = left.cat.wants(Direction::Right) {
        if *argument == right.cat {
            return Some(Derivation::new(
                result.clone(),
                left.term.apply(&right.term),
                probability,
            ));
        }
    }
    if let Some((result, argument)) = right.cat.wants(Direction::Left) {
        if *argument == left.cat {
            return Some(Derivation::new(
                result.clone(),
                right.term.apply(&left.term),
                probability,
            ));
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n() -> Cat {
        Cat::atom("N")
    }

    fn s() -> Cat {
        Cat::atom("S")
    }

    #[test]
    fn structural_equality() {
        let a = Cat::right(Cat::left(s(), n()), n());
        let b = Cat::right(Cat::left(s(), n()), n());
        assert_eq!(a, b);
        assert_ne!(a, Cat::right(Cat::right(s(), n()), n()));
    }

    #[test]
    fn display_parenthesizes_complex_parts() {
        assert_eq!(Cat::right(Cat::left(s(), n()), n()).to_string(), r"(S\N)/N");
        assert_eq!(Cat::left(s(), Cat::right(n(), n())).to_string(), r"S\(N/N)");
        assert_eq!(n().to_string(), "N");
    }

    #[test]
    fn forward_application() {
        let f = Derivation::new(
            Cat::right(s(), n()),
            Term::abstraction("x", Term::predicate("barks", vec![Term::var("x")])),
            0.5,
        );
        let a = Derivation::new(n(), Term::var("dog"), 0.4);
        let out = combine(&f, &a).unwrap();
        assert_eq!(out.cat, s());
        assert_eq!(out.term.to_string(), "barks(dog)");
        assert!((out.probability - 0.2).abs() < 1e-12);
    }

    #[test]
    fn backward_application() {
        let a = Derivation::new(n(), Term::var("dog"), 0.5);
        let f = Derivation::new(
            Cat::left(s(), n()),
            Term::abstraction("x", Term::predicate("barks", vec![Term::var("x")])),
            0.5,
        );
        let out = combine(&a, &f).unwrap();
        assert_eq!(out.cat, s());
        assert_eq!(out.term.to_string(), "barks(dog)");
        assert!((out.probability - 0.25).abs() < 1e-12);
    }

    #[test]
    fn mismatched_argument_does_not_combine() {
        let f = Derivation::new(Cat::right(s(), n()), Term::var("f"), 1.0);
        let a = Derivation::new(s(), Term::var("x"), 1.0);
        assert!(combine(&f, &a).is_none());
    }

    #[test]
    fn wrong_side_does_not_combine() {
        // X\Y on the left and Y on the right is not an application.
        let f = Derivation::new(Cat::left(s(), n()), Term::var("f"), 1.0);
        let a = Derivation::new(n(), Term::var("x"), 1.0);
        assert!(combine(&f, &a).is_none());
        assert!(combine(&a, &Derivation::new(n(), Term::var("y"), 1.0)).is_none());
    }
}
