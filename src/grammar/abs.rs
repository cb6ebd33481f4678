//! Logical-form terms produced by the grammar.
//!
//! Every lexical entry carries a [`Term`]; chart derivations build larger
//! terms by applying one to another. Substitution is a plain name
//! replacement with shadowing. There is no alpha-renaming, so an abstraction
//! nested inside another one that reuses the same variable name hides the
//! outer binding from the substitution instead of being renamed.

use serde::{Deserialize, Serialize};

/// A logical-form term.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Term {
    /// A bare name. Acts as a variable reference during substitution; names
    /// that are never substituted end up as constants in the final form.
    Var(String),
    /// `name(arg, ...)`. An argumentless predicate is an opaque constant.
    Predicate { name: String, args: Vec<Term> },
    /// `λvar.body`
    Abstraction { var: String, body: Box<Term> },
    /// `lhs Λ rhs`
    Conjunction(Box<Term>, Box<Term>),
}

impl Term {
    pub fn var(name: impl Into<String>) -> Self {
        Term::Var(name.into())
    }

    pub fn predicate(name: impl Into<String>, args: Vec<Term>) -> Self {
        Term::Predicate {
            name: name.into(),
            args,
        }
    }

    pub fn abstraction(var: impl Into<String>, body: Term) -> Self {
        Term::Abstraction {
            var: var.into(),
            body: Box::new(body),
        }
    }

    pub fn conjunction(lhs: Term, rhs: Term) -> Self {
        Term::Conjunction(Box::new(lhs), Box::new(rhs))
    }

    /// Apply this term to `argument`: one step of curried substitution.
    ///
    /// For an abstraction this strips the outermost `λ` and replaces its
    /// variable in the body. Any other term is returned structurally
    /// unchanged, since no target variable is named.
    pub fn apply(&self, argument: &Term) -> Term {
        self.substitute(argument, None)
    }

    /// Replace occurrences of `target` with `argument`.
    ///
    /// With `target == None` an abstraction substitutes for its own bound
    /// variable and is removed; see [`Term::apply`].
    pub fn substitute(&self, argument: &Term, target: Option<&str>) -> Term {
        match self {
            Term::Var(name) => {
                if target == Some(name.as_str()) {
                    argument.clone()
                } else {
                    self.clone()
                }
            }
            Term::Predicate { name, args } => {
                if args.is_empty() {
                    return self.clone();
                }
                Term::Predicate {
                    name: name.clone(),
                    args: args
                        .iter()
                        .map(|a| a.substitute(argument, target))
                        .collect(),
                }
            }
            Term::Abstraction { var, body } => match target {
                Some(t) if t == var => self.clone(),
                None => body.substitute(argument, Some(var)),
                Some(_) => Term::Abstraction {
                    var: var.clone(),
                    body: Box::new(body.substitute(argument, target)),
                },
            },
            Term::Conjunction(lhs, rhs) => Term::conjunction(
                lhs.substitute(argument, target),
                rhs.substitute(argument, target),
            ),
        }
    }

    /// Content names at the leaves of this term, in first-seen order.
    ///
    /// Collects argumentless predicates and names not bound by an
    /// enclosing abstraction. These are the words a parse is "about".
    pub fn leaf_names(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut bound = Vec::new();
        self.collect_leaves(&mut bound, &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, bound: &mut Vec<&'a str>, out: &mut Vec<String>) {
        match self {
            Term::Var(name) => {
                if !bound.contains(&name.as_str()) && !out.contains(name) {
                    out.push(name.clone());
                }
            }
            Term::Predicate { name, args } => {
                if args.is_empty() {
                    if !out.contains(name) {
                        out.push(name.clone());
                    }
                } else {
                    for arg in args {
                        arg.collect_leaves(bound, out);
                    }
                }
            }
            Term::Abstraction { var, body } => {
                bound.push(var);
                body.collect_leaves(bound, out);
                bound.pop();
            }
            Term::Conjunction(lhs, rhs) => {
                lhs.collect_leaves(bound, out);
                rhs.collect_leaves(bound, out);
            }
        }
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Term::Var(name) => write!(f, "{name}"),
            Term::Predicate { name, args } => {
                write!(f, "{name}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{arg}")?;
                }
                write!(f, ")")
            }
            Term::Abstraction { var, body } => write!(f, "λ{var}.{body}"),
            Term::Conjunction(lhs, rhs) => write!(f, "{lhs} Λ {rhs}"),
        }
    }
}
