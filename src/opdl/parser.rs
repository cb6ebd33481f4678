//! Shift-reduce parser: OPDL tokens → s-expressions.
//!
//! Lists are assembled right to left. A `)` opens an empty partial list and
//! every finished expression below it is folded in, so by the time the
//! matching `(` is reached the positional arguments are reversed and get
//! flipped once. Keyword arguments are attached as `(keyword, value)` pairs
//! and must be folded in before any positional argument, which is how
//! "keywords come last" falls out of the right-to-left order.

use std::collections::BTreeMap;

use serde::Serialize;

use super::error::{OpdlError, OpdlResult};
use super::lexer::{self, OpdlLexer, OpdlToken};
use crate::grammar::lexer::Span;

/// One OPDL expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Expr {
    Symbol(String),
    Str(String),
    List(SExpr),
}

impl Expr {
    /// Symbol or string contents; `None` for lists.
    pub fn as_atom(&self) -> Option<&str> {
        match self {
            Expr::Symbol(s) | Expr::Str(s) => Some(s),
            Expr::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&SExpr> {
        match self {
            Expr::List(list) => Some(list),
            _ => None,
        }
    }
}

/// A parenthesized list: positional arguments followed by keywords.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SExpr {
    pub args: Vec<Expr>,
    pub kwargs: BTreeMap<String, Expr>,
}

impl SExpr {
    /// The leading symbol, e.g. `type` in `(type Dog)`.
    pub fn head(&self) -> Option<&str> {
        match self.args.first() {
            Some(Expr::Symbol(s)) => Some(s),
            _ => None,
        }
    }

    pub fn keyword(&self, name: &str) -> Option<&Expr> {
        self.kwargs.get(name)
    }
}

impl std::fmt::Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Symbol(s) => write!(f, "{s}"),
            Expr::Str(s) => write!(f, "{s:?}"),
            Expr::List(list) => write!(f, "{list}"),
        }
    }
}

impl std::fmt::Display for SExpr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(")?;
        let mut first = true;
        for arg in &self.args {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, "{arg}")?;
        }
        for (name, value) in &self.kwargs {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            write!(f, ":{name} {value}")?;
        }
        write!(f, ")")
    }
}

#[derive(Debug)]
enum Sym {
    Open,
    Keyword(String),
    Done(Expr),
    KeywordArg(String, Expr),
    /// List under construction; positional args are reversed.
    Partial(SExpr),
}

type Rule<'a> = fn(&mut OpdlParser<'a>) -> OpdlResult<bool>;

/// Streaming parser yielding one top-level s-expression at a time.
pub struct OpdlParser<'a> {
    tokens: OpdlLexer<'a>,
    stack: Vec<Sym>,
    finished: bool,
}

impl<'a> OpdlParser<'a> {
    const RULES: [(&'static str, Rule<'a>); 5] = [
        ("keyword-arg", Self::keyword_arg),
        ("dangling-keyword", Self::dangling_keyword),
        ("fold-keyword", Self::fold_keyword),
        ("fold-arg", Self::fold_arg),
        ("close-list", Self::close_list),
    ];

    pub fn new(source: &'a str) -> Self {
        Self {
            tokens: lexer::lex(source),
            stack: Vec::new(),
            finished: false,
        }
    }

    fn run(&mut self) -> OpdlResult<Option<SExpr>> {
        loop {
            let Some(next) = self.tokens.next() else {
                if self.stack.is_empty() {
                    return Ok(None);
                }
                return Err(OpdlError::Incomplete {
                    depth: self.stack.len(),
                });
            };
            let (token, _span): (OpdlToken, Span) = next?;
            self.stack.push(match token {
                OpdlToken::LParen => Sym::Open,
                OpdlToken::RParen => Sym::Partial(SExpr::default()),
                OpdlToken::Keyword(name) => Sym::Keyword(name),
                OpdlToken::Symbol(s) => Sym::Done(Expr::Symbol(s)),
                OpdlToken::Str(s) => Sym::Done(Expr::Str(s)),
            });
            self.reduce()?;
            if let [Sym::Done(Expr::List(_))] = self.stack.as_slice() {
                if let Some(Sym::Done(Expr::List(list))) = self.stack.pop() {
                    return Ok(Some(list));
                }
            }
        }
    }

    fn reduce(&mut self) -> OpdlResult<()> {
        'scan: loop {
            for (name, rule) in Self::RULES {
                if rule(self)? {
                    tracing::trace!(rule = name, depth = self.stack.len(), "opdl rule fired");
                    continue 'scan;
                }
            }
            return Ok(());
        }
    }

    fn take<const N: usize>(&mut self) -> Option<[Sym; N]> {
        if self.stack.len() < N {
            return None;
        }
        let tail = self.stack.split_off(self.stack.len() - N);
        tail.try_into().ok()
    }

    fn restore<const N: usize>(&mut self, tail: [Sym; N]) -> bool {
        self.stack.extend(tail);
        false
    }

    fn reduced(&mut self, sym: Sym) -> bool {
        self.stack.push(sym);
        true
    }

    fn keyword_arg(&mut self) -> OpdlResult<bool> {
        Ok(match self.take::<2>() {
            Some([Sym::Keyword(name), Sym::Done(value)]) => {
                self.reduced(Sym::KeywordArg(name, value))
            }
            Some(tail) => self.restore(tail),
            None => false,
        })
    }

    fn dangling_keyword(&mut self) -> OpdlResult<bool> {
        match self.stack.as_slice() {
            [.., Sym::Keyword(name), Sym::Partial(_)] => Err(OpdlError::KeywordWithoutValue {
                name: name.clone(),
            }),
            _ => Ok(false),
        }
    }

    fn fold_keyword(&mut self) -> OpdlResult<bool> {
        match self.take::<2>() {
            Some([Sym::KeywordArg(name, value), Sym::Partial(mut list)]) => {
                if !list.args.is_empty() {
                    return Err(OpdlError::KeywordPlacement { name });
                }
                if list.kwargs.contains_key(&name) {
                    return Err(OpdlError::DuplicateKeyword { name });
                }
                list.kwargs.insert(name, value);
                Ok(self.reduced(Sym::Partial(list)))
            }
            Some(tail) => Ok(self.restore(tail)),
            None => Ok(false),
        }
    }

    fn fold_arg(&mut self) -> OpdlResult<bool> {
        Ok(match self.take::<2>() {
            Some([Sym::Done(arg), Sym::Partial(mut list)]) => {
                list.args.push(arg);
                self.reduced(Sym::Partial(list))
            }
            Some(tail) => self.restore(tail),
            None => false,
        })
    }

    fn close_list(&mut self) -> OpdlResult<bool> {
        Ok(match self.take::<2>() {
            Some([Sym::Open, Sym::Partial(mut list)]) => {
                list.args.reverse();
                self.reduced(Sym::Done(Expr::List(list)))
            }
            Some(tail) => self.restore(tail),
            None => false,
        })
    }
}

impl Iterator for OpdlParser<'_> {
    type Item = OpdlResult<SExpr>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let result = self.run().transpose();
        if !matches!(result, Some(Ok(_))) {
            self.finished = true;
        }
        result
    }
}

/// Parse every top-level expression in `source`. All-or-nothing.
pub fn parse(source: &str) -> OpdlResult<Vec<SExpr>> {
    OpdlParser::new(source).collect()
}
