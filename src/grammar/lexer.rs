//! Lexer: grammar definition source → token stream.
//!
//! Tokens are matched with a single anchored-by-contiguity regex. Control
//! symbols win over names, names over numbers, and every match must start
//! exactly where the previous one ended: any gap (or leftover text after the
//! last match) is malformed input.
//!
//! Comments run from `#` to the end of the line and never produce a token.

use std::sync::LazyLock;

use regex::{CaptureMatches, Captures, Regex};

use super::error::{GrammarError, GrammarResult};

/// Byte-level source span for error reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// A single grammar token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    Comma,
    Lambda,
    Dot,
    /// `:=`
    Define,
    LParen,
    RParen,
    LBrack,
    RBrack,
    /// `Λ`
    And,
    Colon,
    /// `\`
    Backslash,
    Slash,
    /// An identifier: word, type name, predicate name or variable.
    Name(String),
    /// A weight literal: `0`, `1`, or either followed by fractional digits.
    Number(f64),
}

impl Token {
    /// Whether this is one of the reserved punctuation tokens.
    ///
    /// The parser uses this as its lookahead guard: reductions that could
    /// still be extended are postponed while a control token follows.
    pub fn is_control(&self) -> bool {
        !matches!(self, Token::Name(_) | Token::Number(_))
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Comma => write!(f, ","),
            Token::Lambda => write!(f, "λ"),
            Token::Dot => write!(f, "."),
            Token::Define => write!(f, ":="),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::LBrack => write!(f, "["),
            Token::RBrack => write!(f, "]"),
            Token::And => write!(f, "Λ"),
            Token::Colon => write!(f, ":"),
            Token::Backslash => write!(f, "\\"),
            Token::Slash => write!(f, "/"),
            Token::Name(name) => write!(f, "{name}"),
            Token::Number(value) => write!(f, "{value}"),
        }
    }
}

/// A token together with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    pub token: Token,
    pub span: Span,
}

// Alternation order is the priority order: leftmost alternative wins.
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"\s*(?:",
        r"(?P<comment>#[^\n]*(?:\n|$))",
        r"|(?P<Comma>,)|(?P<Lambda>λ)|(?P<Dot>\.)|(?P<Define>:=)",
        r"|(?P<LParen>\()|(?P<RParen>\))|(?P<LBrack>\[)|(?P<RBrack>\])",
        r"|(?P<And>Λ)|(?P<Colon>:)|(?P<Backslash>\\)|(?P<Slash>/)",
        r"|(?P<name>[^0-9/\\\s().\[\]:=,λΛ#]+)",
        r"|(?P<number>[01](?:\.[0-9]*)?)",
        r")\s*",
    ))
    .expect("grammar token pattern is valid")
});

const CONTROL_GROUPS: [(&str, Token); 12] = [
    ("Comma", Token::Comma),
    ("Lambda", Token::Lambda),
    ("Dot", Token::Dot),
    ("Define", Token::Define),
    ("LParen", Token::LParen),
    ("RParen", Token::RParen),
    ("LBrack", Token::LBrack),
    ("RBrack", Token::RBrack),
    ("And", Token::And),
    ("Colon", Token::Colon),
    ("Backslash", Token::Backslash),
    ("Slash", Token::Slash),
];

/// Lazy, single-pass token stream over a grammar source.
///
/// Yields `Err` at most once; the stream is finished afterwards.
pub struct GrammarLexer<'a> {
    source: &'a str,
    matches: CaptureMatches<'static, 'a>,
    last_end: usize,
    finished: bool,
}

impl<'a> GrammarLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            matches: TOKEN_RE.captures_iter(source),
            last_end: 0,
            finished: false,
        }
    }

    /// Byte offset just past the last consumed match.
    pub fn offset(&self) -> usize {
        self.last_end
    }

    fn malformed(&mut self, start: usize) -> GrammarError {
        self.finished = true;
        GrammarError::Lex {
            offset: start,
            fragment: fragment_at(self.source, start),
        }
    }
}

impl Iterator for GrammarLexer<'_> {
    type Item = GrammarResult<Lexeme>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        loop {
            let Some(caps) = self.matches.next() else {
                self.finished = true;
                if !self.source[self.last_end..].trim().is_empty() {
                    return Some(Err(self.malformed(self.last_end)));
                }
                return None;
            };
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() != self.last_end {
                return Some(Err(self.malformed(self.last_end)));
            }
            self.last_end = whole.end();
            if let Some(lexeme) = classify(&caps) {
                return Some(Ok(lexeme));
            }
        }
    }
}

/// Tokenize a grammar source lazily.
pub fn lex(source: &str) -> GrammarLexer<'_> {
    GrammarLexer::new(source)
}

/// Tokenize a whole grammar source eagerly.
pub fn tokenize(source: &str) -> GrammarResult<Vec<Lexeme>> {
    lex(source).collect()
}

fn classify(caps: &Captures<'_>) -> Option<Lexeme> {
    if caps.name("comment").is_some() {
        return None;
    }
    for (group, token) in &CONTROL_GROUPS {
        if let Some(m) = caps.name(group) {
            return Some(Lexeme {
                token: token.clone(),
                span: Span {
                    start: m.start(),
                    end: m.end(),
                },
            });
        }
    }
    if let Some(m) = caps.name("name") {
        return Some(Lexeme {
            token: Token::Name(m.as_str().to_string()),
            span: Span {
                start: m.start(),
                end: m.end(),
            },
        });
    }
    let m = caps.name("number")?;
    let value = m.as_str().parse::<f64>().ok()?;
    Some(Lexeme {
        token: Token::Number(value),
        span: Span {
            start: m.start(),
            end: m.end(),
        },
    })
}

/// A short excerpt of `source` starting at `start`, for error messages.
pub(crate) fn fragment_at(source: &str, start: usize) -> String {
    source[start..].trim_start().chars().take(24).collect()
}
