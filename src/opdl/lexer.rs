//! OPDL lexer: parentheses, strings, keywords and symbols.
//!
//! Same contiguity contract as the grammar lexer: every match has to start
//! where the previous one ended. `;` starts a comment running to the end of
//! the line.

use std::sync::LazyLock;

use regex::{CaptureMatches, Captures, Regex};

use crate::grammar::lexer::{Span, fragment_at};

use super::error::{OpdlError, OpdlResult};

/// A single OPDL token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpdlToken {
    LParen,
    RParen,
    /// `:name`, stored without the colon.
    Keyword(String),
    Symbol(String),
    /// A double-quoted string with escapes resolved.
    Str(String),
}

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?s)\s*(?:"#,
        r#"(?P<lparen>\()|(?P<rparen>\))"#,
        r#"|(?P<comment>;[^\n]*(?:\n|$))"#,
        r#"|(?P<string>"(?:\\.|[^\\"])*")"#,
        r#"|(?P<keyword>:[^()"'\s;]+)"#,
        r#"|(?P<symbol>[^()"'\s;]+)"#,
        r#")\s*"#,
    ))
    .expect("OPDL token pattern is valid")
});

/// Lazy, single-pass token stream over OPDL source.
pub struct OpdlLexer<'a> {
    source: &'a str,
    matches: CaptureMatches<'static, 'a>,
    last_end: usize,
    finished: bool,
}

impl<'a> OpdlLexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            matches: TOKEN_RE.captures_iter(source),
            last_end: 0,
            finished: false,
        }
    }

    fn malformed(&mut self, start: usize) -> OpdlError {
        self.finished = true;
        OpdlError::Lex {
            offset: start,
            fragment: fragment_at(self.source, start),
        }
    }
}

impl Iterator for OpdlLexer<'_> {
    type Item = OpdlResult<(OpdlToken, Span)>;

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
            if let Some(token) = classify(&caps) {
                return Some(Ok(token));
            }
        }
    }
}

/// Tokenize OPDL source lazily.
pub fn lex(source: &str) -> OpdlLexer<'_> {
    OpdlLexer::new(source)
}

fn classify(caps: &Captures<'_>) -> Option<(OpdlToken, Span)> {
    let span = |m: regex::Match<'_>| Span {
        start: m.start(),
        end: m.end(),
    };
    if let Some(m) = caps.name("lparen") {
        return Some((OpdlToken::LParen, span(m)));
    }
    if let Some(m) = caps.name("rparen") {
        return Some((OpdlToken::RParen, span(m)));
    }
    if let Some(m) = caps.name("string") {
        let raw = m.as_str();
        return Some((OpdlToken::Str(unescape(&raw[1..raw.len() - 1])), span(m)));
    }
    if let Some(m) = caps.name("keyword") {
        return Some((OpdlToken::Keyword(m.as_str()[1..].to_string()), span(m)));
    }
    caps.name("symbol")
        .map(|m| (OpdlToken::Symbol(m.as_str().to_string()), span(m)))
}

fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
