//! Shift-reduce parser: grammar tokens → lexical entries.
//!
//! The parser keeps an explicit stack of [`Sym`]s and one token of
//! lookahead. On every step it walks a fixed table of reduction rules in
//! priority order; the first rule whose pattern matches the top of the stack
//! fires. When none does, the lookahead is shifted. There is no automaton
//! table: state is whatever the top of the stack looks like, plus a single
//! "type context" flag that decides whether a bare name is a category or a
//! production.
//!
//! The parser is an iterator. Each completed definition is yielded as soon
//! as it is reduced, so one source may hold any number of definitions
//! separated only by whitespace.

use super::abs::Term;
use super::cat::Cat;
use super::error::{GrammarError, GrammarResult};
use super::lexer::{self, Lexeme, Token};
use super::lexicon::{DEFAULT_WEIGHT, LexicalEntry, SenseWeights};

/// A symbol on the parse stack.
#[derive(Debug, Clone, PartialEq)]
enum Sym {
    /// A control token, shifted as-is.
    Tok(Token),
    Name(String),
    Number(f64),
    Type(Cat),
    Term(Term),
    /// A finished `[...]` weight table (the `[` stays on the stack).
    Table(SenseWeights),
    /// Predicate arguments collected right to left, closed by `)`.
    Partial(Vec<Term>),
}

impl Sym {
    /// Names double as productions (variable references).
    fn is_production(&self) -> bool {
        matches!(self, Sym::Name(_) | Sym::Term(_))
    }

    fn into_term(self) -> GrammarResult<Term> {
        match self {
            Sym::Name(name) => Ok(Term::Var(name)),
            Sym::Term(term) => Ok(term),
            other => Err(GrammarError::construction(format!(
                "expected a production, found {other}"
            ))),
        }
    }
}

impl From<Token> for Sym {
    fn from(token: Token) -> Self {
        match token {
            Token::Name(name) => Sym::Name(name),
            Token::Number(value) => Sym::Number(value),
            other => Sym::Tok(other),
        }
    }
}

impl std::fmt::Display for Sym {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Sym::Tok(token) => write!(f, "`{token}`"),
            Sym::Name(name) => write!(f, "name `{name}`"),
            Sym::Number(value) => write!(f, "number {value}"),
            Sym::Type(cat) => write!(f, "type `{cat}`"),
            Sym::Term(term) => write!(f, "production `{term}`"),
            Sym::Table(weights) => write!(f, "weights {weights}"),
            Sym::Partial(args) => write!(f, "partial argument list ({} args)", args.len()),
        }
    }
}

/// Outcome of one rule or shift.
enum Step {
    NoMatch,
    Continue,
    Emit(LexicalEntry),
    Exhausted,
}

type Rule<I> = fn(&mut GrammarParser<I>) -> GrammarResult<Step>;

/// Streaming parser over a grammar token stream.
pub struct GrammarParser<I> {
    tokens: I,
    stack: Vec<Sym>,
    lookahead: Option<Lexeme>,
    primed: bool,
    type_ctx: bool,
    default_weight: f64,
    offset: usize,
    finished: bool,
}

impl<'a> GrammarParser<lexer::GrammarLexer<'a>> {
    /// Parser over a grammar source.
    pub fn from_source(source: &'a str) -> Self {
        Self::new(lexer::lex(source))
    }
}

impl<I> GrammarParser<I>
where
    I: Iterator<Item = GrammarResult<Lexeme>>,
{
    /// Reduction rules, highest priority first.
    const RULES: [(&'static str, Rule<I>); 17] = [
        ("enter-type-context", Self::enter_type_context),
        ("leave-type-context", Self::leave_type_context),
        ("open-weights", Self::open_weights),
        ("atomic-type", Self::atomic_type),
        ("group-type", Self::group_type),
        ("slash-type", Self::slash_type),
        ("seed-weights", Self::seed_weights),
        ("default-weight", Self::default_only),
        ("add-weight", Self::add_weight),
        ("abstraction", Self::abstraction),
        ("conjunction", Self::conjunction),
        ("close-args", Self::close_args),
        ("push-arg", Self::push_arg),
        ("push-arg-comma", Self::push_arg_comma),
        ("predicate", Self::predicate),
        ("weighted-entry", Self::weighted_entry),
        ("entry", Self::entry),
    ];

    pub fn new(tokens: I) -> Self {
        Self {
            tokens,
            stack: Vec::new(),
            lookahead: None,
            primed: false,
            type_ctx: false,
            default_weight: DEFAULT_WEIGHT,
            offset: 0,
            finished: false,
        }
    }

    /// Default weight for tables that only list senses, and for entries
    /// without a table.
    pub fn with_default_weight(mut self, weight: f64) -> GrammarResult<Self> {
        SenseWeights::new(weight)?;
        self.default_weight = weight;
        Ok(self)
    }

    fn run(&mut self) -> GrammarResult<Option<LexicalEntry>> {
        if !self.primed {
            self.primed = true;
            self.advance()?;
        }
        loop {
            match self.step()? {
                Step::Emit(entry) => return Ok(Some(entry)),
                Step::Continue | Step::NoMatch => {}
                Step::Exhausted => {
                    if self.stack.is_empty() {
                        return Ok(None);
                    }
                    return Err(GrammarError::Incomplete {
                        depth: self.stack.len(),
                        offset: self.offset,
                    });
                }
            }
        }
    }

    fn step(&mut self) -> GrammarResult<Step> {
        for (name, rule) in Self::RULES {
            let step = rule(self)?;
            if !matches!(step, Step::NoMatch) {
                tracing::trace!(rule = name, depth = self.stack.len(), "grammar rule fired");
                return Ok(step);
            }
        }
        self.shift()
    }

    fn advance(&mut self) -> GrammarResult<()> {
        self.lookahead = self.tokens.next().transpose()?;
        Ok(())
    }

    fn shift(&mut self) -> GrammarResult<Step> {
        let Some(lexeme) = self.lookahead.take() else {
            return Ok(Step::Exhausted);
        };
        self.offset = lexeme.span.end;
        self.stack.push(Sym::from(lexeme.token));
        self.advance()?;
        Ok(Step::Continue)
    }

    fn lookahead_is_control(&self) -> bool {
        self.lookahead
            .as_ref()
            .is_some_and(|l| l.token.is_control())
    }

    fn top_is(&self, token: &Token) -> bool {
        matches!(self.stack.last(), Some(Sym::Tok(t)) if t == token)
    }

    /// Detach the top `N` symbols. Callers push them back on a mismatch.
    fn take<const N: usize>(&mut self) -> Option<[Sym; N]> {
        if self.stack.len() < N {
            return None;
        }
        let tail = self.stack.split_off(self.stack.len() - N);
        tail.try_into().ok()
    }

    fn restore<const N: usize>(&mut self, tail: [Sym; N]) -> Step {
        self.stack.extend(tail);
        Step::NoMatch
    }

    fn reduced(&mut self, sym: Sym) -> Step {
        self.stack.push(sym);
        Step::Continue
    }

    // ── Rules ───────────────────────────────────────────────────────────

    fn enter_type_context(&mut self) -> GrammarResult<Step> {
        if !self.top_is(&Token::Define) {
            return Ok(Step::NoMatch);
        }
        self.type_ctx = true;
        self.shift()
    }

    fn leave_type_context(&mut self) -> GrammarResult<Step> {
        if !self.top_is(&Token::Colon) {
            return Ok(Step::NoMatch);
        }
        self.type_ctx = false;
        self.shift()
    }

    fn open_weights(&mut self) -> GrammarResult<Step> {
        if !self.top_is(&Token::LBrack) {
            return Ok(Step::NoMatch);
        }
        self.type_ctx = false;
        self.shift()
    }

    fn atomic_type(&mut self) -> GrammarResult<Step> {
        if !self.type_ctx {
            return Ok(Step::NoMatch);
        }
        Ok(match self.take::<1>() {
            Some([Sym::Name(name)]) => self.reduced(Sym::Type(Cat::Atom(name))),
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    fn group_type(&mut self) -> GrammarResult<Step> {
        Ok(match self.take::<3>() {
            Some([Sym::Tok(Token::LParen), Sym::Type(cat), Sym::Tok(Token::RParen)]) => {
                self.reduced(Sym::Type(cat))
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    fn slash_type(&mut self) -> GrammarResult<Step> {
        Ok(match self.take::<3>() {
            Some([Sym::Type(result), Sym::Tok(Token::Backslash), Sym::Type(argument)]) => {
                self.reduced(Sym::Type(Cat::left(result, argument)))
            }
            Some([Sym::Type(result), Sym::Tok(Token::Slash), Sym::Type(argument)]) => {
                self.reduced(Sym::Type(Cat::right(result, argument)))
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    /// `sense w ]` starts a table holding one sense and the default weight.
    fn seed_weights(&mut self) -> GrammarResult<Step> {
        Ok(match self.take::<3>() {
            Some([Sym::Name(sense), Sym::Number(weight), Sym::Tok(Token::RBrack)]) => {
                let mut weights = SenseWeights::new(self.default_weight)?;
                weights.insert(sense, weight)?;
                self.reduced(Sym::Table(weights))
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    /// `d ]` starts an empty table with default `d`.
    fn default_only(&mut self) -> GrammarResult<Step> {
        Ok(match self.take::<2>() {
            Some([Sym::Number(default), Sym::Tok(Token::RBrack)]) => {
                self.reduced(Sym::Table(SenseWeights::new(default)?))
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    /// `sense w , table` folds one more sense into the table.
    fn add_weight(&mut self) -> GrammarResult<Step> {
        Ok(match self.take::<4>() {
            Some([
                Sym::Name(sense),
                Sym::Number(weight),
                Sym::Tok(Token::Comma),
                Sym::Table(mut weights),
            ]) => {
                weights.insert(sense, weight)?;
                self.reduced(Sym::Table(weights))
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    fn abstraction(&mut self) -> GrammarResult<Step> {
        if self.lookahead_is_control() {
            return Ok(Step::NoMatch);
        }
        Ok(match self.take::<4>() {
            Some([Sym::Tok(Token::Lambda), Sym::Name(var), Sym::Tok(Token::Dot), body])
                if body.is_production() =>
            {
                let body = body.into_term()?;
                self.reduced(Sym::Term(Term::abstraction(var, body)))
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    fn conjunction(&mut self) -> GrammarResult<Step> {
        if self.lookahead_is_control() {
            return Ok(Step::NoMatch);
        }
        Ok(match self.take::<3>() {
            Some([lhs, Sym::Tok(Token::And), rhs])
                if lhs.is_production() && rhs.is_production() =>
            {
                let term = Term::conjunction(lhs.into_term()?, rhs.into_term()?);
                self.reduced(Sym::Term(term))
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    fn close_args(&mut self) -> GrammarResult<Step> {
        if self.type_ctx || !self.top_is(&Token::RParen) {
            return Ok(Step::NoMatch);
        }
        self.stack.pop();
        Ok(self.reduced(Sym::Partial(Vec::new())))
    }

    fn push_arg(&mut self) -> GrammarResult<Step> {
        Ok(match self.take::<2>() {
            Some([arg, Sym::Partial(mut args)]) if arg.is_production() => {
                args.push(arg.into_term()?);
                self.reduced(Sym::Partial(args))
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    fn push_arg_comma(&mut self) -> GrammarResult<Step> {
        Ok(match self.take::<3>() {
            Some([arg, Sym::Tok(Token::Comma), Sym::Partial(mut args)])
                if arg.is_production() =>
            {
                args.push(arg.into_term()?);
                self.reduced(Sym::Partial(args))
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    fn predicate(&mut self) -> GrammarResult<Step> {
        Ok(match self.take::<3>() {
            Some([Sym::Name(name), Sym::Tok(Token::LParen), Sym::Partial(mut args)]) => {
                args.reverse();
                self.reduced(Sym::Term(Term::predicate(name, args)))
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    fn weighted_entry(&mut self) -> GrammarResult<Step> {
        if self.lookahead_is_control() {
            return Ok(Step::NoMatch);
        }
        Ok(match self.take::<7>() {
            Some([
                Sym::Name(word),
                Sym::Tok(Token::Define),
                Sym::Type(cat),
                Sym::Tok(Token::LBrack),
                Sym::Table(weights),
                Sym::Tok(Token::Colon),
                production,
            ]) if production.is_production() => {
                let entry = LexicalEntry::new(word, cat, production.into_term()?, weights)?;
                tracing::debug!(%entry, "lexical entry");
                Step::Emit(entry)
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }

    fn entry(&mut self) -> GrammarResult<Step> {
        if self.lookahead_is_control() {
            return Ok(Step::NoMatch);
        }
        Ok(match self.take::<5>() {
            Some([
                Sym::Name(word),
                Sym::Tok(Token::Define),
                Sym::Type(cat),
                Sym::Tok(Token::Colon),
                production,
            ]) if production.is_production() => {
                let weights = SenseWeights::new(self.default_weight)?;
                let entry = LexicalEntry::new(word, cat, production.into_term()?, weights)?;
                tracing::debug!(%entry, "lexical entry");
                Step::Emit(entry)
            }
            Some(tail) => self.restore(tail),
            None => Step::NoMatch,
        })
    }
}

impl<I> Iterator for GrammarParser<I>
where
    I: Iterator<Item = GrammarResult<Lexeme>>,
{
    type Item = GrammarResult<LexicalEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        match self.run() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(e))
            }
        }
    }
}

/// Parse every definition in `source`.
///
/// All-or-nothing: on any error no entry is returned.
pub fn parse_lexicon(source: &str) -> GrammarResult<Vec<LexicalEntry>> {
    parse_lexicon_with_default(source, DEFAULT_WEIGHT)
}

/// [`parse_lexicon`] with a custom default weight.
pub fn parse_lexicon_with_default(
    source: &str,
    default_weight: f64,
) -> GrammarResult<Vec<LexicalEntry>> {
    let entries = GrammarParser::from_source(source)
        .with_default_weight(default_weight)?
        .collect::<GrammarResult<Vec<_>>>()?;
    tracing::info!(entries = entries.len(), "grammar source parsed");
    Ok(entries)
}
