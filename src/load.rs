//! Loading grammars from their textual form.
//!
//! ```text
//! # a comment
//! %start S
//! S -> NP VP
//! NP -> 'the' N |
//! VP[NUM=?n] -> V[NUM=?n] | V[NUM=?n, +TR] NP
//! ```
//!
//! One production line per line, alternatives separated by `|`; an empty
//! alternative is an empty production. Terminals are quoted. Without a
//! `%start` directive the left-hand side of the first production is the start
//! symbol.

use crate::feature::{Category, FeatSymbol, FeatValue, FeatureGrammar};
use crate::grammar::{Cfg, Label, Production, Symbol};
use crate::syntax;

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::path::Path;
use std::str::FromStr;
use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use self::raw::{RawLine, RawSymbol, RawValue};

/// What the line parser hands back, before symbols are resolved against a
/// particular label type.
pub(crate) mod raw {
    #[derive(Clone, PartialEq, Eq, Debug)]
    pub enum RawValue {
        Atom(String),
        Var(String),
    }

    #[derive(Clone, PartialEq, Eq, Debug)]
    pub enum RawSymbol {
        Term(String),
        Cat(String, Vec<(String, RawValue)>),
    }

    #[derive(Clone, PartialEq, Eq, Debug)]
    pub struct RawLine {
        pub lhs: RawSymbol,
        pub alts: Vec<Vec<RawSymbol>>,
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(transparent)]
    Io(#[from] io::Error),

    /// `line` is 1-based.
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    #[error("line {line}: feature structures are not allowed in a plain grammar")]
    FeaturesInPlainGrammar { line: usize },

    #[error("grammar has no productions")]
    NoProductions,

    #[error("bad start symbol: {0}")]
    BadStart(String),
}

fn syntax_error(line: usize, message: impl fmt::Display) -> LoadError {
    LoadError::Syntax { line, message: message.to_string() }
}

/// Everything before an unquoted `#`.
fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"^(?:[^#'"]|'[^']*'|"[^"]*")*"#).expect("comment pattern is valid"))
}

fn start_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*%start\s+(.+?)\s*$").expect("start pattern is valid"))
}

fn strip_comment(line: &str) -> &str {
    let kept = comment_regex().find(line).map_or("", |m| m.as_str());
    // an unterminated quote stops the match early; leave that for the parser
    if line[kept.len()..].starts_with('#') { kept } else { line }
}

struct RawGrammar {
    start: Option<(usize, RawSymbol)>,
    lines: Vec<(usize, RawLine)>,
}

fn parse_lines(text: &str) -> Result<RawGrammar, LoadError> {
    let line_parser = syntax::LineParser::new();
    let symbol_parser = syntax::SymbolParser::new();
    let mut grammar = RawGrammar { start: None, lines: Vec::new() };
    for (i, line) in text.lines().enumerate() {
        let number = i + 1;
        let line = strip_comment(line);
        if line.trim().is_empty() {
            continue;
        }
        if let Some(caps) = start_regex().captures(line) {
            let symbol = symbol_parser.parse(&caps[1]).map_err(|e| syntax_error(number, e))?;
            grammar.start = Some((number, symbol));
            continue;
        }
        let parsed = line_parser.parse(line).map_err(|e| syntax_error(number, e))?;
        grammar.lines.push((number, parsed));
    }
    Ok(grammar)
}

/// Resolves raw lines to productions over `L`, in file order.
fn build<L: Label>(text: &str, resolve: impl Fn(usize, RawSymbol) -> Result<L, LoadError>)
    -> Result<(L, Vec<Production<L>>), LoadError>
{
    let raw = parse_lines(text)?;
    let mut productions = Vec::new();
    let mut first_lhs = None;
    for (line, RawLine { lhs, alts }) in raw.lines {
        let lhs = resolve(line, lhs)?;
        if lhs.as_terminal().is_some() {
            return Err(syntax_error(line, format!("left-hand side {} is a terminal", lhs)));
        }
        first_lhs.get_or_insert_with(|| lhs.clone());
        for alt in alts {
            let rhs = alt.into_iter()
                .map(|sym| resolve(line, sym))
                .collect::<Result<Vec<L>, _>>()?;
            productions.push(Production::new(lhs.clone(), rhs));
        }
    }

    let start = match (raw.start, first_lhs) {
        (Some((line, symbol)), _) => resolve(line, symbol)?,
        (None, Some(lhs)) => lhs,
        (None, None) => return Err(LoadError::NoProductions),
    };
    if productions.is_empty() {
        return Err(LoadError::NoProductions);
    }
    if start.as_terminal().is_some() {
        return Err(LoadError::BadStart(format!("{} is a terminal", start)));
    }
    let key = start.index_key();
    if !productions.iter().any(|p| p.lhs().index_key() == key) {
        return Err(LoadError::BadStart(format!("no production expands {}", start)));
    }
    tracing::debug!(productions = productions.len(), %start, "loaded grammar");
    Ok((start, productions))
}

fn plain_symbol(line: usize, raw: RawSymbol) -> Result<Symbol, LoadError> {
    match raw {
        RawSymbol::Term(t) => Ok(Symbol::Term(t)),
        RawSymbol::Cat(name, feats) if feats.is_empty() => Ok(Symbol::NonTerm(name)),
        RawSymbol::Cat(..) => Err(LoadError::FeaturesInPlainGrammar { line }),
    }
}

fn feature_symbol(line: usize, raw: RawSymbol) -> Result<FeatSymbol, LoadError> {
    let (name, feats) = match raw {
        RawSymbol::Term(t) => return Ok(FeatSymbol::Term(t)),
        RawSymbol::Cat(name, feats) => (name, feats),
    };
    let mut features = BTreeMap::new();
    for (feat, value) in feats {
        let value = match value {
            RawValue::Atom(a) => FeatValue::Atom(a),
            RawValue::Var(x) => FeatValue::Var(x),
        };
        if features.insert(feat.clone(), value).is_some() {
            return Err(syntax_error(line, format!("feature {} given twice on {}", feat, name)));
        }
    }
    Ok(FeatSymbol::Cat(Category { name, features }))
}

impl FromStr for Cfg {
    type Err = LoadError;

    fn from_str(text: &str) -> Result<Cfg, LoadError> {
        let (start, productions) = build(text, plain_symbol)?;
        Ok(Cfg::new(start, productions))
    }
}

impl FromStr for FeatureGrammar {
    type Err = LoadError;

    fn from_str(text: &str) -> Result<FeatureGrammar, LoadError> {
        let (start, productions) = build(text, feature_symbol)?;
        Ok(FeatureGrammar::new(start, productions))
    }
}

pub fn load_cfg(path: impl AsRef<Path>) -> Result<Cfg, LoadError> {
    fs_err::read_to_string(path.as_ref())?.parse()
}

pub fn load_fcfg(path: impl AsRef<Path>) -> Result<FeatureGrammar, LoadError> {
    fs_err::read_to_string(path.as_ref())?.parse()
}

#[cfg(test)]
#[path = "tests/load.rs"]
mod tests_for_load;
