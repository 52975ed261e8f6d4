use crate::error::{Error, Result};

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;

// A grammar G is a tuple (Sigma, Delta, S, P), where
//   Sigma is a finite set of terminals (matched against tokens verbatim)
//   Delta is a finite set of labels for phrases
//   S in Delta is the start label, and
//   P is an ordered list of productions  A -> X_1 ... X_n  (n may be zero)
//
// The chart never looks inside a label; it only asks for a coarse index key
// and leaves the real compatibility question to `Grammar::advance`.

/// A grammar label: a terminal or a (possibly feature-augmented) phrase label.
pub trait Label: Clone + Eq + Hash + fmt::Debug + fmt::Display {
    /// Coarse tag used when indexing edges. Two labels that can ever be
    /// compatible must share a key.
    type Key: Clone + Eq + Hash + fmt::Debug;

    fn index_key(&self) -> Self::Key;

    /// The label of the leaf edge that matches `token`.
    fn terminal(token: &str) -> Self;

    fn as_terminal(&self) -> Option<&str>;
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Production<L> {
    pub(crate) lhs: L,
    pub(crate) rhs: Rc<[L]>,
}

impl<L> Production<L> {
    pub fn new(lhs: L, rhs: impl Into<Vec<L>>) -> Self {
        let rhs: Vec<L> = rhs.into();
        Production { lhs, rhs: rhs.into() }
    }

    pub fn lhs(&self) -> &L { &self.lhs }
    pub fn rhs(&self) -> &[L] { &self.rhs }
    pub fn is_empty(&self) -> bool { self.rhs.is_empty() }
}

/// The result of a successful compatibility test: the (possibly merged)
/// left- and right-hand sides that the advanced edge carries.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Advance<L> {
    pub lhs: L,
    pub rhs: Rc<[L]>,
}

/// Productions in grammar order, plus the lookups the inference rules need.
#[derive(Debug)]
pub struct ProductionSet<L: Label> {
    productions: Vec<Production<L>>,
    by_lhs: HashMap<L::Key, Vec<usize>>,
    by_first: HashMap<L::Key, Vec<usize>>,
    empty: Vec<usize>,
    lexical: HashSet<String>,
}

impl<L: Label> ProductionSet<L> {
    pub fn as_slice(&self) -> &[Production<L>] { &self.productions }
    pub fn len(&self) -> usize { self.productions.len() }
    pub fn is_empty(&self) -> bool { self.productions.is_empty() }

    fn pick<'a>(&'a self, ids: Option<&'a Vec<usize>>) -> Box<dyn Iterator<Item=&'a Production<L>> + 'a> {
        match ids {
            Some(ids) => Box::new(ids.iter().map(move |&i| &self.productions[i])),
            None => Box::new(std::iter::empty()),
        }
    }

    pub fn with_lhs<'a>(&'a self, key: &L::Key) -> Box<dyn Iterator<Item=&'a Production<L>> + 'a> {
        self.pick(self.by_lhs.get(key))
    }

    pub fn with_first<'a>(&'a self, key: &L::Key) -> Box<dyn Iterator<Item=&'a Production<L>> + 'a> {
        self.pick(self.by_first.get(key))
    }

    pub fn empty_productions(&self) -> impl Iterator<Item=&Production<L>> + '_ {
        self.empty.iter().map(move |&i| &self.productions[i])
    }

    pub fn covers(&self, token: &str) -> bool {
        self.lexical.contains(token)
    }
}

impl<L: Label> FromIterator<Production<L>> for ProductionSet<L> {
    fn from_iter<I: IntoIterator<Item=Production<L>>>(iter: I) -> Self {
        let mut set = ProductionSet {
            productions: Vec::new(),
            by_lhs: HashMap::new(),
            by_first: HashMap::new(),
            empty: Vec::new(),
            lexical: HashSet::new(),
        };
        for (i, prod) in iter.into_iter().enumerate() {
            set.by_lhs.entry(prod.lhs.index_key()).or_insert_with(Vec::new).push(i);
            match prod.rhs.first() {
                Some(first) => set.by_first.entry(first.index_key()).or_insert_with(Vec::new).push(i),
                None => set.empty.push(i),
            }
            set.lexical.extend(prod.rhs.iter().filter_map(|l| l.as_terminal()).map(String::from));
            set.productions.push(prod);
        }
        set
    }
}

/// What the parsing core needs from a grammar.
pub trait Grammar {
    type Label: Label;

    fn start(&self) -> &Self::Label;

    fn production_set(&self) -> &ProductionSet<Self::Label>;

    fn productions(&self) -> &[Production<Self::Label>] {
        self.production_set().as_slice()
    }

    fn productions_with_lhs<'a>(&'a self, key: &<Self::Label as Label>::Key)
        -> Box<dyn Iterator<Item=&'a Production<Self::Label>> + 'a>
    {
        self.production_set().with_lhs(key)
    }

    /// Productions whose right-hand side starts with a label indexed under `key`.
    fn productions_with_first<'a>(&'a self, key: &<Self::Label as Label>::Key)
        -> Box<dyn Iterator<Item=&'a Production<Self::Label>> + 'a>
    {
        self.production_set().with_first(key)
    }

    fn empty_productions<'a>(&'a self) -> Box<dyn Iterator<Item=&'a Production<Self::Label>> + 'a> {
        Box::new(self.production_set().empty_productions())
    }

    fn covers(&self, token: &str) -> bool {
        self.production_set().covers(token)
    }

    /// Fails on the first token that no production can match.
    fn check_coverage(&self, tokens: &[String]) -> Result<()> {
        match tokens.iter().enumerate().find(|(_, t)| !self.covers(t)) {
            Some((position, token)) => Err(Error::UncoveredToken { token: token.clone(), position }),
            None => Ok(()),
        }
    }

    /// Compatibility test for moving the dot of `lhs -> rhs` (at `dot`) over
    /// a complete edge labelled `found`. The default is label equality.
    fn advance(&self, lhs: &Self::Label, rhs: &Rc<[Self::Label]>, dot: usize, found: &Self::Label)
        -> Option<Advance<Self::Label>>
    {
        match rhs.get(dot) {
            Some(expected) if expected == found => Some(Advance { lhs: lhs.clone(), rhs: Rc::clone(rhs) }),
            _ => None,
        }
    }

    fn accepts_root(&self, root: &Self::Label, found: &Self::Label) -> bool {
        root == found
    }
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Debug)]
pub enum Symbol {
    Term(String),
    NonTerm(String),
}

impl Symbol {
    pub fn term(s: impl Into<String>) -> Self { Symbol::Term(s.into()) }
    pub fn nonterm(s: impl Into<String>) -> Self { Symbol::NonTerm(s.into()) }
}

impl Label for Symbol {
    type Key = Symbol;

    fn index_key(&self) -> Symbol { self.clone() }

    fn terminal(token: &str) -> Self { Symbol::Term(token.to_string()) }

    fn as_terminal(&self) -> Option<&str> {
        match self {
            Symbol::Term(t) => Some(t),
            Symbol::NonTerm(_) => None,
        }
    }
}

/// A plain context-free grammar.
#[derive(Debug)]
pub struct Cfg {
    start: Symbol,
    productions: ProductionSet<Symbol>,
}

impl Cfg {
    pub fn new(start: Symbol, productions: impl IntoIterator<Item=Production<Symbol>>) -> Self {
        Cfg { start, productions: productions.into_iter().collect() }
    }
}

impl Grammar for Cfg {
    type Label = Symbol;

    fn start(&self) -> &Symbol { &self.start }

    fn production_set(&self) -> &ProductionSet<Symbol> { &self.productions }
}

#[cfg(test)]
#[path = "tests/grammar.rs"]
mod tests_for_grammar;
