//! Edges: hypotheses that a production matches a span of the input.
//!
//! An edge `[i:j] A -> alpha * beta` claims that `alpha` derives the tokens
//! `i..j`; it is *complete* once `beta` is empty. Leaf edges are the
//! complete, right-hand-side-free edges `[i:i+1] 'tok'` seeded from the input.
//!
//! Identity is plain value equality over `(start, end, lhs, rhs, dot)`, so a
//! leaf edge never collides with a production edge (a production edge with an
//! empty right-hand side always spans zero tokens).

use crate::error::{Error, Result};
use crate::grammar::{Advance, Label, Production};

use std::rc::Rc;
use std::str::FromStr;

use derive_more::{Display, From};

/// Position of an edge in the chart that owns it.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From)]
#[display(fmt = "edge #{}", _0)]
pub struct EdgeId(pub(crate) usize);

impl EdgeId {
    pub fn index(self) -> usize { self.0 }
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Edge<L> {
    start: usize,
    end: usize,
    lhs: L,
    rhs: Rc<[L]>,
    dot: usize,
}

impl<L: Label> Edge<L> {
    pub fn new((start, end): (usize, usize), lhs: L, rhs: Rc<[L]>, dot: usize) -> Self {
        assert!(start <= end, "edge span {start}..{end} runs backwards");
        assert!(dot <= rhs.len(), "dot {dot} past right-hand side of length {}", rhs.len());
        Edge { start, end, lhs, rhs, dot }
    }

    pub fn leaf(token: &str, index: usize) -> Self {
        Edge::new((index, index + 1), L::terminal(token), Rc::from(Vec::<L>::new()), 0)
    }

    /// `[i:i] A -> * alpha`
    pub fn from_production(prod: &Production<L>, index: usize) -> Self {
        Edge::new((index, index), prod.lhs.clone(), Rc::clone(&prod.rhs), 0)
    }

    /// The edge with its dot moved over one more symbol, now ending at `new_end`.
    pub fn move_dot_forward(&self, new_end: usize, advance: Advance<L>) -> Self {
        Edge::new((self.start, new_end), advance.lhs, advance.rhs, self.dot + 1)
    }

    pub fn start(&self) -> usize { self.start }
    pub fn end(&self) -> usize { self.end }
    pub fn span(&self) -> (usize, usize) { (self.start, self.end) }
    pub fn length(&self) -> usize { self.end - self.start }
    pub fn lhs(&self) -> &L { &self.lhs }
    pub fn rhs(&self) -> &[L] { &self.rhs }
    pub(crate) fn shared_rhs(&self) -> &Rc<[L]> { &self.rhs }
    pub fn dot(&self) -> usize { self.dot }

    pub fn is_complete(&self) -> bool { self.dot == self.rhs.len() }
    pub fn is_incomplete(&self) -> bool { !self.is_complete() }

    pub fn is_leaf(&self) -> bool {
        self.rhs.is_empty() && self.length() == 1
    }

    pub fn next_symbol(&self) -> Option<&L> {
        self.rhs.get(self.dot)
    }

    pub fn attr(&self, attr: Attr) -> AttrValue<L::Key> {
        match attr {
            Attr::Start => AttrValue::Pos(self.start),
            Attr::End => AttrValue::Pos(self.end),
            Attr::Length => AttrValue::Pos(self.length()),
            Attr::Dot => AttrValue::Pos(self.dot),
            Attr::Span => AttrValue::Span(self.start, self.end),
            Attr::Lhs => AttrValue::Key(self.lhs.index_key()),
            Attr::Rhs => AttrValue::Keys(self.rhs.iter().map(|l| l.index_key()).collect()),
            Attr::NextSym => match self.next_symbol() {
                Some(l) => AttrValue::Key(l.index_key()),
                None => AttrValue::NoKey,
            },
            Attr::IsComplete => AttrValue::Flag(self.is_complete()),
            Attr::IsIncomplete => AttrValue::Flag(self.is_incomplete()),
        }
    }
}

/// The edge attributes a chart index can be keyed on.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display)]
pub enum Attr {
    #[display(fmt = "start")]
    Start,
    #[display(fmt = "end")]
    End,
    #[display(fmt = "length")]
    Length,
    #[display(fmt = "span")]
    Span,
    #[display(fmt = "lhs")]
    Lhs,
    #[display(fmt = "rhs")]
    Rhs,
    #[display(fmt = "dot")]
    Dot,
    #[display(fmt = "nextsym")]
    NextSym,
    #[display(fmt = "is_complete")]
    IsComplete,
    #[display(fmt = "is_incomplete")]
    IsIncomplete,
}

impl Attr {
    pub(crate) fn accepts<K>(self, value: &AttrValue<K>) -> bool {
        use AttrValue as V;
        match self {
            Attr::Start | Attr::End | Attr::Length | Attr::Dot => matches!(value, V::Pos(_)),
            Attr::Span => matches!(value, V::Span(..)),
            Attr::Lhs => matches!(value, V::Key(_)),
            Attr::Rhs => matches!(value, V::Keys(_)),
            Attr::NextSym => matches!(value, V::Key(_) | V::NoKey),
            Attr::IsComplete | Attr::IsIncomplete => matches!(value, V::Flag(_)),
        }
    }
}

impl FromStr for Attr {
    type Err = Error;

    fn from_str(s: &str) -> Result<Attr> {
        Ok(match s {
            "start" => Attr::Start,
            "end" => Attr::End,
            "length" => Attr::Length,
            "span" => Attr::Span,
            "lhs" => Attr::Lhs,
            "rhs" => Attr::Rhs,
            "dot" => Attr::Dot,
            "nextsym" | "next_symbol" => Attr::NextSym,
            "is_complete" => Attr::IsComplete,
            "is_incomplete" => Attr::IsIncomplete,
            other => return Err(Error::InvalidConstraint(format!("edges have no attribute `{}`", other))),
        })
    }
}

/// Value of an edge attribute, with labels projected to their index keys.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum AttrValue<K> {
    Pos(usize),
    Span(usize, usize),
    Flag(bool),
    Key(K),
    Keys(Vec<K>),
    /// `nextsym` of a complete edge.
    NoKey,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Constraint<K> {
    pub(crate) attr: Attr,
    pub(crate) value: AttrValue<K>,
}

impl<K> Constraint<K> {
    /// Checks that `value` has the shape `attr` produces.
    pub fn new(attr: Attr, value: AttrValue<K>) -> Result<Self> {
        if !attr.accepts(&value) {
            return Err(Error::InvalidConstraint(format!("value of wrong kind for `{}`", attr)));
        }
        Ok(Constraint { attr, value })
    }

    /// Like `new`, with the attribute given by name.
    pub fn named(name: &str, value: AttrValue<K>) -> Result<Self> {
        Constraint::new(name.parse()?, value)
    }

    pub fn start(i: usize) -> Self { Constraint { attr: Attr::Start, value: AttrValue::Pos(i) } }
    pub fn end(j: usize) -> Self { Constraint { attr: Attr::End, value: AttrValue::Pos(j) } }
    pub fn lhs(key: K) -> Self { Constraint { attr: Attr::Lhs, value: AttrValue::Key(key) } }
    pub fn next_symbol(key: K) -> Self { Constraint { attr: Attr::NextSym, value: AttrValue::Key(key) } }
    pub fn is_complete(flag: bool) -> Self { Constraint { attr: Attr::IsComplete, value: AttrValue::Flag(flag) } }

    pub fn attr(&self) -> Attr { self.attr }
}

#[cfg(test)]
#[path = "tests/edge.rs"]
mod tests_for_edge;
