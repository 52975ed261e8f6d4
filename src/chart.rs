//! The chart: every edge discovered so far, the child pointer lists (CPLs)
//! that justify each one, and the secondary indexes the rules query.
//!
//! Nothing is ever removed. Edges live in an append-only arena and are named
//! by `EdgeId`; an index, once built for a set of attributes, is kept up to
//! date by every later insertion, which is what makes a `Selection` live: its
//! cursor walks a bucket that only ever grows at the end.

use crate::edge::{Attr, AttrValue, Constraint, Edge, EdgeId};
use crate::error::{Error, Result};
use crate::grammar::Label;

use std::collections::HashMap;
use std::hash::Hash;

use linear_map::set::LinearSet;

/// One justification of an edge: the sub-edges that moved its dot, in order.
pub type Cpl = Vec<EdgeId>;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Changed {
    Unchanged,
    /// The edge was new, or gained at least one new CPL.
    Changed(EdgeId),
}

impl Changed {
    pub fn is_changed(self) -> bool { matches!(self, Changed::Changed(_)) }

    pub fn edge(self) -> Option<EdgeId> {
        match self {
            Changed::Changed(id) => Some(id),
            Changed::Unchanged => None,
        }
    }
}

#[derive(Debug)]
struct Index<K> {
    attrs: Vec<Attr>,
    buckets: HashMap<Vec<AttrValue<K>>, Vec<EdgeId>>,
}

impl<K: Clone + Eq + Hash> Index<K> {
    fn register<L: Label<Key=K>>(&mut self, id: EdgeId, edge: &Edge<L>) {
        let key: Vec<_> = self.attrs.iter().map(|&a| edge.attr(a)).collect();
        self.buckets.entry(key).or_insert_with(Vec::new).push(id);
    }
}

#[derive(Debug)]
pub struct Chart<L: Label> {
    tokens: Vec<String>,
    edges: Vec<Edge<L>>,
    ids: HashMap<Edge<L>, EdgeId>,
    cpls: Vec<LinearSet<Cpl>>,
    indexes: Vec<Index<L::Key>>,
    index_slots: HashMap<Vec<Attr>, usize>,
}

impl<L: Label> Chart<L> {
    /// An empty chart over `tokens`; the rules seed it with leaf edges.
    pub fn new(tokens: Vec<String>) -> Self {
        Chart {
            tokens,
            edges: Vec::new(),
            ids: HashMap::new(),
            cpls: Vec::new(),
            indexes: Vec::new(),
            index_slots: HashMap::new(),
        }
    }

    pub fn num_leaves(&self) -> usize { self.tokens.len() }
    pub fn leaf(&self, index: usize) -> Option<&str> { self.tokens.get(index).map(String::as_str) }
    pub fn leaves(&self) -> &[String] { &self.tokens }

    pub fn num_edges(&self) -> usize { self.edges.len() }

    pub fn num_cpls(&self) -> usize {
        self.cpls.iter().map(|s| s.len()).sum()
    }

    /// All edges, in the order they were discovered.
    pub fn edges(&self) -> impl Iterator<Item=(EdgeId, &Edge<L>)> {
        self.edges.iter().enumerate().map(|(i, e)| (EdgeId(i), e))
    }

    pub fn edge(&self, id: EdgeId) -> Result<&Edge<L>> {
        self.edges.get(id.0).ok_or(Error::EdgeNotInChart(id))
    }

    pub fn id_of(&self, edge: &Edge<L>) -> Option<EdgeId> {
        self.ids.get(edge).copied()
    }

    pub fn contains(&self, edge: &Edge<L>) -> bool {
        self.ids.contains_key(edge)
    }

    /// Registers `edge` if new and adds every CPL it does not already have.
    ///
    /// An edge is only ever present together with at least one CPL, so a new
    /// edge offered with no CPLs leaves the chart untouched. A CPL may name the
    /// edge being inserted, but nothing newer.
    pub fn insert(&mut self, edge: Edge<L>, cpls: impl IntoIterator<Item=Cpl>) -> Result<Changed> {
        let cpls: Vec<Cpl> = cpls.into_iter().collect();
        let existing = self.ids.get(&edge).copied();
        if existing.is_none() && cpls.is_empty() {
            return Ok(Changed::Unchanged);
        }

        let limit = self.edges.len() + usize::from(existing.is_none());
        if let Some(&child) = cpls.iter().flatten().find(|child| child.0 >= limit) {
            return Err(Error::DanglingChild(child));
        }

        let (id, mut changed) = match existing {
            Some(id) => (id, false),
            None => (self.append_edge(edge), true),
        };
        let set = &mut self.cpls[id.0];
        for cpl in cpls {
            changed |= set.insert(cpl);
        }
        Ok(if changed { Changed::Changed(id) } else { Changed::Unchanged })
    }

    fn append_edge(&mut self, edge: Edge<L>) -> EdgeId {
        let id = EdgeId(self.edges.len());
        for index in &mut self.indexes {
            index.register(id, &edge);
        }
        self.ids.insert(edge.clone(), id);
        self.edges.push(edge);
        self.cpls.push(LinearSet::new());
        id
    }

    /// Inserts `new_edge` justified by each CPL of `previous` extended with `child`.
    pub fn insert_with_backpointer(&mut self, new_edge: Edge<L>, previous: EdgeId, child: EdgeId) -> Result<Changed> {
        let cpls: Vec<Cpl> = self.child_pointer_lists(previous)?
            .map(|cpl| {
                let mut cpl = cpl.clone();
                cpl.push(child);
                cpl
            })
            .collect();
        self.insert(new_edge, cpls)
    }

    /// The CPLs of `edge`, deduplicated, in discovery order.
    pub fn child_pointer_lists(&self, edge: EdgeId) -> Result<impl Iterator<Item=&Cpl> + '_> {
        self.cpls.get(edge.0).map(|set| set.iter()).ok_or(Error::EdgeNotInChart(edge))
    }

    /// A live cursor over the edges matching `constraints`.
    ///
    /// The first request for a given attribute set builds its index from the
    /// current edges; from then on every insertion is registered with it, so
    /// the cursor also reaches edges inserted after this call.
    pub fn select(&mut self, constraints: &[Constraint<L::Key>]) -> Result<Selection<L::Key>> {
        if constraints.is_empty() {
            return Ok(Selection { source: Source::All, next: 0 });
        }
        let (attrs, key) = normalize(constraints)?;
        let slot = match self.index_slots.get(&attrs) {
            Some(&slot) => slot,
            None => self.add_index(attrs),
        };
        Ok(Selection { source: Source::Bucket { slot, key }, next: 0 })
    }

    fn add_index(&mut self, attrs: Vec<Attr>) -> usize {
        let mut index = Index { attrs: attrs.clone(), buckets: HashMap::new() };
        for (i, edge) in self.edges.iter().enumerate() {
            index.register(EdgeId(i), edge);
        }
        tracing::trace!(?attrs, edges = self.edges.len(), "built chart index");
        let slot = self.indexes.len();
        self.indexes.push(index);
        self.index_slots.insert(attrs, slot);
        slot
    }

    /// Snapshot of the edges matching `constraints`, without building an index.
    pub fn query(&self, constraints: &[Constraint<L::Key>]) -> Result<Vec<EdgeId>> {
        if constraints.is_empty() {
            return Ok(self.edges().map(|(id, _)| id).collect());
        }
        let (attrs, key) = normalize(constraints)?;
        if let Some(&slot) = self.index_slots.get(&attrs) {
            return Ok(self.indexes[slot].buckets.get(&key).cloned().unwrap_or_default());
        }
        Ok(self.edges()
            .filter(|(_, edge)| attrs.iter().zip(&key).all(|(&a, v)| &edge.attr(a) == v))
            .map(|(id, _)| id)
            .collect())
    }
}

/// Sorts constraints by attribute, rejecting repeats and ill-shaped values.
fn normalize<K: Clone>(constraints: &[Constraint<K>]) -> Result<(Vec<Attr>, Vec<AttrValue<K>>)> {
    let mut sorted: Vec<&Constraint<K>> = constraints.iter().collect();
    sorted.sort_by_key(|c| c.attr);
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0].attr == pair[1].attr) {
        return Err(Error::InvalidConstraint(format!("`{}` constrained more than once", pair[0].attr)));
    }
    if let Some(c) = sorted.iter().find(|c| !c.attr.accepts(&c.value)) {
        return Err(Error::InvalidConstraint(format!("value of wrong kind for `{}`", c.attr)));
    }
    Ok((sorted.iter().map(|c| c.attr).collect(), sorted.iter().map(|c| c.value.clone()).collect()))
}

#[derive(Clone, Debug)]
enum Source<K> {
    All,
    Bucket { slot: usize, key: Vec<AttrValue<K>> },
}

/// Cursor returned by `Chart::select`. It holds no borrow of the chart, so the
/// caller may insert between calls to `next_edge`.
#[derive(Clone, Debug)]
pub struct Selection<K> {
    source: Source<K>,
    next: usize,
}

impl<K: Clone + Eq + Hash> Selection<K> {
    pub fn next_edge<L: Label<Key=K>>(&mut self, chart: &Chart<L>) -> Option<EdgeId> {
        let found = match &self.source {
            Source::All => (self.next < chart.edges.len()).then(|| EdgeId(self.next)),
            Source::Bucket { slot, key } => chart.indexes[*slot].buckets
                .get(key)
                .and_then(|bucket| bucket.get(self.next).copied()),
        };
        if found.is_some() {
            self.next += 1;
        }
        found
    }

    /// Drains what the cursor can currently reach.
    pub fn collect_from<L: Label<Key=K>>(mut self, chart: &Chart<L>) -> Vec<EdgeId> {
        let mut ids = Vec::new();
        while let Some(id) = self.next_edge(chart) {
            ids.push(id);
        }
        ids
    }
}

#[cfg(test)]
#[path = "tests/chart.rs"]
mod tests_for_chart;
