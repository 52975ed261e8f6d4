//! Reading derivation trees back off a finished chart.
//!
//! Trees for an edge are the cartesian products of its children's trees, one
//! product per CPL. Only acyclic trees are produced: no edge occurs twice on a
//! root-to-leaf path, so cyclic derivations (`A -> B`, `B -> A` over one span)
//! are dropped rather than unfolded forever.
//!
//! Before recursing into an edge's children the edge is marked `InProgress`;
//! a path that reaches the edge again sees that marker and contributes no
//! trees. A result that ran into the marker of some edge further up the path
//! is incomplete, so it is handed back without being memoised, and the set of
//! trees read off an edge does not depend on the order CPLs are visited in.

use crate::chart::Chart;
use crate::edge::{Constraint, EdgeId};
use crate::error::{Error, Result};
use crate::grammar::{Grammar, Label};

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Tree<L> {
    /// A matched token.
    Leaf(String),
    /// A labelled node. Childless nodes stand for right-hand-side symbols an
    /// incomplete edge has not matched yet (or for empty productions).
    Node(L, Vec<Tree<L>>),
}

impl<L> Tree<L> {
    pub fn node(label: L, children: Vec<Tree<L>>) -> Self {
        Tree::Node(label, children)
    }

    pub fn leaf(token: impl Into<String>) -> Self {
        Tree::Leaf(token.into())
    }

    pub fn label(&self) -> Option<&L> {
        match self {
            Tree::Node(label, _) => Some(label),
            Tree::Leaf(_) => None,
        }
    }

    pub fn children(&self) -> &[Tree<L>] {
        match self {
            Tree::Node(_, children) => children,
            Tree::Leaf(_) => &[],
        }
    }

    pub fn leaves(&self) -> Vec<&str> {
        let mut accum = Vec::new();
        self.collect_leaves(&mut accum);
        accum
    }

    fn collect_leaves<'a>(&'a self, accum: &mut Vec<&'a str>) {
        match self {
            Tree::Leaf(token) => accum.push(token),
            Tree::Node(_, children) => {
                for child in children {
                    child.collect_leaves(accum);
                }
            }
        }
    }
}

/// A tree together with every edge it was built from. A tree is only put
/// under an edge whose id is absent from all of its children's sets, so no
/// edge repeats along a root-to-leaf path.
#[derive(Clone, Debug)]
struct Derived<L> {
    tree: Tree<L>,
    edges: Rc<HashSet<EdgeId>>,
}

/// Memo entry for an edge; an edge with no entry has not been visited.
/// `InProgress` records the edge's depth on the current path.
#[derive(Debug)]
enum Memo<L> {
    InProgress(usize),
    Done(Rc<Vec<Derived<L>>>),
}

/// What one visit produced. `cut_at` is the shallowest in-progress edge the
/// visit ran into above the visited edge; when it is set the trees are
/// missing every derivation through that edge and must not be memoised.
struct Found<L> {
    trees: Rc<Vec<Derived<L>>>,
    cut_at: Option<usize>,
}

impl<L> Found<L> {
    fn done(trees: Rc<Vec<Derived<L>>>) -> Self {
        Found { trees, cut_at: None }
    }
}

struct Extractor<'c, L: Label> {
    chart: &'c Chart<L>,
    complete: bool,
    depth: usize,
    memo: HashMap<EdgeId, Memo<L>>,
}

impl<'c, L: Label> Extractor<'c, L> {
    fn new(chart: &'c Chart<L>, complete: bool) -> Self {
        Extractor { chart, complete, depth: 0, memo: HashMap::new() }
    }

    fn extract(mut self, root: EdgeId) -> Result<Vec<Tree<L>>> {
        let found = self.trees(root)?;
        Ok(found.trees.iter().map(|d| d.tree.clone()).collect())
    }

    fn trees(&mut self, id: EdgeId) -> Result<Found<L>> {
        match self.memo.get(&id) {
            Some(Memo::Done(trees)) => return Ok(Found::done(Rc::clone(trees))),
            Some(&Memo::InProgress(depth)) => return Ok(Found { trees: Rc::default(), cut_at: Some(depth) }),
            None => {}
        }

        let chart = self.chart;
        let edge = chart.edge(id)?;
        if self.complete && edge.is_incomplete() {
            return Ok(Found::done(Rc::default()));
        }

        if edge.is_leaf() {
            let token = chart.leaf(edge.start()).ok_or(Error::EdgeNotInChart(id))?;
            let leaf = Derived { tree: Tree::leaf(token), edges: Rc::new(HashSet::from([id])) };
            let trees = Rc::new(vec![leaf]);
            self.memo.insert(id, Memo::Done(Rc::clone(&trees)));
            return Ok(Found::done(trees));
        }

        let depth = self.depth;
        self.memo.insert(id, Memo::InProgress(depth));
        self.depth += 1;
        let mut cut_at: Option<usize> = None;
        let mut trees = Vec::new();
        for cpl in chart.child_pointer_lists(id)? {
            let mut choices = Vec::with_capacity(cpl.len());
            for &child in cpl {
                let found = self.trees(child)?;
                cut_at = match (cut_at, found.cut_at) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
                choices.push(found.trees);
            }
            for children in Product::new(&choices) {
                if children.iter().any(|c| c.edges.contains(&id)) {
                    continue;
                }
                let mut edges = HashSet::from([id]);
                for child in &children {
                    edges.extend(child.edges.iter().copied());
                }
                let children = children.into_iter().map(|c| c.tree).collect();
                trees.push(Derived { tree: Tree::Node(edge.lhs().clone(), children), edges: Rc::new(edges) });
            }
        }
        self.depth -= 1;

        if edge.is_incomplete() {
            let unexpanded: Vec<Tree<L>> = edge.rhs()[edge.dot()..]
                .iter()
                .map(|l| Tree::Node(l.clone(), vec![]))
                .collect();
            for derived in &mut trees {
                if let Tree::Node(_, children) = &mut derived.tree {
                    children.extend(unexpanded.iter().cloned());
                }
            }
        }

        let trees = Rc::new(trees);
        // running into this edge's own marker only drops cyclic trees
        let cut_at = cut_at.filter(|&d| d < depth);
        if cut_at.is_some() {
            self.memo.remove(&id);
        } else {
            self.memo.insert(id, Memo::Done(Rc::clone(&trees)));
        }
        Ok(Found { trees, cut_at })
    }
}

/// Every way of picking one element from each choice list, the last list
/// varying fastest.
struct Product<'a, T> {
    choices: &'a [Rc<Vec<T>>],
    cursor: Option<Vec<usize>>,
}

impl<'a, T> Product<'a, T> {
    fn new(choices: &'a [Rc<Vec<T>>]) -> Self {
        let cursor = if choices.iter().any(|c| c.is_empty()) {
            None
        } else {
            Some(vec![0; choices.len()])
        };
        Product { choices, cursor }
    }
}

impl<'a, T: Clone> Iterator for Product<'a, T> {
    type Item = Vec<T>;

    fn next(&mut self) -> Option<Vec<T>> {
        let cursor = self.cursor.as_mut()?;
        let item = cursor.iter().zip(self.choices).map(|(&i, c)| c[i].clone()).collect();
        let mut pos = cursor.len();
        loop {
            if pos == 0 {
                // every digit wrapped around: exhausted
                self.cursor = None;
                break;
            }
            pos -= 1;
            cursor[pos] += 1;
            if cursor[pos] < self.choices[pos].len() {
                break;
            }
            cursor[pos] = 0;
        }
        Some(item)
    }
}

/// Lazy sequence of the complete parses of a chart: trees are only read off
/// a root edge once the previous root's trees have been consumed.
pub struct Parses<'c, L: Label> {
    chart: &'c Chart<L>,
    roots: std::vec::IntoIter<EdgeId>,
    pending: std::vec::IntoIter<Tree<L>>,
}

impl<'c, L: Label> Iterator for Parses<'c, L> {
    type Item = Result<Tree<L>>;

    fn next(&mut self) -> Option<Result<Tree<L>>> {
        loop {
            if let Some(tree) = self.pending.next() {
                return Some(Ok(tree));
            }
            let root = self.roots.next()?;
            match Extractor::new(self.chart, true).extract(root) {
                Ok(trees) => self.pending = trees.into_iter(),
                Err(err) => return Some(Err(err)),
            }
        }
    }
}

impl<L: Label> Chart<L> {
    /// The complete trees spanning the whole input whose root label the
    /// grammar accepts as `root`.
    pub fn parses<G: Grammar<Label=L>>(&self, grammar: &G, root: &L) -> Result<Parses<'_, L>> {
        let candidates = self.query(&[
            Constraint::start(0),
            Constraint::end(self.num_leaves()),
            Constraint::lhs(root.index_key()),
        ])?;
        let mut roots = Vec::new();
        for id in candidates {
            if grammar.accepts_root(root, self.edge(id)?.lhs()) {
                roots.push(id);
            }
        }
        Ok(Parses { chart: self, roots: roots.into_iter(), pending: Vec::new().into_iter() })
    }

    /// The trees of `edge`. With `complete` set, incomplete edges (and any
    /// tree through one) are left out; otherwise the unmatched remainder of an
    /// incomplete edge shows up as childless nodes.
    pub fn trees(&self, edge: EdgeId, complete: bool) -> Result<Vec<Tree<L>>> {
        self.edge(edge)?;
        Extractor::new(self, complete).extract(edge)
    }
}

#[cfg(test)]
#[path = "tests/trees.rs"]
mod tests_for_trees;
