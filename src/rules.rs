//! The inference rules of the bottom-up left-corner strategy.
//!
//! Each rule reads the chart and the grammar, inserts what it derives, and
//! reports the edges whose insertion changed the chart (new edges, or known
//! edges that gained a CPL). Axioms take no edge; the others take one.

use crate::chart::{Changed, Chart, Cpl};
use crate::edge::{Constraint, Edge, EdgeId};
use crate::error::{Error, Result};
use crate::grammar::{Grammar, Label};

use derive_more::Display;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Display)]
pub enum ChartRule {
    /// For each token `w_i`: `[i:i+1] 'w_i'`.
    #[display(fmt = "Leaf Init")]
    LeafInit,
    /// For each production `A -> ` and each position `i` (including the end):
    /// `[i:i] A -> *`.
    #[display(fmt = "Empty Predict")]
    EmptyPredict,
    /// `[i:j] B -> gamma *` licenses `[i:j] A -> B * beta` for each `A -> B beta`.
    #[display(fmt = "Bottom Up Predict Combine")]
    BottomUpPredictCombine,
    /// `[i:j] A -> alpha * B beta` and `[j:k] B -> gamma *` license
    /// `[i:k] A -> alpha B * beta`, whichever of the two is given.
    #[display(fmt = "Single Edge Fundamental")]
    SingleEdgeFundamental,
}

pub const BU_LC_STRATEGY: [ChartRule; 4] = [
    ChartRule::LeafInit,
    ChartRule::EmptyPredict,
    ChartRule::BottomUpPredictCombine,
    ChartRule::SingleEdgeFundamental,
];

fn record(changed: Changed, out: &mut Vec<EdgeId>) {
    if let Changed::Changed(id) = changed {
        out.push(id);
    }
}

impl ChartRule {
    pub fn arity(self) -> usize {
        match self {
            ChartRule::LeafInit | ChartRule::EmptyPredict => 0,
            ChartRule::BottomUpPredictCombine | ChartRule::SingleEdgeFundamental => 1,
        }
    }

    /// Applies the rule once: to nothing for an axiom, to `edge` otherwise.
    /// An `edge` that does not match the rule's arity is a `RuleArity` error.
    pub fn apply<G: Grammar>(self, chart: &mut Chart<G::Label>, grammar: &G, edge: Option<EdgeId>) -> Result<Vec<EdgeId>> {
        match (self, edge) {
            (ChartRule::LeafInit, None) => leaf_init(chart),
            (ChartRule::EmptyPredict, None) => empty_predict(chart, grammar),
            (ChartRule::BottomUpPredictCombine, Some(id)) => bottom_up_predict_combine(chart, grammar, id),
            (ChartRule::SingleEdgeFundamental, Some(id)) => single_edge_fundamental(chart, grammar, id),
            (rule, edge) => Err(Error::RuleArity { rule, expected: rule.arity(), given: usize::from(edge.is_some()) }),
        }
    }

    /// Applies the rule to every edge of the chart, including the edges it
    /// derives along the way.
    pub fn apply_everywhere<G: Grammar>(self, chart: &mut Chart<G::Label>, grammar: &G) -> Result<Vec<EdgeId>> {
        if self.arity() == 0 {
            return self.apply(chart, grammar, None);
        }
        let mut out = Vec::new();
        let mut all = chart.select(&[])?;
        while let Some(id) = all.next_edge(chart) {
            out.extend(self.apply(chart, grammar, Some(id))?);
        }
        Ok(out)
    }
}

fn leaf_init<L: Label>(chart: &mut Chart<L>) -> Result<Vec<EdgeId>> {
    let mut out = Vec::new();
    let leaves: Vec<Edge<L>> = chart.leaves().iter()
        .enumerate()
        .map(|(index, token)| Edge::leaf(token.as_str(), index))
        .collect();
    for edge in leaves {
        record(chart.insert(edge, [Cpl::new()])?, &mut out);
    }
    Ok(out)
}

fn empty_predict<G: Grammar>(chart: &mut Chart<G::Label>, grammar: &G) -> Result<Vec<EdgeId>> {
    let mut out = Vec::new();
    for prod in grammar.empty_productions() {
        for index in 0..=chart.num_leaves() {
            record(chart.insert(Edge::from_production(prod, index), [Cpl::new()])?, &mut out);
        }
    }
    Ok(out)
}

fn bottom_up_predict_combine<G: Grammar>(chart: &mut Chart<G::Label>, grammar: &G, id: EdgeId) -> Result<Vec<EdgeId>> {
    let edge = chart.edge(id)?.clone();
    let mut out = Vec::new();
    if edge.is_incomplete() {
        return Ok(out);
    }
    for prod in grammar.productions_with_first(&edge.lhs().index_key()) {
        let Some(advance) = grammar.advance(prod.lhs(), &prod.rhs, 0, edge.lhs()) else { continue };
        let new_edge = Edge::new(edge.span(), advance.lhs, advance.rhs, 1);
        record(chart.insert(new_edge, [vec![id]])?, &mut out);
    }
    Ok(out)
}

fn single_edge_fundamental<G: Grammar>(chart: &mut Chart<G::Label>, grammar: &G, id: EdgeId) -> Result<Vec<EdgeId>> {
    let edge = chart.edge(id)?.clone();
    let mut out = Vec::new();
    match edge.next_symbol() {
        // `edge` is the left partner, waiting for `next`
        Some(next) => {
            let mut rights = chart.select(&[
                Constraint::start(edge.end()),
                Constraint::is_complete(true),
                Constraint::lhs(next.index_key()),
            ])?;
            while let Some(right_id) = rights.next_edge(chart) {
                let right = chart.edge(right_id)?;
                let Some(advance) = grammar.advance(edge.lhs(), edge.shared_rhs(), edge.dot(), right.lhs()) else { continue };
                let new_edge = edge.move_dot_forward(right.end(), advance);
                record(chart.insert_with_backpointer(new_edge, id, right_id)?, &mut out);
            }
        }
        // `edge` is complete; find the edges waiting for it
        None => {
            let mut lefts = chart.select(&[
                Constraint::end(edge.start()),
                Constraint::is_complete(false),
                Constraint::next_symbol(edge.lhs().index_key()),
            ])?;
            while let Some(left_id) = lefts.next_edge(chart) {
                let left = chart.edge(left_id)?;
                let Some(advance) = grammar.advance(left.lhs(), left.shared_rhs(), left.dot(), edge.lhs()) else { continue };
                let new_edge = left.move_dot_forward(edge.end(), advance);
                record(chart.insert_with_backpointer(new_edge, left_id, id)?, &mut out);
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
#[path = "tests/rules.rs"]
mod tests_for_rules;
