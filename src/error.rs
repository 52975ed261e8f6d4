use crate::edge::EdgeId;
use crate::rules::ChartRule;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// No terminal production in the grammar matches the token. Raised before
    /// the chart is touched.
    #[error("grammar does not cover token {token:?} at position {position}")]
    UncoveredToken { token: String, position: usize },

    #[error("invalid chart constraint: {0}")]
    InvalidConstraint(String),

    /// A child pointer list named an edge the chart has never seen.
    #[error("child pointer list references {0}, which is not in the chart")]
    DanglingChild(EdgeId),

    #[error("{0} is not an edge of this chart")]
    EdgeNotInChart(EdgeId),

    /// An axiom was handed an edge, or an edge rule was handed none.
    #[error("{rule} takes {expected} edge(s), given {given}")]
    RuleArity { rule: ChartRule, expected: usize, given: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
