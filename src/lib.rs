//! A bottom-up left-corner chart parser.
//!
//! Given a grammar and a token sequence, the parser fills a [`Chart`] with
//! edges (hypotheses that a production matches a span), each justified by one
//! or more child pointer lists, until no rule derives anything new. Parse
//! trees are then read off the chart lazily.
//!
//! The core is generic over [`Grammar`]: [`Cfg`] is a plain context-free
//! grammar, [`FeatureGrammar`] adds flat feature structures with variables.

#[macro_use] extern crate lalrpop_util;

lalrpop_mod!(syntax); // synthesized by LALRPOP

pub mod chart;
pub mod edge;
pub mod error;
pub mod feature;
pub mod grammar;
pub mod load;
pub mod parser;
pub mod rules;
pub mod trees;

mod display;

pub use chart::{Changed, Chart, Cpl, Selection};
pub use display::DotDigraph;
pub use edge::{Attr, AttrValue, Constraint, Edge, EdgeId};
pub use error::{Error, Result};
pub use feature::{Category, FeatSymbol, FeatValue, FeatureGrammar};
pub use grammar::{Cfg, Grammar, Label, Production, Symbol};
pub use load::{load_cfg, load_fcfg, LoadError};
pub use parser::{pretty_trace, pretty_trace_into, ChartParser, LoopMode, ParseStats, ParserConfig, TraceHook};
pub use rules::{ChartRule, BU_LC_STRATEGY};
pub use trees::{Parses, Tree};
