//! The control loop that drives the inference rules to a fixpoint.

use crate::chart::Chart;
use crate::edge::EdgeId;
use crate::error::Result;
use crate::grammar::{Grammar, Label};
use crate::rules::{ChartRule, BU_LC_STRATEGY};
use crate::trees::Tree;

use std::collections::VecDeque;
use std::error::Error as StdError;
use std::io::{self, Write};

use derive_more::Display;

#[derive(Copy, Clone, PartialEq, Eq, Debug, Display)]
pub enum LoopMode {
    /// FIFO worklist: axioms once, then each changed edge is offered to every
    /// arity-1 rule.
    #[display(fmt = "agenda")]
    Agenda,
    /// Repeated passes of every rule over every edge until a pass changes
    /// nothing.
    #[display(fmt = "full pass")]
    FullPass,
}

#[derive(Clone, Debug)]
pub struct ParserConfig {
    pub strategy: Vec<ChartRule>,
    pub loop_mode: LoopMode,
    /// Characters available for a whole row of the textual trace.
    pub trace_width: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        ParserConfig {
            strategy: BU_LC_STRATEGY.to_vec(),
            loop_mode: LoopMode::Agenda,
            trace_width: 50,
        }
    }
}

/// Called after every rule application, with the edges it changed; `changed`
/// is empty when the application derived nothing new. A failing hook is
/// logged and otherwise ignored.
pub type TraceHook<L> = Box<dyn FnMut(&Chart<L>, ChartRule, &[EdgeId]) -> std::result::Result<(), Box<dyn StdError>>>;

#[derive(Copy, Clone, PartialEq, Eq, Default, Debug)]
pub struct ParseStats {
    pub rule_applications: usize,
    pub edges: usize,
    pub cpls: usize,
}

pub struct ChartParser<G: Grammar> {
    grammar: G,
    config: ParserConfig,
    trace: Option<TraceHook<G::Label>>,
}

impl<G: Grammar> ChartParser<G> {
    pub fn new(grammar: G) -> Self {
        ChartParser::with_config(grammar, ParserConfig::default())
    }

    pub fn with_config(grammar: G, config: ParserConfig) -> Self {
        ChartParser { grammar, config, trace: None }
    }

    pub fn strategy(mut self, strategy: impl Into<Vec<ChartRule>>) -> Self {
        self.config.strategy = strategy.into();
        self
    }

    pub fn loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.config.loop_mode = loop_mode;
        self
    }

    pub fn trace_hook(mut self, hook: TraceHook<G::Label>) -> Self {
        self.trace = Some(hook);
        self
    }

    pub fn grammar(&self) -> &G { &self.grammar }

    pub fn config(&self) -> &ParserConfig { &self.config }

    /// Fills a chart for `tokens`, failing up front if some token is not
    /// covered by the grammar.
    pub fn chart_parse<S: Into<String>>(&mut self, tokens: impl IntoIterator<Item=S>) -> Result<Chart<G::Label>> {
        self.chart_parse_with_stats(tokens).map(|(chart, _)| chart)
    }

    pub fn chart_parse_with_stats<S: Into<String>>(&mut self, tokens: impl IntoIterator<Item=S>)
        -> Result<(Chart<G::Label>, ParseStats)>
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        self.grammar.check_coverage(&tokens)?;

        let mut chart = Chart::new(tokens);
        let mut stats = ParseStats::default();
        tracing::debug!(leaves = chart.num_leaves(), mode = %self.config.loop_mode, "chart parse");
        match self.config.loop_mode {
            LoopMode::Agenda => self.run_agenda(&mut chart, &mut stats)?,
            LoopMode::FullPass => self.run_full_passes(&mut chart, &mut stats)?,
        }
        stats.edges = chart.num_edges();
        stats.cpls = chart.num_cpls();
        tracing::debug!(
            rule_applications = stats.rule_applications,
            edges = stats.edges,
            cpls = stats.cpls,
            "chart parse reached fixpoint");
        Ok((chart, stats))
    }

    /// The complete parses of `tokens` rooted at the grammar's start symbol.
    pub fn parse<S: Into<String>>(&mut self, tokens: impl IntoIterator<Item=S>) -> Result<Vec<Tree<G::Label>>> {
        let chart = self.chart_parse(tokens)?;
        let parses = chart.parses(&self.grammar, self.grammar.start())?;
        parses.collect()
    }

    /// `parse` for a batch of token sequences.
    pub fn parse_all<I, S>(&mut self, sentences: impl IntoIterator<Item=I>) -> Result<Vec<Vec<Tree<G::Label>>>>
    where I: IntoIterator<Item=S>, S: Into<String>
    {
        sentences.into_iter().map(|tokens| self.parse(tokens)).collect()
    }

    fn run_agenda(&mut self, chart: &mut Chart<G::Label>, stats: &mut ParseStats) -> Result<()> {
        let strategy = self.config.strategy.clone();
        let mut agenda: VecDeque<EdgeId> = VecDeque::new();
        for &rule in strategy.iter().filter(|r| r.arity() == 0) {
            let changed = rule.apply(chart, &self.grammar, None)?;
            stats.rule_applications += 1;
            self.notify(chart, rule, &changed);
            agenda.extend(changed);
        }
        while let Some(id) = agenda.pop_front() {
            for &rule in strategy.iter().filter(|r| r.arity() == 1) {
                let changed = rule.apply(chart, &self.grammar, Some(id))?;
                stats.rule_applications += 1;
                self.notify(chart, rule, &changed);
                agenda.extend(changed);
            }
        }
        Ok(())
    }

    fn run_full_passes(&mut self, chart: &mut Chart<G::Label>, stats: &mut ParseStats) -> Result<()> {
        let strategy = self.config.strategy.clone();
        let mut pass = 0;
        loop {
            pass += 1;
            let mut productive = false;
            for &rule in &strategy {
                let changed = rule.apply_everywhere(chart, &self.grammar)?;
                stats.rule_applications += 1;
                self.notify(chart, rule, &changed);
                productive |= !changed.is_empty();
            }
            tracing::debug!(pass, edges = chart.num_edges(), productive, "full pass done");
            if !productive {
                return Ok(());
            }
        }
    }

    fn notify(&mut self, chart: &Chart<G::Label>, rule: ChartRule, changed: &[EdgeId]) {
        for &id in changed {
            if let Ok(edge) = chart.edge(id) {
                tracing::trace!(%rule, %id, %edge, "derived");
            }
        }
        if let Some(hook) = self.trace.as_mut() {
            if let Err(err) = hook(chart, rule, changed) {
                tracing::warn!(%rule, error = %err, "trace hook failed");
            }
        }
    }
}

/// The classic textual trace: the leaves once as a header, then one chart row
/// per changed edge, with a `Rule Name:` heading when `verbosity > 1`.
/// Applications that changed nothing print nothing, as does verbosity 0.
pub fn pretty_trace<L: Label + 'static>(verbosity: u8, trace_width: usize) -> TraceHook<L> {
    pretty_trace_into(verbosity, trace_width, io::stdout())
}

pub fn pretty_trace_into<L: Label + 'static, W: Write + 'static>(verbosity: u8, trace_width: usize, mut out: W)
    -> TraceHook<L>
{
    let mut printed_leaves = false;
    Box::new(move |chart: &Chart<L>, rule: ChartRule, changed: &[EdgeId]| -> std::result::Result<(), Box<dyn StdError>> {
        if verbosity == 0 || changed.is_empty() {
            return Ok(());
        }
        let width = trace_width / (chart.num_leaves() + 1);
        if !printed_leaves {
            writeln!(out, "{}", chart.pretty_format_leaves(width))?;
            printed_leaves = true;
        }
        if verbosity > 1 {
            writeln!(out, "{}:", rule)?;
        }
        for &id in changed {
            writeln!(out, "{}", chart.pretty_format_edge(chart.edge(id)?, width))?;
        }
        Ok(())
    })
}

#[cfg(test)]
#[path = "tests/parser.rs"]
mod tests_for_parser;
