// This is actually defined at `crate::parser::tests_for_parser`

use crate::error::Error;
use crate::tests::*;

use super::*;

use std::cell::{Cell, RefCell};
use std::rc::Rc;

const DOUBLE_A: &str = "
S -> NP
NP -> A
A -> 'x' | B
B -> 'x'
";

const EMPTY_NP: &str = "
S -> NP VP
NP ->
VP -> 'go'
";

#[derive(Clone, Default)]
struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }
    fn flush(&mut self) -> io::Result<()> { Ok(()) }
}

impl SharedBuf {
    fn text(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).unwrap()
    }
}

#[test]
fn single_parse() {
    assert_eq!(parse_strings(cfg(TOY_GRAMMAR), "a b"), vec!["(S (NP a) (VP b))"]);
    assert!(parse_strings(cfg(TOY_GRAMMAR), "b a").is_empty());
}

#[test]
fn two_justifications_on_one_edge() {
    let mut parser = ChartParser::new(cfg(DOUBLE_A));
    let chart = parser.chart_parse(tokens("x")).unwrap();
    let np = Edge::new((0, 1), nt("NP"), vec![nt("A")].into(), 1);
    let np = chart.id_of(&np).unwrap();
    assert_eq!(chart.child_pointer_lists(np).unwrap().count(), 2);

    assert_eq!(parse_strings(cfg(DOUBLE_A), "x"), vec!["(S (NP (A x)))", "(S (NP (A (B x))))"]);
}

#[test]
fn empty_productions_at_both_boundaries() {
    let mut parser = ChartParser::new(cfg(EMPTY_NP));
    let chart = parser.chart_parse(tokens("go")).unwrap();
    for i in 0..=1 {
        let empty = Edge::new((i, i), nt("NP"), Vec::<Symbol>::new().into(), 0);
        assert!(chart.contains(&empty), "no empty NP at {}", i);
    }
    assert_eq!(parse_strings(cfg(EMPTY_NP), "go"), vec!["(S (NP ) (VP go))"]);
}

#[test]
fn uncovered_tokens_are_rejected_up_front() {
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR));
    assert_eq!(parser.parse(tokens("a zebra")).err(),
               Some(Error::UncoveredToken { token: "zebra".to_string(), position: 1 }));
}

#[test]
fn agenda_and_full_passes_agree() {
    let sentence = tokens("john saw mary with det n");
    let mut agenda = ChartParser::new(cfg(PP_GRAMMAR));
    let mut passes = ChartParser::new(cfg(PP_GRAMMAR)).loop_mode(LoopMode::FullPass);

    let (a, a_stats) = agenda.chart_parse_with_stats(sentence.clone()).unwrap();
    let (p, p_stats) = passes.chart_parse_with_stats(sentence.clone()).unwrap();
    assert_eq!(edge_strings(&a), edge_strings(&p));
    assert_eq!(a_stats.edges, p_stats.edges);
    assert_eq!(a_stats.cpls, p_stats.cpls);

    let mut a_trees: Vec<String> = agenda.parse(sentence.clone()).unwrap().iter().map(|t| t.to_string()).collect();
    let mut p_trees: Vec<String> = passes.parse(sentence).unwrap().iter().map(|t| t.to_string()).collect();
    a_trees.sort();
    p_trees.sort();
    assert_eq!(a_trees.len(), 2);
    assert_eq!(a_trees, p_trees);
}

#[test]
fn stats_describe_the_final_chart() {
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR));
    let (chart, stats) = parser.chart_parse_with_stats(tokens("a b")).unwrap();
    assert_eq!(stats.edges, chart.num_edges());
    assert_eq!(stats.cpls, chart.num_cpls());
    // two axioms, then two rules for each of the six edges
    assert_eq!(stats.rule_applications, 2 + 2 * 6);
}

#[test]
fn chart_only_grows() {
    let sizes = Rc::new(RefCell::new(Vec::new()));
    let recorded = Rc::clone(&sizes);
    let mut parser = ChartParser::new(cfg(PP_GRAMMAR)).trace_hook(Box::new(
        move |chart: &Chart<Symbol>, _: ChartRule, _: &[EdgeId]| -> std::result::Result<(), Box<dyn StdError>> {
            recorded.borrow_mut().push((chart.num_edges(), chart.num_cpls()));
            Ok(())
        }));
    parser.chart_parse(tokens("john saw mary with det n")).unwrap();
    let sizes = sizes.borrow();
    assert!(!sizes.is_empty());
    assert!(sizes.windows(2).all(|w| w[0].0 <= w[1].0 && w[0].1 <= w[1].1));
}

#[test]
fn failing_trace_hook_does_not_abort() {
    let calls = Rc::new(Cell::new(0));
    let counted = Rc::clone(&calls);
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR)).trace_hook(Box::new(
        move |_: &Chart<Symbol>, _: ChartRule, _: &[EdgeId]| -> std::result::Result<(), Box<dyn StdError>> {
            counted.set(counted.get() + 1);
            Err("trace sink closed".into())
        }));
    assert_eq!(parser.parse(tokens("a b")).unwrap().len(), 1);
    assert!(calls.get() > 1);
}

#[test]
fn hook_sees_every_rule_application() {
    let calls = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&calls);
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR)).trace_hook(Box::new(
        move |_: &Chart<Symbol>, rule: ChartRule, changed: &[EdgeId]| -> std::result::Result<(), Box<dyn StdError>> {
            seen.borrow_mut().push((rule, changed.len()));
            Ok(())
        }));
    let (_, stats) = parser.chart_parse_with_stats(tokens("a b")).unwrap();
    let calls = calls.borrow();
    assert_eq!(calls.len(), stats.rule_applications);
    // TOY has no empty productions, so Empty Predict runs and derives nothing
    assert!(calls.contains(&(ChartRule::EmptyPredict, 0)));
}

#[test]
fn pretty_trace_prints_a_row_per_change() {
    let buf = SharedBuf::default();
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR)).trace_hook(pretty_trace_into(1, 50, buf.clone()));
    let chart = parser.chart_parse(tokens("a b")).unwrap();
    let text = buf.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], chart.pretty_format_leaves(16));
    assert_eq!(lines.len(), 1 + chart.num_edges());
    assert!(lines[1..].iter().all(|l| l.starts_with('|')));
    assert!(lines.last().unwrap().ends_with("| [0:2] S -> NP VP *"));

    let buf = SharedBuf::default();
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR)).trace_hook(pretty_trace_into(2, 50, buf.clone()));
    parser.chart_parse(tokens("a b")).unwrap();
    assert!(buf.text().lines().any(|l| l == "Leaf Init:"));

    let buf = SharedBuf::default();
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR)).trace_hook(pretty_trace_into(0, 50, buf.clone()));
    parser.chart_parse(tokens("a b")).unwrap();
    assert_eq!(buf.text(), "");
}

#[test]
fn parse_all_keeps_sentence_order() {
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR));
    let results = parser.parse_all(vec![tokens("a b"), tokens("b a"), tokens("a b")]).unwrap();
    let counts: Vec<usize> = results.iter().map(|trees| trees.len()).collect();
    assert_eq!(counts, vec![1, 0, 1]);
}

#[test]
fn restricted_strategy_finds_nothing() {
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR)).strategy(vec![ChartRule::LeafInit]);
    let chart = parser.chart_parse(tokens("a b")).unwrap();
    assert_eq!(chart.num_edges(), 2);
    assert!(parser.parse(tokens("a b")).unwrap().is_empty());
}
