// This is actually defined at `crate::trees::tests_for_trees`

use crate::error::Error;
use crate::tests::*;

use super::*;

const CYCLE: &str = "
S -> A
A -> B | 'x'
B -> A
";

fn strings(trees: &[Tree<Symbol>]) -> Vec<String> {
    trees.iter().map(|t| t.to_string()).collect()
}

#[test]
fn unary_cycles_terminate() {
    let mut parser = ChartParser::new(cfg(CYCLE));
    let chart = parser.chart_parse(tokens("x")).unwrap();
    let trees: Vec<Tree<Symbol>> = chart.parses(parser.grammar(), &nt("S")).unwrap()
        .collect::<crate::error::Result<_>>()
        .unwrap();
    // `A -> 'x' *` and `A -> B *` are different edges, so the longer tree
    // repeats no edge; going round the cycle again would
    assert_eq!(strings(&trees), vec!["(S (A x))", "(S (A (B (A x))))"]);
}

fn add(chart: &mut Chart<Symbol>, edge: Edge<Symbol>, cpls: Vec<Vec<EdgeId>>) -> EdgeId {
    chart.insert(edge.clone(), cpls).unwrap();
    chart.id_of(&edge).unwrap()
}

fn unit(lhs: &str, child: Symbol) -> Edge<Symbol> {
    Edge::new((0, 1), nt(lhs), vec![child].into(), 1)
}

/// `P -> Q` and `Q -> P` loop over the one span, with `S -> T` reaching the
/// loop through both `T -> P` and `T -> Q`. `t_p_first` picks which of the
/// two CPLs of the S edge is read first.
fn entangled_cycle(t_p_first: bool) -> (Chart<Symbol>, EdgeId) {
    let mut chart = Chart::new(tokens("x"));
    let leaf = add(&mut chart, Edge::leaf("x", 0), vec![vec![]]);
    let q_x = add(&mut chart, unit("Q", t("x")), vec![vec![leaf]]);
    let p = add(&mut chart, unit("P", nt("Q")), vec![vec![q_x]]);
    let q_p = add(&mut chart, unit("Q", nt("P")), vec![vec![p]]);
    add(&mut chart, unit("P", nt("Q")), vec![vec![q_p]]);
    let t_p = add(&mut chart, unit("T", nt("P")), vec![vec![p]]);
    let t_q = add(&mut chart, unit("T", nt("Q")), vec![vec![q_x], vec![q_p]]);
    let cpls = if t_p_first { vec![vec![t_p], vec![t_q]] } else { vec![vec![t_q], vec![t_p]] };
    let s = add(&mut chart, unit("S", nt("T")), cpls);
    (chart, s)
}

#[test]
fn cycles_cut_the_same_trees_in_any_order() {
    let expected = vec![
        "(S (T (P (Q x))))",
        "(S (T (Q (P (Q x)))))",
        "(S (T (Q x)))",
    ];
    for t_p_first in [true, false] {
        let (chart, s) = entangled_cycle(t_p_first);
        let mut trees = strings(&chart.trees(s, true).unwrap());
        trees.sort();
        assert_eq!(trees, expected, "T -> P * read first: {}", t_p_first);
    }
}

#[test]
fn parses_are_produced_on_demand() {
    let mut parser = ChartParser::new(cfg(PP_GRAMMAR));
    let chart = parser.chart_parse(tokens("john saw mary with det n")).unwrap();
    let mut parses = chart.parses(parser.grammar(), &nt("S")).unwrap();
    let first = parses.next().unwrap().unwrap();
    assert_eq!(first.leaves(), vec!["john", "saw", "mary", "with", "det", "n"]);
    assert!(parses.next().is_some());
    assert!(parses.next().is_none());
}

#[test]
fn roots_must_span_the_input() {
    let mut parser = ChartParser::new(cfg(PP_GRAMMAR));
    let chart = parser.chart_parse(tokens("john saw mary")).unwrap();
    assert_eq!(chart.parses(parser.grammar(), &nt("NP")).unwrap().count(), 0);
    assert_eq!(chart.parses(parser.grammar(), &nt("S")).unwrap().count(), 1);
}

#[test]
fn incomplete_edges_show_what_is_missing() {
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR));
    let chart = parser.chart_parse(tokens("a b")).unwrap();
    let partial = Edge::new((0, 1), nt("S"), vec![nt("NP"), nt("VP")].into(), 1);
    let id = chart.id_of(&partial).unwrap();

    assert_eq!(strings(&chart.trees(id, false).unwrap()), vec!["(S (NP a) (VP ))"]);
    assert!(chart.trees(id, true).unwrap().is_empty());
}

#[test]
fn leaf_edges_are_leaf_trees() {
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR));
    let chart = parser.chart_parse(tokens("a b")).unwrap();
    assert_eq!(chart.trees(EdgeId(1), true).unwrap(), vec![Tree::leaf("b")]);
}

#[test]
fn unknown_edges_are_errors() {
    let mut parser = ChartParser::new(cfg(TOY_GRAMMAR));
    let chart = parser.chart_parse(tokens("a b")).unwrap();
    assert_eq!(chart.trees(EdgeId(99), true), Err(Error::EdgeNotInChart(EdgeId(99))));
}

#[test]
fn products_cover_every_combination() {
    // one S edge with a single CPL; each X below it has two trees
    let g = cfg("
S -> X X
X -> Y
Y -> A | B
A -> 'x'
B -> 'x'
");
    let trees = parse_strings(g, "x x");
    assert_eq!(trees, vec![
        "(S (X (Y (A x))) (X (Y (A x))))",
        "(S (X (Y (A x))) (X (Y (B x))))",
        "(S (X (Y (B x))) (X (Y (A x))))",
        "(S (X (Y (B x))) (X (Y (B x))))",
    ]);
}

#[test]
fn tree_accessors() {
    let tree = Tree::node(nt("S"), vec![
        Tree::node(nt("NP"), vec![Tree::leaf("a")]),
        Tree::node(nt("VP"), vec![]),
    ]);
    assert_eq!(tree.label(), Some(&nt("S")));
    assert_eq!(tree.children().len(), 2);
    assert_eq!(tree.leaves(), vec!["a"]);
    assert_eq!(Tree::<Symbol>::leaf("a").label(), None);
    assert_eq!(tree.to_string(), "(S (NP a) (VP ))");
}
