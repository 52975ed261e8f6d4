// This is actually defined at `crate::chart::tests_for_chart`

use crate::edge::{Attr, AttrValue, Constraint};
use crate::error::Error;
use crate::tests::*;

use super::*;

fn np_at(start: usize, end: usize, dot: usize) -> Edge<Symbol> {
    Edge::new((start, end), nt("NP"), vec![t("det"), t("n")].into(), dot)
}

fn seeded() -> Chart<Symbol> {
    let mut chart = Chart::new(tokens("det n"));
    chart.insert(Edge::leaf("det", 0), [Cpl::new()]).unwrap();
    chart.insert(Edge::leaf("n", 1), [Cpl::new()]).unwrap();
    chart
}

#[test]
fn reinserting_a_pair_changes_nothing() {
    let mut chart = seeded();
    let first = chart.insert(np_at(0, 1, 1), [vec![EdgeId(0)]]).unwrap();
    assert_eq!(first, Changed::Changed(EdgeId(2)));
    let (edges, cpls) = (chart.num_edges(), chart.num_cpls());

    assert_eq!(chart.insert(np_at(0, 1, 1), [vec![EdgeId(0)]]).unwrap(), Changed::Unchanged);
    assert_eq!((chart.num_edges(), chart.num_cpls()), (edges, cpls));

    // same edge, new justification
    assert_eq!(chart.insert(np_at(0, 1, 1), [vec![EdgeId(1)]]).unwrap(), Changed::Changed(EdgeId(2)));
    assert_eq!((chart.num_edges(), chart.num_cpls()), (edges, cpls + 1));
}

#[test]
fn leaves_are_looked_up_by_position() {
    let chart = seeded();
    assert_eq!(chart.leaf(0), Some("det"));
    assert_eq!(chart.leaf(1), Some("n"));
    assert_eq!(chart.leaf(2), None);
    assert_eq!(chart.leaves(), &["det".to_string(), "n".to_string()]);
}

#[test]
fn an_edge_needs_a_justification() {
    let mut chart = seeded();
    assert_eq!(chart.insert(np_at(0, 1, 1), std::iter::empty()).unwrap(), Changed::Unchanged);
    assert!(!chart.contains(&np_at(0, 1, 1)));
}

#[test]
fn cpls_keep_discovery_order() {
    let mut chart = seeded();
    let id = chart.insert(np_at(0, 1, 1), [vec![EdgeId(1)]]).unwrap().edge().unwrap();
    chart.insert(np_at(0, 1, 1), [vec![EdgeId(0)], vec![EdgeId(1)]]).unwrap();
    let cpls: Vec<&Cpl> = chart.child_pointer_lists(id).unwrap().collect();
    assert_eq!(cpls, vec![&vec![EdgeId(1)], &vec![EdgeId(0)]]);
}

#[test]
fn backpointers_extend_every_cpl() {
    let mut chart = seeded();
    let left = chart.insert(np_at(0, 1, 1), [vec![EdgeId(0)], vec![EdgeId(1)]]).unwrap().edge().unwrap();
    let done = chart.insert_with_backpointer(np_at(0, 2, 2), left, EdgeId(1)).unwrap().edge().unwrap();
    let cpls: Vec<Cpl> = chart.child_pointer_lists(done).unwrap().cloned().collect();
    assert_eq!(cpls, vec![vec![EdgeId(0), EdgeId(1)], vec![EdgeId(1), EdgeId(1)]]);
}

#[test]
fn dangling_children_fail_fast() {
    let mut chart = seeded();
    assert_eq!(chart.insert(np_at(0, 1, 1), [vec![EdgeId(9)]]), Err(Error::DanglingChild(EdgeId(9))));
    assert_eq!(chart.num_edges(), 2);
    assert_eq!(chart.edge(EdgeId(9)).err(), Some(Error::EdgeNotInChart(EdgeId(9))));
    assert!(chart.child_pointer_lists(EdgeId(9)).is_err());
}

#[test]
fn selections_see_later_insertions() {
    let mut chart = seeded();
    let mut complete_at_0 = chart.select(&[Constraint::start(0), Constraint::is_complete(true)]).unwrap();
    assert_eq!(complete_at_0.next_edge(&chart), Some(EdgeId(0)));
    assert_eq!(complete_at_0.next_edge(&chart), None);

    chart.insert(np_at(0, 1, 1), [vec![EdgeId(0)]]).unwrap();
    let done = chart.insert(np_at(0, 2, 2), [vec![EdgeId(0), EdgeId(1)]]).unwrap().edge().unwrap();
    assert_eq!(complete_at_0.next_edge(&chart), Some(done));
    assert_eq!(complete_at_0.next_edge(&chart), None);

    let mut all = chart.select(&[]).unwrap();
    let mut seen = 0;
    while let Some(id) = all.next_edge(&chart) {
        if id == EdgeId(0) {
            chart.insert(np_at(1, 1, 0), [Cpl::new()]).unwrap();
        }
        seen += 1;
    }
    assert_eq!(seen, 5);
}

#[test]
fn constraint_order_does_not_matter() {
    let mut chart = seeded();
    chart.insert(np_at(0, 1, 1), [vec![EdgeId(0)]]).unwrap();
    let a = chart.select(&[Constraint::end(1), Constraint::lhs(t("det"))]).unwrap().collect_from(&chart);
    let b = chart.select(&[Constraint::lhs(t("det")), Constraint::end(1)]).unwrap().collect_from(&chart);
    assert_eq!(a, vec![EdgeId(0)]);
    assert_eq!(a, b);
    assert_eq!(chart.query(&[Constraint::end(1)]).unwrap(), vec![EdgeId(0), EdgeId(2)]);
}

#[test]
fn bad_constraints_are_reported() {
    let mut chart = seeded();
    let repeated = chart.select(&[Constraint::start(0), Constraint::start(1)]);
    assert!(matches!(repeated, Err(Error::InvalidConstraint(_))));

    let wrong_shape = Constraint { attr: Attr::Lhs, value: AttrValue::Pos(0) };
    assert!(matches!(chart.query(&[wrong_shape]), Err(Error::InvalidConstraint(_))));

    let named = Constraint::named("nextsym", AttrValue::Key(t("n"))).unwrap();
    assert!(chart.query(&[named]).unwrap().is_empty());
}
