//! Gadget behaviour driven through the public graph API.

use ncl_core::{ElementId, point};
use ncl_graph::{GadgetConfig, Graph, QuantifierPort, ValidationPass, Weight};

/// Attach a hidden (always satisfied) driver to `port`.
///
/// `active` orients the wire so that the port is receiving for input ports
/// (`tryin`, `satin`, literals) and driving outward for output ports.
fn wire(g: &mut Graph, port: &str, weight: Weight, into_port: bool) -> ElementId {
    let driver = format!("drv.{port}");
    let edge = format!("w.{port}");
    g.add_vertex(driver.as_str(), point(-5.0, -5.0), false).unwrap();
    if into_port {
        g.add_edge(edge.as_str(), driver.as_str(), port, weight).unwrap();
    } else {
        g.add_edge(edge.as_str(), port, driver.as_str(), weight).unwrap();
    }
    ElementId::from(edge.as_str())
}

fn quantifier(config: GadgetConfig) -> Graph {
    let mut g = Graph::new();
    g.add_component("q", point(0.0, 0.0), config).unwrap();
    for port in QuantifierPort::ALL {
        let (singles, _) = port.arity();
        let weight = if singles == 1 { Weight::Single } else { Weight::Double };
        // inactive position: inputs are not receiving, outputs are not driving
        let into_port = matches!(
            port,
            QuantifierPort::TryOut | QuantifierPort::SatOut | QuantifierPort::Out | QuantifierPort::Inv
        );
        wire(&mut g, &format!("q.{}", port.name()), weight, into_port);
    }
    g
}

fn flip(g: &mut Graph, port: &str) {
    g.reverse_edge(format!("w.q.{port}").as_str()).unwrap();
}

#[test]
fn converter_needs_one_of_each_weight_and_inflow() {
    let mut g = Graph::new();
    g.add_component("c", point(0.0, 0.0), GadgetConfig::Converter).unwrap();
    g.add_vertex("a", point(-1.0, 0.0), false).unwrap();
    g.add_vertex("b", point(1.0, 0.0), false).unwrap();
    g.add_edge("single", "a", "c.port", Weight::Single).unwrap();
    g.add_edge("double", "c.port", "b", Weight::Double).unwrap();

    // weight-1 in, weight-2 out
    assert_eq!(g.vertex("c.port").unwrap().inflow(), 1);
    assert!(g.vertex("c.port").unwrap().constraint_satisfied());

    // both outgoing
    g.reverse_edge("single").unwrap();
    assert_eq!(g.vertex("c.port").unwrap().inflow(), 0);
    assert!(!g.vertex("c.port").unwrap().constraint_satisfied());

    // weight-2 in drives the weight-1 wire out
    g.reverse_edge("double").unwrap();
    assert!(g.vertex("c.port").unwrap().constraint_satisfied());

    // a third wire breaks the arity
    g.add_edge("extra", "b", "c.port", Weight::Single).unwrap();
    assert!(!g.vertex("c.port").unwrap().constraint_satisfied());
    assert!(!g.component_satisfied("c").unwrap());
}

#[test]
fn existential_initial_position_is_satisfied() {
    let g = quantifier(GadgetConfig::Existential { variable: 'x' });
    assert!(g.component_satisfied("q").unwrap());
}

#[test]
fn existential_try_requires_tryin() {
    let mut g = quantifier(GadgetConfig::Existential { variable: 'x' });
    flip(&mut g, "tryout");
    assert!(!g.component_satisfied("q").unwrap());
    flip(&mut g, "tryin");
    assert!(g.component_satisfied("q").unwrap());
}

#[test]
fn existential_rejects_both_assignments() {
    let mut g = quantifier(GadgetConfig::Existential { variable: 'x' });
    flip(&mut g, "tryin");
    flip(&mut g, "tryout");
    flip(&mut g, "out");
    assert!(g.component_satisfied("q").unwrap());
    flip(&mut g, "inv");
    assert!(!g.component_satisfied("q").unwrap());
    // every port reports the gadget-wide verdict
    assert!(!g.vertex("q.tryin").unwrap().constraint_satisfied());
}

#[test]
fn existential_sat_requires_satin() {
    let mut g = quantifier(GadgetConfig::Existential { variable: 'x' });
    flip(&mut g, "satout");
    assert!(!g.component_satisfied("q").unwrap());
    flip(&mut g, "satin");
    assert!(g.component_satisfied("q").unwrap());
}

#[test]
fn port_arity_is_enforced() {
    let mut g = quantifier(GadgetConfig::Existential { variable: 'x' });
    g.add_vertex("stray", point(0.0, 0.0), false).unwrap();
    g.add_edge("stray.edge", "stray", "q.out", Weight::Single).unwrap();
    assert!(!g.vertex("q.out").unwrap().constraint_satisfied());
    assert!(g.vertex("q.inv").unwrap().constraint_satisfied());
}

#[test]
fn universal_requires_exactly_one_assignment() {
    let mut g = quantifier(GadgetConfig::Universal { variable: 'x' });
    flip(&mut g, "tryin");
    flip(&mut g, "tryout");
    assert!(!g.component_satisfied("q").unwrap());
    flip(&mut g, "inv");
    assert!(g.component_satisfied("q").unwrap());
    flip(&mut g, "out");
    assert!(!g.component_satisfied("q").unwrap());
}

/// Universal gadget requesting SET: tried, satin fed by a satisfied source,
/// inv driving.
fn universal_requesting_set() -> Graph {
    let mut g = quantifier(GadgetConfig::Universal { variable: 'x' });
    flip(&mut g, "tryin");
    flip(&mut g, "satin");
    flip(&mut g, "inv");
    g
}

const ORDER: [&str; 6] = ["q.satout", "q.out", "q.inv", "q.satin", "q.tryout", "q.tryin"];

fn run_pass(g: &mut Graph, order: &[&str]) -> Vec<bool> {
    let mut pass = ValidationPass::new();
    let verdicts = order.iter().map(|id| pass.visit(g, *id).unwrap()).collect();
    pass.commit(g);
    verdicts
}

fn verdicts_by_port(order: &[&str], verdicts: &[bool]) -> Vec<(String, bool)> {
    let mut pairs: Vec<(String, bool)> = order
        .iter()
        .map(|s| s.to_string())
        .zip(verdicts.iter().copied())
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn latch_set_is_order_independent() {
    let mut forward = universal_requesting_set();
    let mut backward = forward.clone();
    let reversed: Vec<&str> = ORDER.iter().rev().copied().collect();

    let a = run_pass(&mut forward, &ORDER);
    let b = run_pass(&mut backward, &reversed);

    assert_eq!(verdicts_by_port(&ORDER, &a), verdicts_by_port(&reversed, &b));
    assert_eq!(forward.component("q").unwrap().latch(), Some(true));
    assert_eq!(backward.component("q").unwrap().latch(), Some(true));
}

#[test]
fn latch_clear_is_order_independent() {
    let mut g = universal_requesting_set();
    g.validate();
    assert_eq!(g.component("q").unwrap().latch(), Some(true));

    // retract the try: CLEAR requested
    flip(&mut g, "tryin");
    flip(&mut g, "satin");
    let mut forward = g.clone();
    let mut backward = g;
    let reversed: Vec<&str> = ORDER.iter().rev().copied().collect();

    let a = run_pass(&mut forward, &ORDER);
    let b = run_pass(&mut backward, &reversed);

    assert_eq!(verdicts_by_port(&ORDER, &a), verdicts_by_port(&reversed, &b));
    assert_eq!(forward.component("q").unwrap().latch(), Some(false));
    assert_eq!(backward.component("q").unwrap().latch(), Some(false));
}

#[test]
fn conflicting_requests_resolve_to_clear_in_any_order() {
    let mut g = universal_requesting_set();
    g.validate();
    assert_eq!(g.component("q").unwrap().latch(), Some(true));
    // set conditions still hold while tryin goes inactive
    flip(&mut g, "tryin");
    let mut forward = g.clone();
    let mut backward = g;
    let reversed: Vec<&str> = ORDER.iter().rev().copied().collect();

    run_pass(&mut forward, &ORDER);
    run_pass(&mut backward, &reversed);
    assert_eq!(forward.component("q").unwrap().latch(), Some(false));
    assert_eq!(backward.component("q").unwrap().latch(), Some(false));
}

#[test]
fn satout_sees_latch_only_after_commit() {
    let mut g = universal_requesting_set();
    // switch to out and drive satout within the same position
    flip(&mut g, "inv");
    flip(&mut g, "out");
    flip(&mut g, "satout");
    // latch never set: satout is illegal
    assert!(!g.validate().all_satisfied());

    let mut g = universal_requesting_set();
    let first = g.validate();
    assert!(first.all_satisfied());
    assert_eq!(first.latch_changes, vec![(ElementId::new("q"), true)]);

    flip(&mut g, "inv");
    flip(&mut g, "out");
    flip(&mut g, "satout");
    let second = g.validate();
    assert!(second.all_satisfied());
    assert!(second.latch_changes.is_empty());
}

#[test]
fn pass_commit_notifies_only_on_latch_change() {
    let mut g = universal_requesting_set();
    g.take_changed();
    let before = g.revision();
    g.validate();
    assert_eq!(g.revision(), before + 1);
    assert!(g.take_changed());
    g.validate();
    assert_eq!(g.revision(), before + 1);
    assert!(!g.take_changed());
}

#[test]
fn cnf_output_requires_true_formula() {
    let mut g = Graph::new();
    g.add_component("f", point(0.0, 0.0), GadgetConfig::Cnf { formula: "(a||!b)&&(b)".into() })
        .unwrap();
    for port in ["f.a", "f.!a", "f.b", "f.!b"] {
        wire(&mut g, port, Weight::Single, false);
    }
    wire(&mut g, "f.satisfied", Weight::Double, true);
    assert!(g.component_satisfied("f").unwrap());

    // drive satisfied while no literal is true
    g.reverse_edge("w.f.satisfied").unwrap();
    assert!(!g.component_satisfied("f").unwrap());

    // b only: first clause fails
    g.reverse_edge("w.f.b").unwrap();
    assert!(!g.component_satisfied("f").unwrap());

    // a and b
    g.reverse_edge("w.f.a").unwrap();
    assert!(g.component_satisfied("f").unwrap());
}

#[test]
fn try_reverse_rejects_illegal_moves() {
    let mut g = Graph::new();
    g.add_vertex("a", point(0.0, 0.0), true).unwrap();
    g.add_vertex("b", point(1.0, 0.0), true).unwrap();
    g.add_edge("loop", "a", "a", Weight::Double).unwrap();
    g.add_edge("ab", "a", "b", Weight::Double).unwrap();
    g.take_changed();

    // b would lose its only inflow
    assert!(!g.try_reverse_edge("ab").unwrap());
    assert_eq!(g.edge("ab").unwrap().from(), &ElementId::new("a"));
    assert!(!g.take_changed());

    g.add_vertex("c", point(2.0, 0.0), true).unwrap();
    g.add_edge("loop.c", "c", "c", Weight::Double).unwrap();
    g.add_edge("cb", "c", "b", Weight::Double).unwrap();
    assert!(g.try_reverse_edge("ab").unwrap());
    assert_eq!(g.edge("ab").unwrap().from(), &ElementId::new("b"));
}
