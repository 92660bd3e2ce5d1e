use ncl_core::{ElementId, point};
use ncl_graph::{Direction, GadgetConfig, Graph, Weight};
use proptest::prelude::*;

type EdgeSpec = (usize, usize, bool);

fn build(vertices: usize, edges: &[EdgeSpec]) -> Graph {
    let mut g = Graph::new();
    for i in 0..vertices {
        g.add_vertex(format!("v{i}").as_str(), point(i as f64, 0.0), i % 2 == 0).unwrap();
    }
    for (i, &(from, to, double)) in edges.iter().enumerate() {
        let weight = if double { Weight::Double } else { Weight::Single };
        g.add_edge(
            format!("e{i}").as_str(),
            format!("v{}", from % vertices).as_str(),
            format!("v{}", to % vertices).as_str(),
            weight,
        )
        .unwrap();
    }
    g
}

fn graph_strategy() -> impl Strategy<Value = (usize, Vec<EdgeSpec>, Vec<usize>)> {
    (2usize..8).prop_flat_map(|n| {
        (
            Just(n),
            prop::collection::vec((0..n, 0..n, any::<bool>()), 0..16),
            prop::collection::vec(0usize..16, 0..24),
        )
    })
}

fn total_flow(g: &Graph) -> (u32, u32) {
    g.vertices()
        .fold((0, 0), |(i, o), v| (i + v.inflow(), o + v.outflow()))
}

#[test]
fn add_edge_records_endpoints_and_directions() {
    let mut g = build(2, &[]);
    g.add_edge("e", "v0", "v1", Weight::Double).unwrap();
    let e = g.edge("e").unwrap();
    assert_eq!(e.from(), &ElementId::new("v0"));
    assert_eq!(e.to(), &ElementId::new("v1"));
    assert_eq!(e.relative_direction(&ElementId::new("v0")).unwrap(), Direction::Outgoing);
    assert_eq!(e.relative_direction(&ElementId::new("v1")).unwrap(), Direction::Incoming);
    assert!(g.vertex("v0").unwrap().edge_ids().contains(&ElementId::new("e")));
    assert!(g.vertex("v1").unwrap().edge_ids().contains(&ElementId::new("e")));
}

#[test]
fn default_rule_counts_weights() {
    let mut g = build(3, &[]);
    g.add_edge("a", "v1", "v0", Weight::Single).unwrap();
    assert!(!g.vertex("v0").unwrap().constraint_satisfied());
    g.add_edge("b", "v2", "v0", Weight::Single).unwrap();
    assert!(g.vertex("v0").unwrap().constraint_satisfied());
    // v1 is hidden and never constrained
    assert!(g.vertex("v1").unwrap().constraint_satisfied());
}

#[test]
fn edge_geometry_follows_orientation() {
    let mut g = build(2, &[]);
    g.add_vertex("far", point(4.0, 2.0), true).unwrap();
    g.add_edge("e", "v0", "far", Weight::Single).unwrap();
    assert_eq!(g.edge_center("e").unwrap(), point(2.0, 1.0));
    assert_eq!(g.edge_delta("e").unwrap(), point(4.0, 2.0));
    g.reverse_edge("e").unwrap();
    assert_eq!(g.edge_delta("e").unwrap(), point(-4.0, -2.0));
    assert!(matches!(g.edge_center("nope"), Err(ncl_core::NclError::NotFound { .. })));
}

#[test]
fn removing_a_port_vertex_is_reported_by_integrity() {
    let mut g = Graph::new();
    g.add_component("c", point(0.0, 0.0), GadgetConfig::Converter).unwrap();
    assert!(g.check_integrity().is_ok());
    g.remove_vertex("c.port").unwrap();
    assert!(g.check_integrity().is_err());
}

proptest! {
    #[test]
    fn flow_is_conserved((n, edges, flips) in graph_strategy()) {
        let mut g = build(n, &edges);
        let weight: u32 = edges.iter().map(|e| if e.2 { 2 } else { 1 }).sum();

        for flip in flips {
            if !edges.is_empty() {
                g.reverse_edge(format!("e{}", flip % edges.len()).as_str()).unwrap();
            }
            let (inflow, outflow) = total_flow(&g);
            let loops: u32 = g
                .edges()
                .filter(|e| e.circular())
                .map(|e| e.weight().value())
                .sum();
            prop_assert_eq!(inflow, weight);
            prop_assert_eq!(outflow + loops, weight);
        }
        prop_assert!(g.check_integrity().is_ok());
    }

    #[test]
    fn reversing_twice_restores((n, edges, _flips) in graph_strategy()) {
        prop_assume!(!edges.is_empty());
        let mut g = build(n, &edges);
        let before: Vec<(ElementId, ElementId)> =
            g.edges().map(|e| (e.from().clone(), e.to().clone())).collect();
        let verdicts: Vec<bool> = g.vertices().map(|v| v.constraint_satisfied()).collect();

        g.reverse_edge("e0").unwrap();
        g.reverse_edge("e0").unwrap();

        let after: Vec<(ElementId, ElementId)> =
            g.edges().map(|e| (e.from().clone(), e.to().clone())).collect();
        prop_assert_eq!(before, after);
        prop_assert_eq!(verdicts, g.vertices().map(|v| v.constraint_satisfied()).collect::<Vec<_>>());
    }

    #[test]
    fn removal_leaves_no_dangling_edges((n, edges, flips) in graph_strategy()) {
        let mut g = build(n, &edges);
        let victim = format!("v{}", flips.first().copied().unwrap_or(0) % n);
        g.remove_vertex(victim.as_str()).unwrap();

        let victim = ElementId::new(victim);
        for e in g.edges() {
            prop_assert!(e.from() != &victim && e.to() != &victim);
        }
        for v in g.vertices() {
            for id in v.edge_ids() {
                prop_assert!(g.has_edge(id));
            }
        }
        prop_assert!(g.check_integrity().is_ok());
    }

    #[test]
    fn every_call_notifies_once((n, edges, flips) in graph_strategy()) {
        let mut g = build(n, &edges);
        prop_assume!(!edges.is_empty());
        let start = g.revision();
        for (i, flip) in flips.iter().enumerate() {
            g.reverse_edge(format!("e{}", flip % edges.len()).as_str()).unwrap();
            prop_assert_eq!(g.revision(), start + i as u64 + 1);
        }
        // failed calls leave the counter alone
        let before = g.revision();
        prop_assert!(g.reverse_edge("missing").is_err());
        prop_assert_eq!(g.revision(), before);
    }
}
