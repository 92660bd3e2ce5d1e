//! Vertices and their flow queries.

use core::fmt;
use core::ops::Deref;
use std::collections::BTreeSet;

use ncl_core::{ElementId, Point, point, unit};

use crate::edge::{Direction, EdgeRef, Weight};
use crate::gate::{self, Gate};
use crate::graph::Graph;

/// A node of the constraint graph.
///
/// Vertices only store the keys of their incident edges; every query that
/// needs edge data goes through [`VertexRef`].
#[derive(Debug, Clone, PartialEq)]
pub struct Vertex {
    pub(crate) id: ElementId,
    pub(crate) position: Point,
    pub(crate) visible: bool,
    pub(crate) muted: bool,
    pub(crate) edges: BTreeSet<ElementId>,
    pub(crate) gate: Gate,
}

impl Vertex {
    pub(crate) fn new(id: ElementId, position: Point, visible: bool, gate: Gate) -> Self {
        Self {
            id,
            position,
            visible,
            muted: false,
            edges: BTreeSet::new(),
            gate,
        }
    }

    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn visible(&self) -> bool {
        self.visible
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Keys of every incident edge, ordered by id.
    pub fn edge_ids(&self) -> &BTreeSet<ElementId> {
        &self.edges
    }

    /// The predicate attached to this vertex.
    pub fn gate(&self) -> &Gate {
        &self.gate
    }
}

impl fmt::Display for Vertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}, {})", self.id, self.position.x, self.position.y)
    }
}

/// A vertex together with the graph it lives in.
#[derive(Clone, Copy)]
pub struct VertexRef<'g> {
    pub(crate) graph: &'g Graph,
    pub(crate) vertex: &'g Vertex,
}

impl<'g> VertexRef<'g> {
    /// Incident edges, ordered by id.
    pub fn edges(self) -> impl Iterator<Item = EdgeRef<'g>> + 'g {
        let graph: &'g Graph = self.graph;
        let vertex: &'g Vertex = self.vertex;
        vertex.edges.iter().filter_map(move |id| graph.edge(id).ok())
    }

    fn relative_edges(self, direction: Direction) -> impl Iterator<Item = EdgeRef<'g>> + 'g {
        let vertex: &'g Vertex = self.vertex;
        self.edges()
            .filter(move |e| e.relative_direction(&vertex.id).ok() == Some(direction))
    }

    pub fn incoming_edges(self) -> impl Iterator<Item = EdgeRef<'g>> + 'g {
        self.relative_edges(Direction::Incoming)
    }

    pub fn outgoing_edges(self) -> impl Iterator<Item = EdgeRef<'g>> + 'g {
        self.relative_edges(Direction::Outgoing)
    }

    /// Sum of weights of edges pointing into this vertex.
    pub fn inflow(&self) -> u32 {
        self.incoming_edges().map(|e| e.weight.value()).sum()
    }

    /// Sum of weights of edges pointing away from this vertex.
    pub fn outflow(&self) -> u32 {
        self.outgoing_edges().map(|e| e.weight.value()).sum()
    }

    /// Receiving: some non-circular edge points into this vertex.
    pub fn is_input(&self) -> bool {
        self.incoming_edges().any(|e| !e.circular())
    }

    /// Driving outward: some non-circular edge points away from this vertex.
    pub fn is_output(&self) -> bool {
        self.outgoing_edges().any(|e| !e.circular())
    }

    /// Exactly `singles` weight-1 and `doubles` weight-2 edges are incident.
    pub fn port_connected(&self, singles: usize, doubles: usize) -> bool {
        let (mut s, mut d) = (0, 0);
        for e in self.edges() {
            match e.weight {
                Weight::Single => s += 1,
                Weight::Double => d += 1,
            }
        }
        s == singles && d == doubles
    }

    /// Result of the attached predicate against the committed state.
    pub fn constraint_satisfied(&self) -> bool {
        gate::vertex_satisfied(self.graph, *self)
    }

    /// Layout hint: the negated mean of unit vectors toward the neighbours.
    ///
    /// Self-loops and neighbours sharing this vertex's position are ignored;
    /// without any neighbour the hint points left.
    pub fn preferred_edge_direction(&self) -> Point {
        let here = self.vertex.position;
        let directions: Vec<Point> = self
            .edges()
            .filter_map(|e| e.opposite(&self.vertex.id).ok().cloned())
            .filter(|other| *other != self.vertex.id)
            .filter_map(|other| self.graph.vertex(&other).ok())
            .filter_map(|v| unit(v.position() - here))
            .collect();

        if directions.is_empty() {
            return point(-1.0, 0.0);
        }
        let sum = directions.iter().fold(point(0.0, 0.0), |acc, d| acc + d);
        -(sum / directions.len() as f64)
    }
}

impl Deref for VertexRef<'_> {
    type Target = Vertex;

    fn deref(&self) -> &Vertex {
        self.vertex
    }
}

impl fmt::Debug for VertexRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.vertex, f)
    }
}
