//! Oriented, weighted edges.

use core::fmt;
use core::ops::Deref;

use ncl_core::{ElementId, NclError, NclResult, Point};

use crate::graph::Graph;
use crate::vertex::VertexRef;

/// Capacity of an edge, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weight {
    /// Single wire.
    Single = 1,
    /// Double wire.
    Double = 2,
}

impl Weight {
    pub fn value(self) -> u32 {
        self as u32
    }
}

impl TryFrom<u32> for Weight {
    type Error = NclError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Weight::Single),
            2 => Ok(Weight::Double),
            other => Err(NclError::format(format!("edge weight must be 1 or 2, got {other}"))),
        }
    }
}

/// Orientation of an edge as seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// The vertex is the edge's sink.
    Incoming,
    /// The vertex is the edge's source.
    Outgoing,
}

/// A connection between two vertices. Only the orientation is mutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub(crate) id: ElementId,
    pub(crate) from: ElementId,
    pub(crate) to: ElementId,
    pub(crate) weight: Weight,
    pub(crate) muted: bool,
    pub(crate) label_visible: bool,
}

impl Edge {
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn from(&self) -> &ElementId {
        &self.from
    }

    pub fn to(&self) -> &ElementId {
        &self.to
    }

    pub fn weight(&self) -> Weight {
        self.weight
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn label_visible(&self) -> bool {
        self.label_visible
    }

    /// A self-loop: a fixed source that always points into its vertex.
    pub fn circular(&self) -> bool {
        self.from == self.to
    }

    /// Classify `vertex` as this edge's sink or source.
    ///
    /// A self-loop is always incoming.
    pub fn relative_direction(&self, vertex: &ElementId) -> NclResult<Direction> {
        if *vertex == self.to {
            Ok(Direction::Incoming)
        } else if *vertex == self.from {
            Ok(Direction::Outgoing)
        } else {
            Err(NclError::referential(format!(
                "vertex {vertex} is not an endpoint of edge {self}"
            )))
        }
    }

    /// The endpoint across the edge from `vertex`.
    pub fn opposite(&self, vertex: &ElementId) -> NclResult<&ElementId> {
        match self.relative_direction(vertex)? {
            Direction::Incoming => Ok(&self.from),
            Direction::Outgoing => Ok(&self.to),
        }
    }

    pub(crate) fn reverse(&mut self) {
        core::mem::swap(&mut self.from, &mut self.to);
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({} -> {})", self.id, self.from, self.to)
    }
}

/// An edge together with the graph it lives in, for derived geometry and
/// endpoint queries.
#[derive(Clone, Copy)]
pub struct EdgeRef<'g> {
    pub(crate) graph: &'g Graph,
    pub(crate) edge: &'g Edge,
}

impl<'g> EdgeRef<'g> {
    pub fn source(&self) -> Option<VertexRef<'g>> {
        self.graph.vertex(&self.edge.from).ok()
    }

    pub fn sink(&self) -> Option<VertexRef<'g>> {
        self.graph.vertex(&self.edge.to).ok()
    }

    /// Midpoint between the endpoints.
    pub fn center(&self) -> Option<Point> {
        let (from, to) = (self.source()?, self.sink()?);
        Some((from.position() + to.position()) / 2.0)
    }

    /// Vector from the source to the sink.
    pub fn delta(&self) -> Option<Point> {
        let (from, to) = (self.source()?, self.sink()?);
        Some(to.position() - from.position())
    }

    /// Both endpoints satisfied. Used for highlighting only.
    pub fn constraint_satisfied(&self) -> bool {
        match (self.source(), self.sink()) {
            (Some(from), Some(to)) => from.constraint_satisfied() && to.constraint_satisfied(),
            _ => false,
        }
    }
}

impl Deref for EdgeRef<'_> {
    type Target = Edge;

    fn deref(&self) -> &Edge {
        self.edge
    }
}

impl fmt::Debug for EdgeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.edge, f)
    }
}
