//! ncl-graph: the constraint graph engine.
//!
//! Provides:
//! - Vertex/Edge/Component/Label arenas behind a single mutation API
//! - Gadget predicates (converter, existential, universal, CNF evaluator)
//! - A CNF formula parser
//! - The two-phase validation pass that commits universal latches
//!
//! # Example
//!
//! ```
//! use ncl_core::point;
//! use ncl_graph::{Graph, Weight};
//!
//! let mut graph = Graph::new();
//! graph.add_vertex("a", point(0.0, 0.0), true).unwrap();
//! graph.add_vertex("b", point(1.0, 0.0), true).unwrap();
//! graph.add_edge("ab", "a", "b", Weight::Double).unwrap();
//!
//! assert!(graph.vertex("b").unwrap().constraint_satisfied());
//! assert!(!graph.vertex("a").unwrap().constraint_satisfied());
//!
//! graph.reverse_edge("ab").unwrap();
//! assert!(graph.vertex("a").unwrap().constraint_satisfied());
//! ```

pub mod cnf;
pub mod component;
pub mod edge;
pub mod gate;
pub mod graph;
mod integrity;
pub mod label;
pub mod pass;
pub mod vertex;

// Re-exports for ergonomics
pub use cnf::{CnfFormula, Literal};
pub use component::{Component, GadgetConfig, GadgetKind};
pub use edge::{Direction, Edge, EdgeRef, Weight};
pub use gate::{CnfPort, Gate, GateKind, LatchRequest, QuantifierPort};
pub use graph::Graph;
pub use label::{Align, Label};
pub use pass::{Validation, ValidationPass};
pub use vertex::{Vertex, VertexRef};
