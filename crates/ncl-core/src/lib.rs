//! ncl-core: shared foundation for the constraint logic workspace.
//!
//! Contains:
//! - ids (structured, dotted-path identifiers for graph entities)
//! - error (the error taxonomy shared by every crate)
//! - geometry (2D points and bounding boxes, cosmetic only)

pub mod error;
pub mod geometry;
pub mod ids;

// Re-exports: nice ergonomics for downstream crates
pub use error::{EntityKind, NclError, NclResult};
pub use geometry::*;
pub use ids::ElementId;
