use core::fmt;

use thiserror::Error;

use crate::ids::ElementId;

pub type NclResult<T> = Result<T, NclError>;

/// The kind of graph entity an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Vertex,
    Edge,
    Component,
    Label,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Vertex => "vertex",
            EntityKind::Edge => "edge",
            EntityKind::Component => "component",
            EntityKind::Label => "label",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NclError {
    #[error("Duplicate id: {kind} {id} already exists")]
    DuplicateId { kind: EntityKind, id: ElementId },

    #[error("Not found: {kind} {id}")]
    NotFound { kind: EntityKind, id: ElementId },

    #[error("Referential integrity violated: {what}")]
    Referential { what: String },

    #[error("Invalid format: {what}")]
    Format { what: String },
}

impl NclError {
    pub fn format(what: impl Into<String>) -> Self {
        NclError::Format { what: what.into() }
    }

    pub fn referential(what: impl Into<String>) -> Self {
        NclError::Referential { what: what.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_entity() {
        let err = NclError::NotFound {
            kind: EntityKind::Edge,
            id: ElementId::from("g.e1"),
        };
        assert_eq!(err.to_string(), "Not found: edge g.e1");

        let err = NclError::DuplicateId {
            kind: EntityKind::Vertex,
            id: ElementId::new("v0"),
        };
        assert!(err.to_string().contains("vertex v0"));
    }
}
