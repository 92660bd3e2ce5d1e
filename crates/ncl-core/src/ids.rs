use core::fmt;
use core::str::FromStr;

use crate::error::NclError;

/// Structured identifier for every graph entity.
///
/// An id is a path of segments, e.g. `(group, component, port)`. Equality and
/// ordering are structural; the dotted text form (`group.component.port`) only
/// exists at the boundary (display, parsing of descriptions).
///
/// The empty path is the root scope. It never names an entity, but it is the
/// natural starting point for scoping (`ElementId::root().child("q")`).
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub struct ElementId(Vec<String>);

impl ElementId {
    /// The empty scope.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    /// A single-segment id. The segment is taken verbatim, dots included.
    pub fn new(segment: impl Into<String>) -> Self {
        Self(vec![segment.into()])
    }

    /// Parse the dotted text form, rejecting empty segments.
    pub fn parse(text: &str) -> Result<Self, NclError> {
        if text.is_empty() {
            return Err(NclError::format("empty identifier"));
        }
        let segments: Vec<String> = text.split('.').map(str::to_owned).collect();
        if segments.iter().any(String::is_empty) {
            return Err(NclError::format(format!("empty segment in identifier '{text}'")));
        }
        Ok(Self(segments))
    }

    /// Append one segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(segment.into());
        Self(segments)
    }

    /// Prefix `other` with this scope.
    pub fn join(&self, other: &ElementId) -> Self {
        let mut segments = self.0.clone();
        segments.extend(other.0.iter().cloned());
        Self(segments)
    }

    /// The enclosing scope, `None` for the root.
    pub fn parent(&self) -> Option<Self> {
        let (_, init) = self.0.split_last()?;
        Some(Self(init.to_vec()))
    }

    /// Last segment; empty for the root.
    pub fn name(&self) -> &str {
        self.0.last().map_or("", String::as_str)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// True if `self` lies strictly inside `scope`.
    pub fn starts_with(&self, scope: &ElementId) -> bool {
        self.0.len() > scope.0.len() && self.0[..scope.0.len()] == scope.0[..]
    }
}

impl fmt::Debug for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ElementId({self})")
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

/// Lenient conversion from dotted text, for ids written in code.
impl From<&str> for ElementId {
    fn from(text: &str) -> Self {
        if text.is_empty() {
            return Self::root();
        }
        Self(text.split('.').map(str::to_owned).collect())
    }
}

impl From<&ElementId> for ElementId {
    fn from(id: &ElementId) -> Self {
        id.clone()
    }
}

impl FromStr for ElementId {
    type Err = NclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for ElementId {
    type Error = NclError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        Self::parse(&text)
    }
}

impl From<ElementId> for String {
    fn from(id: ElementId) -> Self {
        id.to_string()
    }
}
