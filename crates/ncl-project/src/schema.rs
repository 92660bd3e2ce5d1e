//! Graph description schema.
//!
//! Entries are positional tuples, e.g. `a: [0, 1, hidden]`. Sections keep
//! each entry as a raw YAML value so a malformed entry only spoils itself;
//! [`Arg::tuple`] turns an entry into a list of [`Arg`]s when it is loaded.

use std::collections::BTreeMap;

use ncl_core::{NclError, NclResult};
use serde::{Deserialize, Serialize};
use serde_yaml::Value;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct GraphDoc {
    /// Offset of this scope, added to every position inside it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f64; 2]>,
    #[serde(default)]
    pub vertices: BTreeMap<String, Value>,
    #[serde(default)]
    pub edges: BTreeMap<String, Value>,
    #[serde(default)]
    pub components: BTreeMap<String, Value>,
    #[serde(default)]
    pub labels: BTreeMap<String, Value>,
    #[serde(default)]
    pub groups: BTreeMap<String, GraphDoc>,
}

/// One tuple element.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Num(f64),
    Text(String),
}

impl Arg {
    /// Read an entry as a flat list of numbers and strings.
    pub fn tuple(value: &Value) -> NclResult<Vec<Arg>> {
        let Value::Sequence(items) = value else {
            return Err(NclError::format("expected a list"));
        };
        items
            .iter()
            .map(|item| match item {
                Value::Number(n) => n
                    .as_f64()
                    .map(Arg::Num)
                    .ok_or_else(|| NclError::format(format!("unsupported number {n}"))),
                Value::String(s) => Ok(Arg::Text(s.clone())),
                other => Err(NclError::format(format!(
                    "unexpected value {}",
                    serde_yaml::to_string(other).unwrap_or_default().trim_end()
                ))),
            })
            .collect()
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            Arg::Num(n) => Some(*n),
            Arg::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Arg::Text(s) => Some(s),
            Arg::Num(_) => None,
        }
    }
}

impl std::fmt::Display for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arg::Num(n) => write!(f, "{n}"),
            Arg::Text(s) => f.write_str(s),
        }
    }
}

/// Trailing flag words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flag {
    Hidden,
    Muted,
    Label,
    Flip,
}

impl Flag {
    pub fn parse(word: &str) -> Option<Flag> {
        match word {
            "hidden" => Some(Flag::Hidden),
            "muted" => Some(Flag::Muted),
            "label" => Some(Flag::Label),
            "flip" => Some(Flag::Flip),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Flag::Hidden => "hidden",
            Flag::Muted => "muted",
            Flag::Label => "label",
            Flag::Flip => "flip",
        }
    }
}
