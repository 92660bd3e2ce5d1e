//! Conjunctive normal form formulas over single-letter variables.
//!
//! Accepted shape: `(lit||lit...)&&(...)`, where a literal is a letter with an
//! optional leading `!`. Whitespace is ignored.

use core::fmt;
use core::str::FromStr;
use std::sync::LazyLock;

use ncl_core::{NclError, NclResult};
use regex::Regex;

static CLAUSE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\((.*)\)$").unwrap());
static LITERAL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(!?)([a-zA-Z])$").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Literal {
    pub variable: char,
    pub negated: bool,
}

impl Literal {
    pub fn positive(variable: char) -> Self {
        Self {
            variable,
            negated: false,
        }
    }

    pub fn negative(variable: char) -> Self {
        Self {
            variable,
            negated: true,
        }
    }

    /// Name of the evaluator port carrying this literal: `x` or `!x`.
    pub fn port_name(self) -> String {
        if self.negated {
            format!("!{}", self.variable)
        } else {
            self.variable.to_string()
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.port_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CnfFormula {
    source: String,
    variables: Vec<char>,
    clauses: Vec<Vec<Literal>>,
}

impl CnfFormula {
    pub fn parse(text: &str) -> NclResult<Self> {
        let compact: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        let mut variables = Vec::new();
        let mut clauses = Vec::new();

        for clause in compact.split("&&") {
            let body = CLAUSE_RE
                .captures(clause)
                .and_then(|caps| caps.get(1))
                .ok_or_else(|| NclError::format(format!("clause '{clause}' is not parenthesized")))?
                .as_str()
                .replace(['(', ')'], "");

            let mut literals = Vec::new();
            for literal in body.split("||") {
                let caps = LITERAL_RE.captures(literal).ok_or_else(|| {
                    NclError::format(format!("invalid literal '{literal}' in clause '{clause}'"))
                })?;
                let negated = !caps[1].is_empty();
                let variable = caps[2].chars().next().unwrap_or_default();
                if !variables.contains(&variable) {
                    variables.push(variable);
                }
                literals.push(Literal { variable, negated });
            }
            clauses.push(literals);
        }

        Ok(Self {
            source: compact,
            variables,
            clauses,
        })
    }

    /// Variables in order of first appearance.
    pub fn variables(&self) -> &[char] {
        &self.variables
    }

    pub fn clauses(&self) -> &[Vec<Literal>] {
        &self.clauses
    }

    /// Whitespace-free source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Conjunction of clauses, each a disjunction of literals.
    pub fn evaluate(&self, mut literal_true: impl FnMut(Literal) -> bool) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|&literal| literal_true(literal)))
    }

    /// Display form using logic symbols, e.g. `(a ∨ ¬b) ∧ (b)`.
    pub fn pretty(&self) -> String {
        self.source
            .replace('!', "¬")
            .replace("&&", " ∧ ")
            .replace("||", " ∨ ")
    }
}

impl FromStr for CnfFormula {
    type Err = NclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for CnfFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}
