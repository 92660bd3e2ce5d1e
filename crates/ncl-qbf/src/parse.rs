//! QBF grammar.

use core::fmt;
use core::str::FromStr;
use std::sync::LazyLock;

use ncl_core::{NclError, NclResult};
use ncl_graph::{CnfFormula, GadgetConfig};
use regex::Regex;

static QBF_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*((?:(?:forall|exists)\s+[A-Za-z]\s+)*(?:forall|exists)\s+[A-Za-z])\s*:(.*)$")
        .unwrap()
});
static BINDING_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(forall|exists)\s+([A-Za-z])").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quantifier {
    Exists,
    ForAll,
}

impl Quantifier {
    pub fn keyword(self) -> &'static str {
        match self {
            Quantifier::Exists => "exists",
            Quantifier::ForAll => "forall",
        }
    }

    /// Gadget configuration for a binding of `variable`.
    pub fn gadget(self, variable: char) -> GadgetConfig {
        match self {
            Quantifier::Exists => GadgetConfig::Existential { variable },
            Quantifier::ForAll => GadgetConfig::Universal { variable },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub quantifier: Quantifier,
    pub variable: char,
}

/// A prenex QBF with a CNF matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Qbf {
    bindings: Vec<Binding>,
    formula: CnfFormula,
}

impl Qbf {
    /// Parse and check a formula.
    ///
    /// Besides the grammar, every variable must be bound exactly once and
    /// occur in the matrix, and the matrix may not use unbound variables.
    pub fn parse(text: &str) -> NclResult<Self> {
        let caps = QBF_RE
            .captures(text)
            .ok_or_else(|| NclError::format(format!("'{}' is not a QBF", text.trim())))?;

        let mut bindings: Vec<Binding> = Vec::new();
        for binding in BINDING_RE.captures_iter(&caps[1]) {
            let quantifier = if &binding[1] == "forall" {
                Quantifier::ForAll
            } else {
                Quantifier::Exists
            };
            let variable = binding[2].chars().next().unwrap_or_default();
            if bindings.iter().any(|b| b.variable == variable) {
                return Err(NclError::format(format!("variable '{variable}' bound twice")));
            }
            bindings.push(Binding { quantifier, variable });
        }

        let formula = CnfFormula::parse(&caps[2])?;
        if let Some(unused) = bindings
            .iter()
            .find(|b| !formula.variables().contains(&b.variable))
        {
            return Err(NclError::format(format!(
                "variable '{}' is bound but never used",
                unused.variable
            )));
        }
        if formula.variables().len() != bindings.len() {
            return Err(NclError::format(format!(
                "{} quantifiers for {} formula variables",
                bindings.len(),
                formula.variables().len()
            )));
        }

        Ok(Self { bindings, formula })
    }

    /// Bindings in quantifier order, outermost first.
    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn formula(&self) -> &CnfFormula {
        &self.formula
    }
}

impl FromStr for Qbf {
    type Err = NclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Qbf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for binding in &self.bindings {
            write!(f, "{} {} ", binding.quantifier.keyword(), binding.variable)?;
        }
        write!(f, ": {}", self.formula)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_format(result: NclResult<Qbf>) -> bool {
        matches!(result, Err(NclError::Format { .. }))
    }

    #[test]
    fn parses_bindings_in_order() {
        let qbf = Qbf::parse("forall x exists y : (x||!y)&&(y)").unwrap();
        assert_eq!(
            qbf.bindings(),
            &[
                Binding { quantifier: Quantifier::ForAll, variable: 'x' },
                Binding { quantifier: Quantifier::Exists, variable: 'y' },
            ]
        );
        assert_eq!(qbf.formula().clauses().len(), 2);
    }

    #[test]
    fn colon_spacing_is_optional() {
        assert!(Qbf::parse("exists x: (x)").is_ok());
        assert!(Qbf::parse("  exists x :(x)  ").is_ok());
    }

    #[test]
    fn rejects_malformed_prefix() {
        assert!(is_format(Qbf::parse("(x)")));
        assert!(is_format(Qbf::parse(": (x)")));
        assert!(is_format(Qbf::parse("exist x : (x)")));
        assert!(is_format(Qbf::parse("existsx : (x)")));
        assert!(is_format(Qbf::parse("exists xy : (x)")));
        assert!(is_format(Qbf::parse("exists x (x)")));
    }

    #[test]
    fn rejects_bad_matrix() {
        assert!(is_format(Qbf::parse("exists x : (x|x)")));
        assert!(is_format(Qbf::parse("exists x : ")));
    }

    #[test]
    fn rejects_binding_mismatch() {
        assert!(is_format(Qbf::parse("exists x exists y : (x)")));
        assert!(is_format(Qbf::parse("exists x : (x||y)")));
        assert!(is_format(Qbf::parse("exists x forall x : (x)")));
    }

    #[test]
    fn display_round_trips() {
        let qbf = Qbf::parse("forall a exists b:(a || b)").unwrap();
        assert_eq!(qbf.to_string(), "forall a exists b : (a||b)");
        assert_eq!(qbf.to_string().parse::<Qbf>().unwrap(), qbf);
    }
}
