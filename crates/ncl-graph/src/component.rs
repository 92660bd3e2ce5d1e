//! Gadgets: fixed sub-graphs with named ports.

use std::collections::BTreeMap;

use ncl_core::{ElementId, NclResult, Point, point};

use crate::cnf::{CnfFormula, Literal};
use crate::gate::{CnfPort, Gate, GateKind, QuantifierPort};

/// What to build when adding a component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GadgetConfig {
    Converter,
    Existential { variable: char },
    Universal { variable: char },
    Cnf { formula: String },
}

/// Gadget variant and its state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GadgetKind {
    /// Fixed-ratio wire-type converter with one merged port.
    Converter,
    /// Stateless existential quantifier.
    Existential { variable: char },
    /// Universal quantifier with one committed latch bit.
    Universal { variable: char, latch: bool },
    Cnf { formula: CnfFormula },
}

impl GadgetKind {
    pub(crate) fn from_config(config: GadgetConfig) -> NclResult<Self> {
        Ok(match config {
            GadgetConfig::Converter => GadgetKind::Converter,
            GadgetConfig::Existential { variable } => GadgetKind::Existential { variable },
            GadgetConfig::Universal { variable } => GadgetKind::Universal {
                variable,
                latch: false,
            },
            GadgetConfig::Cnf { formula } => GadgetKind::Cnf {
                formula: CnfFormula::parse(&formula)?,
            },
        })
    }

    pub fn gate_kind(&self) -> GateKind {
        match self {
            GadgetKind::Converter => GateKind::Converter,
            GadgetKind::Existential { .. } => GateKind::Existential,
            GadgetKind::Universal { .. } => GateKind::Universal,
            GadgetKind::Cnf { .. } => GateKind::CnfEvaluator,
        }
    }

    /// Port name, offset and predicate for every port of this gadget.
    pub(crate) fn port_layout(&self, component: &ElementId) -> Vec<(String, Point, Gate)> {
        match self {
            GadgetKind::Converter => vec![(
                "port".to_string(),
                point(0.0, 0.0),
                Gate::Converter {
                    component: component.clone(),
                },
            )],
            GadgetKind::Existential { .. } | GadgetKind::Universal { .. } => QuantifierPort::ALL
                .iter()
                .map(|&port| {
                    let gate = if matches!(self, GadgetKind::Universal { .. }) {
                        Gate::Universal {
                            component: component.clone(),
                            port,
                        }
                    } else {
                        Gate::Existential {
                            component: component.clone(),
                            port,
                        }
                    };
                    (port.name().to_string(), port.offset(), gate)
                })
                .collect(),
            GadgetKind::Cnf { formula } => {
                let mut ports = Vec::new();
                for (i, &variable) in formula.variables().iter().enumerate() {
                    let x = i as f64 * 4.0;
                    for (literal, dx) in [(Literal::positive(variable), 1.0), (Literal::negative(variable), 2.0)] {
                        let port = CnfPort::Literal(literal);
                        ports.push((
                            port.name(),
                            point(x + dx, 2.0),
                            Gate::Cnf {
                                component: component.clone(),
                                port,
                            },
                        ));
                    }
                }
                let n = formula.variables().len() as f64;
                ports.push((
                    CnfPort::Satisfied.name(),
                    point(n * 4.0 + 2.0, 2.0),
                    Gate::Cnf {
                        component: component.clone(),
                        port: CnfPort::Satisfied,
                    },
                ));
                ports
            }
        }
    }

    pub(crate) fn size(&self) -> Point {
        match self {
            GadgetKind::Converter => point(0.0, 0.0),
            GadgetKind::Existential { .. } | GadgetKind::Universal { .. } => point(3.0, 3.0),
            GadgetKind::Cnf { formula } => point(formula.variables().len() as f64 * 4.0 + 3.0, 2.0),
        }
    }

    pub(crate) fn label(&self) -> String {
        match self {
            GadgetKind::Converter => String::new(),
            GadgetKind::Existential { variable } => format!("∃{variable}"),
            GadgetKind::Universal { variable, .. } => format!("∀{variable}"),
            GadgetKind::Cnf { formula } => formula.pretty(),
        }
    }
}

/// A gadget instance. Its ports are ordinary graph vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub(crate) id: ElementId,
    pub(crate) position: Point,
    pub(crate) kind: GadgetKind,
    pub(crate) ports: BTreeMap<String, ElementId>,
    pub(crate) size: Point,
    pub(crate) label: String,
    pub(crate) muted: bool,
}

impl Component {
    pub fn id(&self) -> &ElementId {
        &self.id
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn kind(&self) -> &GadgetKind {
        &self.kind
    }

    /// Port name to vertex id.
    pub fn ports(&self) -> &BTreeMap<String, ElementId> {
        &self.ports
    }

    pub fn port(&self, name: &str) -> Option<&ElementId> {
        self.ports.get(name)
    }

    pub fn size(&self) -> Point {
        self.size
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Committed latch of a universal gadget, `None` for other kinds.
    pub fn latch(&self) -> Option<bool> {
        match self.kind {
            GadgetKind::Universal { latch, .. } => Some(latch),
            _ => None,
        }
    }

    pub(crate) fn set_latch(&mut self, value: bool) -> bool {
        match &mut self.kind {
            GadgetKind::Universal { latch, .. } if *latch != value => {
                *latch = value;
                true
            }
            _ => false,
        }
    }
}
