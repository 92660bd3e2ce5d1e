//! Vertex predicates.
//!
//! Every vertex carries a closed [`Gate`] tag. Plain vertices use the default
//! inflow rule; ports dispatch to the validation function of their gadget
//! kind. All predicates read committed topology and latch state only.

use ncl_core::{ElementId, Point, point};

use crate::cnf::Literal;
use crate::component::{Component, GadgetKind};
use crate::graph::Graph;
use crate::vertex::VertexRef;

/// Minimum inflow of a visible plain vertex.
pub const MIN_INFLOW: u32 = 2;

/// Gadget family of a vertex predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GateKind {
    Plain,
    Converter,
    Existential,
    Universal,
    CnfEvaluator,
}

/// The predicate attached to a vertex.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// Visible: inflow ≥ 2. Hidden: always satisfied.
    Plain,
    /// The single merged port of a converter.
    Converter { component: ElementId },
    Existential { component: ElementId, port: QuantifierPort },
    Universal { component: ElementId, port: QuantifierPort },
    Cnf { component: ElementId, port: CnfPort },
}

impl Gate {
    pub fn kind(&self) -> GateKind {
        match self {
            Gate::Plain => GateKind::Plain,
            Gate::Converter { .. } => GateKind::Converter,
            Gate::Existential { .. } => GateKind::Existential,
            Gate::Universal { .. } => GateKind::Universal,
            Gate::Cnf { .. } => GateKind::CnfEvaluator,
        }
    }

    /// Owning gadget, `None` for free vertices.
    pub fn component(&self) -> Option<&ElementId> {
        match self {
            Gate::Plain => None,
            Gate::Converter { component }
            | Gate::Existential { component, .. }
            | Gate::Universal { component, .. }
            | Gate::Cnf { component, .. } => Some(component),
        }
    }
}

/// Ports shared by the existential and universal quantifier gadgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuantifierPort {
    TryIn,
    TryOut,
    SatIn,
    SatOut,
    Out,
    Inv,
}

impl QuantifierPort {
    pub const ALL: [QuantifierPort; 6] = [
        QuantifierPort::TryIn,
        QuantifierPort::TryOut,
        QuantifierPort::SatIn,
        QuantifierPort::SatOut,
        QuantifierPort::Out,
        QuantifierPort::Inv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            QuantifierPort::TryIn => "tryin",
            QuantifierPort::TryOut => "tryout",
            QuantifierPort::SatIn => "satin",
            QuantifierPort::SatOut => "satout",
            QuantifierPort::Out => "out",
            QuantifierPort::Inv => "inv",
        }
    }

    /// Position relative to the gadget origin.
    pub fn offset(self) -> Point {
        match self {
            QuantifierPort::TryIn => point(0.0, 1.0),
            QuantifierPort::TryOut => point(3.0, 1.0),
            QuantifierPort::SatIn => point(3.0, 2.0),
            QuantifierPort::SatOut => point(0.0, 2.0),
            QuantifierPort::Out => point(1.0, 0.0),
            QuantifierPort::Inv => point(2.0, 0.0),
        }
    }

    /// Required `(single, double)` edge counts.
    pub fn arity(self) -> (usize, usize) {
        match self {
            QuantifierPort::Out | QuantifierPort::Inv => (1, 0),
            _ => (0, 1),
        }
    }
}

/// Ports of the CNF evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CnfPort {
    Literal(Literal),
    Satisfied,
}

impl CnfPort {
    pub fn name(self) -> String {
        match self {
            CnfPort::Literal(literal) => literal.port_name(),
            CnfPort::Satisfied => "satisfied".to_string(),
        }
    }

    pub fn arity(self) -> (usize, usize) {
        match self {
            CnfPort::Literal(_) => (1, 0),
            CnfPort::Satisfied => (0, 1),
        }
    }
}

/// Transition a universal gadget asks for during a validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LatchRequest {
    Set,
    Clear,
}

impl LatchRequest {
    /// Combine two requests for the same gadget. Clear dominates.
    pub fn merge(self, other: LatchRequest) -> LatchRequest {
        if self == LatchRequest::Clear || other == LatchRequest::Clear {
            LatchRequest::Clear
        } else {
            LatchRequest::Set
        }
    }

    pub fn target(self) -> bool {
        self == LatchRequest::Set
    }
}

pub(crate) fn vertex_satisfied(graph: &Graph, vertex: VertexRef<'_>) -> bool {
    match &vertex.gate {
        Gate::Plain => !vertex.visible || vertex.inflow() >= MIN_INFLOW,
        Gate::Converter { .. } => vertex.port_connected(1, 1) && vertex.inflow() >= 1,
        Gate::Existential { component, port } | Gate::Universal { component, port } => {
            let (singles, doubles) = port.arity();
            vertex.port_connected(singles, doubles) && gadget_valid(graph, component)
        }
        Gate::Cnf { component, port } => {
            let (singles, doubles) = port.arity();
            vertex.port_connected(singles, doubles) && gadget_valid(graph, component)
        }
    }
}

/// Gadget-wide rule shared by all ports of a gadget.
fn gadget_valid(graph: &Graph, id: &ElementId) -> bool {
    let Ok(component) = graph.component(id) else {
        return false;
    };
    match &component.kind {
        GadgetKind::Converter => true,
        GadgetKind::Existential { .. } => {
            let s = QuantifierSignals::read(graph, component);
            existential_valid(&s)
        }
        GadgetKind::Universal { latch, .. } => {
            let s = QuantifierSignals::read(graph, component);
            universal_valid(&s, *latch)
        }
        GadgetKind::Cnf { formula } => {
            let satisfied_out = port_ref(graph, component, "satisfied").is_some_and(|p| p.is_output());
            let formula_true = formula.evaluate(|literal| {
                port_ref(graph, component, &literal.port_name()).is_some_and(|p| p.is_input())
            });
            !satisfied_out || formula_true
        }
    }
}

fn port_ref<'g>(graph: &'g Graph, component: &Component, name: &str) -> Option<VertexRef<'g>> {
    let id = component.ports.get(name)?;
    graph.vertex(id).ok()
}

/// Snapshot of the six quantifier port activities.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct QuantifierSignals {
    tryin: bool,
    tryout: bool,
    satin: bool,
    satout: bool,
    out: bool,
    inv: bool,
    /// The vertex feeding `satin` is satisfied.
    satin_source_ok: bool,
}

impl QuantifierSignals {
    /// Port activity only. `satin_source_ok` is left unset so that reading a
    /// gadget never evaluates a neighbouring gadget.
    pub(crate) fn read(graph: &Graph, component: &Component) -> Self {
        let input = |port: QuantifierPort| {
            port_ref(graph, component, port.name()).is_some_and(|p| p.is_input())
        };
        let output = |port: QuantifierPort| {
            port_ref(graph, component, port.name()).is_some_and(|p| p.is_output())
        };

        Self {
            tryin: input(QuantifierPort::TryIn),
            tryout: output(QuantifierPort::TryOut),
            satin: input(QuantifierPort::SatIn),
            satout: output(QuantifierPort::SatOut),
            out: output(QuantifierPort::Out),
            inv: output(QuantifierPort::Inv),
            satin_source_ok: false,
        }
    }
}

/// The vertex driving `satin` is itself satisfied.
fn satin_source_satisfied(graph: &Graph, component: &Component) -> bool {
    port_ref(graph, component, QuantifierPort::SatIn.name())
        .and_then(|satin| {
            satin
                .incoming_edges()
                .find(|e| !e.circular())
                .and_then(|e| e.source())
        })
        .is_some_and(|source| source.constraint_satisfied())
}

fn existential_valid(s: &QuantifierSignals) -> bool {
    // trying requires being tried, and at most one assignment
    if s.tryout && !s.tryin {
        return false;
    }
    if s.tryout && s.out && s.inv {
        return false;
    }
    !(s.satout && !s.satin)
}

fn universal_valid(s: &QuantifierSignals, latch: bool) -> bool {
    if s.tryout && !s.tryin {
        return false;
    }
    // exactly one assignment while trying
    if s.tryout && s.out == s.inv {
        return false;
    }
    // both branches must have succeeded: inv latched, out currently satisfied
    !(s.satout && (!s.satin || !latch || !s.out))
}

/// Latch transition requested by a universal gadget, from committed state.
///
/// `None` for every other gadget kind.
pub(crate) fn latch_request(graph: &Graph, component: &Component) -> Option<LatchRequest> {
    if !matches!(component.kind, GadgetKind::Universal { .. }) {
        return None;
    }
    let mut s = QuantifierSignals::read(graph, component);
    s.satin_source_ok = satin_source_satisfied(graph, component);
    request_from_signals(&s)
}

fn request_from_signals(s: &QuantifierSignals) -> Option<LatchRequest> {
    let set = s.satin && s.satin_source_ok && s.inv;
    let clear = !s.tryin;
    match (set, clear) {
        (_, true) => Some(LatchRequest::Clear),
        (true, false) => Some(LatchRequest::Set),
        (false, false) => None,
    }
}
