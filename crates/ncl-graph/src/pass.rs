//! Two-phase validation pass.
//!
//! Phase one visits vertices in any order, evaluating each against committed
//! state and collecting the latch transitions that universal gadgets request.
//! Phase two commits all requests at once. Because no latch changes before
//! the commit, the verdicts and the committed latches do not depend on the
//! visitation order.

use std::collections::{BTreeMap, BTreeSet};

use ncl_core::{ElementId, NclResult};
use tracing::trace;

use crate::gate::{self, LatchRequest};
use crate::graph::Graph;

/// Outcome of a committed pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Validation {
    pub satisfied: BTreeSet<ElementId>,
    pub unsatisfied: BTreeSet<ElementId>,
    /// Latches that changed on commit, with their new value.
    pub latch_changes: Vec<(ElementId, bool)>,
}

impl Validation {
    pub fn all_satisfied(&self) -> bool {
        self.unsatisfied.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ValidationPass {
    verdicts: BTreeMap<ElementId, bool>,
    requests: BTreeMap<ElementId, LatchRequest>,
}

impl ValidationPass {
    pub fn new() -> Self {
        Self::default()
    }

    /// Evaluate one vertex and record the latch request of its gadget.
    pub fn visit(&mut self, graph: &Graph, id: impl Into<ElementId>) -> NclResult<bool> {
        let vertex = graph.vertex(id)?;
        let satisfied = vertex.constraint_satisfied();

        if let Some(owner) = vertex.gate().component() {
            let request = graph
                .component(owner)
                .ok()
                .and_then(|component| gate::latch_request(graph, component));
            if let Some(request) = request {
                trace!(component = %owner, ?request, "latch request");
                self.requests
                    .entry(owner.clone())
                    .and_modify(|pending| *pending = pending.merge(request))
                    .or_insert(request);
            }
        }

        self.verdicts.insert(vertex.id().clone(), satisfied);
        Ok(satisfied)
    }

    /// Visit every vertex in id order.
    pub fn visit_all(&mut self, graph: &Graph) {
        for vertex in graph.vertices() {
            // the id comes from the graph itself, so the lookup cannot fail
            let _ = self.visit(graph, vertex.id());
        }
    }

    pub fn requests(&self) -> &BTreeMap<ElementId, LatchRequest> {
        &self.requests
    }

    /// Verdict recorded for a visited vertex.
    pub fn verdict(&self, id: impl Into<ElementId>) -> Option<bool> {
        self.verdicts.get(&id.into()).copied()
    }

    /// Apply every pending latch request. Notifies once if any latch changed.
    pub fn commit(self, graph: &mut Graph) -> Validation {
        let validation = self.apply(graph);
        if !validation.latch_changes.is_empty() {
            graph.touch();
        }
        validation
    }

    /// Commit without notifying; the caller owns the notification.
    pub(crate) fn apply(self, graph: &mut Graph) -> Validation {
        let mut validation = Validation::default();
        for (id, satisfied) in self.verdicts {
            if satisfied {
                validation.satisfied.insert(id);
            } else {
                validation.unsatisfied.insert(id);
            }
        }

        for (id, request) in self.requests {
            let Some(component) = graph.component_mut(&id) else {
                continue;
            };
            if component.set_latch(request.target()) {
                trace!(component = %id, latch = request.target(), "latch committed");
                validation.latch_changes.push((id, request.target()));
            }
        }
        validation
    }
}

impl Graph {
    /// Run a full validation pass over every vertex and commit latch requests.
    pub fn validate(&mut self) -> Validation {
        let mut pass = ValidationPass::new();
        pass.visit_all(self);
        pass.commit(self)
    }
}
