//! The constraint graph: owning registry of every entity and sole mutation API.

use std::collections::BTreeMap;

use ncl_core::{Bounds, ElementId, EntityKind, NclError, NclResult, Point};
use tracing::debug;

use crate::component::{Component, GadgetConfig, GadgetKind};
use crate::edge::{Edge, EdgeRef, Weight};
use crate::gate::Gate;
use crate::label::{Align, Label};
use crate::pass::ValidationPass;
use crate::vertex::{Vertex, VertexRef};

/// Arena of vertices, edges, components and labels, keyed by id.
///
/// Edges and components refer to vertices by key, so there is no ownership
/// cycle and removal with cascade is a plain operation over the maps.
///
/// Every successful mutating call bumps [`Graph::revision`] exactly once and
/// raises the changed flag, which a consumer polls with
/// [`Graph::take_changed`]. Failed calls leave both untouched.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) vertices: BTreeMap<ElementId, Vertex>,
    pub(crate) edges: BTreeMap<ElementId, Edge>,
    pub(crate) components: BTreeMap<ElementId, Component>,
    pub(crate) labels: BTreeMap<ElementId, Label>,
    revision: u64,
    changed: bool,
}

fn not_found(kind: EntityKind, id: &ElementId) -> NclError {
    NclError::NotFound {
        kind,
        id: id.clone(),
    }
}

/// The root scope never names an entity.
fn named(id: ElementId) -> NclResult<ElementId> {
    if id.is_root() {
        return Err(NclError::format("empty id"));
    }
    Ok(id)
}

fn duplicate(kind: EntityKind, id: &ElementId) -> NclError {
    NclError::DuplicateId {
        kind,
        id: id.clone(),
    }
}

impl Graph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn touch(&mut self) {
        self.revision += 1;
        self.changed = true;
    }

    /// Number of mutations applied so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    /// Return and reset the "graph changed" flag.
    pub fn take_changed(&mut self) -> bool {
        std::mem::take(&mut self.changed)
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
            && self.edges.is_empty()
            && self.components.is_empty()
            && self.labels.is_empty()
    }

    /// Drop every entity.
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.edges.clear();
        self.components.clear();
        self.labels.clear();
        debug!("graph cleared");
        self.touch();
    }

    // ---- vertices ----

    pub fn has_vertex(&self, id: impl Into<ElementId>) -> bool {
        self.vertices.contains_key(&id.into())
    }

    pub fn vertex(&self, id: impl Into<ElementId>) -> NclResult<VertexRef<'_>> {
        let id = id.into();
        let vertex = self
            .vertices
            .get(&id)
            .ok_or_else(|| not_found(EntityKind::Vertex, &id))?;
        Ok(VertexRef {
            graph: self,
            vertex,
        })
    }

    /// All vertices, ordered by id.
    pub fn vertices(&self) -> impl Iterator<Item = VertexRef<'_>> {
        self.vertices.values().map(move |vertex| VertexRef {
            graph: self,
            vertex,
        })
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Add a free vertex with the default inflow rule.
    pub fn add_vertex(
        &mut self,
        id: impl Into<ElementId>,
        position: Point,
        visible: bool,
    ) -> NclResult<&Vertex> {
        let id = named(id.into())?;
        if self.vertices.contains_key(&id) {
            return Err(duplicate(EntityKind::Vertex, &id));
        }
        debug!(vertex = %id, "add vertex");
        self.vertices
            .insert(id.clone(), Vertex::new(id.clone(), position, visible, Gate::Plain));
        self.touch();
        Ok(&self.vertices[&id])
    }

    pub fn set_vertex_muted(&mut self, id: impl Into<ElementId>, muted: bool) -> NclResult<()> {
        let id = id.into();
        let vertex = self
            .vertices
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityKind::Vertex, &id))?;
        vertex.muted = muted;
        self.touch();
        Ok(())
    }

    /// Remove a vertex and every edge incident to it.
    pub fn remove_vertex(&mut self, id: impl Into<ElementId>) -> NclResult<Vertex> {
        let id = id.into();
        let vertex = self.detach_vertex(&id)?;
        self.touch();
        Ok(vertex)
    }

    fn detach_vertex(&mut self, id: &ElementId) -> NclResult<Vertex> {
        let incident: Vec<ElementId> = self
            .vertices
            .get(id)
            .ok_or_else(|| not_found(EntityKind::Vertex, id))?
            .edges
            .iter()
            .cloned()
            .collect();
        for edge in &incident {
            self.detach_edge(edge)?;
        }
        debug!(vertex = %id, cascaded = incident.len(), "remove vertex");
        self.vertices
            .remove(id)
            .ok_or_else(|| not_found(EntityKind::Vertex, id))
    }

    // ---- edges ----

    pub fn has_edge(&self, id: impl Into<ElementId>) -> bool {
        self.edges.contains_key(&id.into())
    }

    pub fn edge(&self, id: impl Into<ElementId>) -> NclResult<EdgeRef<'_>> {
        let id = id.into();
        let edge = self
            .edges
            .get(&id)
            .ok_or_else(|| not_found(EntityKind::Edge, &id))?;
        Ok(EdgeRef { graph: self, edge })
    }

    /// All edges, ordered by id.
    pub fn edges(&self) -> impl Iterator<Item = EdgeRef<'_>> {
        self.edges.values().map(move |edge| EdgeRef { graph: self, edge })
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Connect two existing vertices. `from == to` makes a self-loop.
    pub fn add_edge(
        &mut self,
        id: impl Into<ElementId>,
        from: impl Into<ElementId>,
        to: impl Into<ElementId>,
        weight: Weight,
    ) -> NclResult<&Edge> {
        let (id, from, to) = (named(id.into())?, from.into(), to.into());
        if self.edges.contains_key(&id) {
            return Err(duplicate(EntityKind::Edge, &id));
        }
        for endpoint in [&from, &to] {
            if !self.vertices.contains_key(endpoint) {
                return Err(NclError::referential(format!(
                    "edge {id} references missing vertex {endpoint}"
                )));
            }
        }

        for endpoint in [&from, &to] {
            if let Some(vertex) = self.vertices.get_mut(endpoint) {
                vertex.edges.insert(id.clone());
            }
        }
        debug!(edge = %id, %from, %to, weight = weight.value(), "add edge");
        self.edges.insert(
            id.clone(),
            Edge {
                id: id.clone(),
                from,
                to,
                weight,
                muted: false,
                label_visible: false,
            },
        );
        self.touch();
        Ok(&self.edges[&id])
    }

    pub fn set_edge_muted(&mut self, id: impl Into<ElementId>, muted: bool) -> NclResult<()> {
        self.edge_mut(&id.into())?.muted = muted;
        self.touch();
        Ok(())
    }

    pub fn set_edge_label_visible(
        &mut self,
        id: impl Into<ElementId>,
        visible: bool,
    ) -> NclResult<()> {
        self.edge_mut(&id.into())?.label_visible = visible;
        self.touch();
        Ok(())
    }

    fn edge_mut(&mut self, id: &ElementId) -> NclResult<&mut Edge> {
        self.edges
            .get_mut(id)
            .ok_or_else(|| not_found(EntityKind::Edge, id))
    }

    pub fn remove_edge(&mut self, id: impl Into<ElementId>) -> NclResult<Edge> {
        let edge = self.detach_edge(&id.into())?;
        self.touch();
        Ok(edge)
    }

    fn detach_edge(&mut self, id: &ElementId) -> NclResult<Edge> {
        let edge = self
            .edges
            .remove(id)
            .ok_or_else(|| not_found(EntityKind::Edge, id))?;
        for endpoint in [&edge.from, &edge.to] {
            if let Some(vertex) = self.vertices.get_mut(endpoint) {
                vertex.edges.remove(id);
            }
        }
        Ok(edge)
    }

    /// Flip an edge's orientation in place. The only move the puzzle permits.
    pub fn reverse_edge(&mut self, id: impl Into<ElementId>) -> NclResult<&Edge> {
        let id = id.into();
        self.edge_mut(&id)?.reverse();
        debug!(edge = %id, "reverse edge");
        self.touch();
        Ok(&self.edges[&id])
    }

    /// Flip an edge if the result leaves both endpoints satisfied.
    ///
    /// An accepted move is followed by a validation pass so latches follow the
    /// new orientation; the whole call counts as one mutation. A rejected move
    /// restores the orientation and changes nothing. Self-loops are fixed
    /// sources and never move.
    pub fn try_reverse_edge(&mut self, id: impl Into<ElementId>) -> NclResult<bool> {
        let id = id.into();
        let edge = self.edge_mut(&id)?;
        if edge.circular() {
            debug!(edge = %id, "self-loop cannot move");
            return Ok(false);
        }
        edge.reverse();

        let accepted = self.edge(&id)?.constraint_satisfied();
        if !accepted {
            self.edge_mut(&id)?.reverse();
            debug!(edge = %id, "move rejected");
            return Ok(false);
        }

        let mut pass = ValidationPass::new();
        pass.visit_all(self);
        pass.apply(self);
        debug!(edge = %id, "move accepted");
        self.touch();
        Ok(true)
    }

    // ---- components ----

    pub fn has_component(&self, id: impl Into<ElementId>) -> bool {
        self.components.contains_key(&id.into())
    }

    pub fn component(&self, id: impl Into<ElementId>) -> NclResult<&Component> {
        let id = id.into();
        self.components
            .get(&id)
            .ok_or_else(|| not_found(EntityKind::Component, &id))
    }

    /// All components, ordered by id.
    pub fn components(&self) -> impl Iterator<Item = &Component> {
        self.components.values()
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Instantiate a gadget and create its ports as `id.<port>` vertices.
    ///
    /// Nothing is added unless the component id, every port id and the
    /// gadget configuration are valid.
    pub fn add_component(
        &mut self,
        id: impl Into<ElementId>,
        position: Point,
        config: GadgetConfig,
    ) -> NclResult<&Component> {
        let id = named(id.into())?;
        if self.components.contains_key(&id) {
            return Err(duplicate(EntityKind::Component, &id));
        }
        let kind = GadgetKind::from_config(config)?;
        let layout = kind.port_layout(&id);

        let mut ports = BTreeMap::new();
        for (name, _, _) in &layout {
            let port_id = id.child(name.clone());
            if self.vertices.contains_key(&port_id) {
                return Err(duplicate(EntityKind::Vertex, &port_id));
            }
            ports.insert(name.clone(), port_id);
        }

        for (name, offset, gate) in layout {
            let port_id = ports[&name].clone();
            self.vertices
                .insert(port_id.clone(), Vertex::new(port_id, position + offset, true, gate));
        }

        debug!(component = %id, kind = ?kind.gate_kind(), ports = ports.len(), "add component");
        let component = Component {
            id: id.clone(),
            position,
            size: kind.size(),
            label: kind.label(),
            kind,
            ports,
            muted: false,
        };
        self.components.insert(id.clone(), component);
        self.touch();
        Ok(&self.components[&id])
    }

    pub fn set_component_muted(&mut self, id: impl Into<ElementId>, muted: bool) -> NclResult<()> {
        let id = id.into();
        let component = self
            .components
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityKind::Component, &id))?;
        component.muted = muted;
        self.touch();
        Ok(())
    }

    /// Translate a component and all of its ports.
    pub fn move_component(&mut self, id: impl Into<ElementId>, position: Point) -> NclResult<()> {
        let id = id.into();
        let component = self
            .components
            .get_mut(&id)
            .ok_or_else(|| not_found(EntityKind::Component, &id))?;
        let delta = position - component.position;
        component.position = position;
        for port in component.ports.values() {
            if let Some(vertex) = self.vertices.get_mut(port) {
                vertex.position += delta;
            }
        }
        self.touch();
        Ok(())
    }

    /// Remove a component together with its ports and their edges.
    pub fn remove_component(&mut self, id: impl Into<ElementId>) -> NclResult<Component> {
        let id = id.into();
        let component = self
            .components
            .remove(&id)
            .ok_or_else(|| not_found(EntityKind::Component, &id))?;
        for port in component.ports.values() {
            if self.vertices.contains_key(port) {
                self.detach_vertex(port)?;
            }
        }
        debug!(component = %id, "remove component");
        self.touch();
        Ok(component)
    }

    /// All ports satisfied.
    pub fn component_satisfied(&self, id: impl Into<ElementId>) -> NclResult<bool> {
        let component = self.component(id)?;
        Ok(component
            .ports
            .values()
            .all(|port| self.vertex(port).is_ok_and(|v| v.constraint_satisfied())))
    }

    pub(crate) fn component_mut(&mut self, id: &ElementId) -> Option<&mut Component> {
        self.components.get_mut(id)
    }

    // ---- labels ----

    pub fn has_label(&self, id: impl Into<ElementId>) -> bool {
        self.labels.contains_key(&id.into())
    }

    pub fn label(&self, id: impl Into<ElementId>) -> NclResult<&Label> {
        let id = id.into();
        self.labels
            .get(&id)
            .ok_or_else(|| not_found(EntityKind::Label, &id))
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.labels.values()
    }

    pub fn add_label(
        &mut self,
        id: impl Into<ElementId>,
        position: Point,
        text: impl Into<String>,
        halign: Align,
        valign: Align,
    ) -> NclResult<&Label> {
        let id = named(id.into())?;
        if self.labels.contains_key(&id) {
            return Err(duplicate(EntityKind::Label, &id));
        }
        self.labels.insert(
            id.clone(),
            Label {
                id: id.clone(),
                position,
                text: text.into(),
                halign,
                valign,
            },
        );
        self.touch();
        Ok(&self.labels[&id])
    }

    pub fn remove_label(&mut self, id: impl Into<ElementId>) -> NclResult<Label> {
        let id = id.into();
        let label = self
            .labels
            .remove(&id)
            .ok_or_else(|| not_found(EntityKind::Label, &id))?;
        self.touch();
        Ok(label)
    }

    // ---- derived ----

    /// Box around every vertex position, `None` for a graph without vertices.
    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::from_points(self.vertices.values().map(|v| v.position))
    }

    pub fn edge_center(&self, id: impl Into<ElementId>) -> NclResult<Point> {
        let edge = self.edge(id)?;
        edge.center()
            .ok_or_else(|| NclError::referential(format!("edge {} has a missing endpoint", edge.id)))
    }

    pub fn edge_delta(&self, id: impl Into<ElementId>) -> NclResult<Point> {
        let edge = self.edge(id)?;
        edge.delta()
            .ok_or_else(|| NclError::referential(format!("edge {} has a missing endpoint", edge.id)))
    }
}
