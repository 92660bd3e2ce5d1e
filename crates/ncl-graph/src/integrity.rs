//! Structural invariant checks.

use ncl_core::{NclError, NclResult};

use crate::graph::Graph;

impl Graph {
    /// Verify the arena invariants, returning the first violation found.
    ///
    /// - every edge endpoint exists and lists the edge as incident
    /// - every incident edge key exists and touches its vertex
    /// - inflow + outflow equals the sum of incident weights
    /// - every component port exists and is tagged with its component
    pub fn check_integrity(&self) -> NclResult<()> {
        for edge in self.edges.values() {
            for endpoint in [&edge.from, &edge.to] {
                let vertex = self.vertices.get(endpoint).ok_or_else(|| {
                    NclError::referential(format!(
                        "edge {} references missing vertex {endpoint}",
                        edge.id
                    ))
                })?;
                if !vertex.edges.contains(&edge.id) {
                    return Err(NclError::referential(format!(
                        "vertex {endpoint} does not list incident edge {}",
                        edge.id
                    )));
                }
            }
        }

        for vertex in self.vertices() {
            let mut total = 0;
            for edge_id in vertex.edge_ids() {
                let edge = self.edges.get(edge_id).ok_or_else(|| {
                    NclError::referential(format!(
                        "vertex {} lists missing edge {edge_id}",
                        vertex.id()
                    ))
                })?;
                if edge.from != *vertex.id() && edge.to != *vertex.id() {
                    return Err(NclError::referential(format!(
                        "vertex {} lists edge {edge_id} which does not touch it",
                        vertex.id()
                    )));
                }
                total += edge.weight.value();
            }
            if vertex.inflow() + vertex.outflow() != total {
                return Err(NclError::referential(format!(
                    "flow of vertex {} does not add up to its incident weight {total}",
                    vertex.id()
                )));
            }
        }

        for component in self.components.values() {
            for (name, port) in &component.ports {
                let vertex = self.vertices.get(port).ok_or_else(|| {
                    NclError::referential(format!(
                        "port {name} of component {} is missing",
                        component.id
                    ))
                })?;
                if vertex.gate.component() != Some(&component.id) {
                    return Err(NclError::referential(format!(
                        "port {port} is not tagged with component {}",
                        component.id
                    )));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::component::GadgetConfig;
    use crate::edge::Weight;
    use crate::graph::Graph;
    use ncl_core::{ElementId, NclError, point};

    fn sample() -> Graph {
        let mut g = Graph::new();
        g.add_vertex("a", point(0.0, 0.0), true).unwrap();
        g.add_vertex("b", point(1.0, 0.0), true).unwrap();
        g.add_edge("ab", "a", "b", Weight::Double).unwrap();
        g.add_component("c", point(3.0, 0.0), GadgetConfig::Converter).unwrap();
        g.add_edge("bc", "b", "c.port", Weight::Single).unwrap();
        g
    }

    #[test]
    fn validate_empty_graph() {
        assert!(Graph::new().check_integrity().is_ok());
    }

    #[test]
    fn consistent_graph_passes() {
        assert!(sample().check_integrity().is_ok());
    }

    #[test]
    fn dangling_incident_key_is_reported() {
        let mut g = sample();
        g.vertices
            .get_mut(&ElementId::new("a"))
            .unwrap()
            .edges
            .insert(ElementId::new("ghost"));
        assert!(matches!(g.check_integrity(), Err(NclError::Referential { .. })));
    }

    #[test]
    fn missing_port_is_reported() {
        let mut g = sample();
        g.remove_vertex("c.port").unwrap();
        let err = g.check_integrity().unwrap_err();
        assert!(err.to_string().contains("port port of component c"));
    }
}
