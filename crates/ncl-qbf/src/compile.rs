//! QBF → NCL circuit compiler.
//!
//! Layout, left to right: the source/sink boundary, one 3×3 quantifier gadget
//! per binding, then the try/result probes. The CNF evaluator sits below the
//! quantifiers. Every wire starts in its inactive orientation so a freshly
//! compiled circuit satisfies every constraint.

use ncl_core::{ElementId, NclResult, Point, point};
use ncl_graph::{Align, GadgetConfig, Graph, Literal, QuantifierPort, Weight};
use tracing::debug;

use crate::parse::Qbf;

const GADGET_PITCH: f64 = 4.0;
const FORMULA_DROP: f64 = 4.0;

/// Ids of the interesting parts of a compiled circuit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Circuit {
    /// Quantifier gadgets, outermost first.
    pub quantifiers: Vec<ElementId>,
    pub formula: ElementId,
    /// Edge that carries the win: first `satout` into the sink.
    pub sink_edge: ElementId,
    /// Junction vertex that ANDs the two probes.
    pub junction: ElementId,
}

/// Compile into a fresh graph.
pub fn compile_qbf(source: &str) -> NclResult<Graph> {
    let mut graph = Graph::new();
    Compiler::compile_into(&mut graph, &ElementId::root(), point(0.0, 0.0), source)?;
    Ok(graph)
}

/// Builds one circuit into an existing graph under a scope.
///
/// All-or-nothing: the circuit is built on a working copy that replaces the
/// target graph only on success, so a failed compilation leaves the graph,
/// its revision and its changed flag exactly as they were.
pub struct Compiler {
    graph: Graph,
    scope: ElementId,
    offset: Point,
}

impl Compiler {
    pub fn compile_into(
        graph: &mut Graph,
        scope: &ElementId,
        offset: Point,
        source: &str,
    ) -> NclResult<Circuit> {
        let qbf = Qbf::parse(source)?;
        let mut compiler = Compiler {
            graph: graph.clone(),
            scope: scope.clone(),
            offset,
        };
        match compiler.build(&qbf) {
            Ok(circuit) => {
                debug!(
                    scope = %compiler.scope,
                    quantifiers = circuit.quantifiers.len(),
                    "compiled {qbf}"
                );
                *graph = compiler.graph;
                Ok(circuit)
            }
            Err(err) => {
                debug!(scope = %compiler.scope, %err, "compilation failed, graph untouched");
                Err(err)
            }
        }
    }

    fn id(&self, text: &str) -> ElementId {
        self.scope.join(&ElementId::from(text))
    }

    fn at(&self, x: f64, y: f64) -> Point {
        self.offset + point(x, y)
    }

    fn build(&mut self, qbf: &Qbf) -> NclResult<Circuit> {
        let bindings = qbf.bindings();
        let last = bindings.len() - 1;
        let mut quantifiers = Vec::with_capacity(bindings.len());

        for (i, binding) in bindings.iter().enumerate() {
            let id = self.id("quantifier").child(binding.variable.to_string());
            let position = self.at(GADGET_PITCH * i as f64, 0.0);
            self.component(&id, position, binding.quantifier.gadget(binding.variable))?;
            quantifiers.push(id);
        }
        let port = |gadget: &ElementId, port: QuantifierPort| gadget.child(port.name());

        // try flows left to right, sat right to left; both start inactive
        for (i, pair) in quantifiers.windows(2).enumerate() {
            let (left, right) = (&pair[0], &pair[1]);
            self.edge(
                &self.id("try").child(i.to_string()),
                &port(right, QuantifierPort::TryIn),
                &port(left, QuantifierPort::TryOut),
                Weight::Double,
            )?;
            self.edge(
                &self.id("sat").child(i.to_string()),
                &port(left, QuantifierPort::SatIn),
                &port(right, QuantifierPort::SatOut),
                Weight::Double,
            )?;
        }

        let formula = self.id("formula");
        let formula_config = GadgetConfig::Cnf { formula: qbf.formula().source().to_string() };
        self.component(&formula, self.at(0.0, FORMULA_DROP), formula_config)?;

        for (binding, quantifier) in bindings.iter().zip(&quantifiers) {
            for (literal, driver) in [
                (Literal::positive(binding.variable), QuantifierPort::Out),
                (Literal::negative(binding.variable), QuantifierPort::Inv),
            ] {
                self.edge(
                    &self.id("lit").child(literal.port_name()),
                    &formula.child(literal.port_name()),
                    &port(quantifier, driver),
                    Weight::Single,
                )?;
            }
        }

        let first = &quantifiers[0];
        let sink_edge = self.left_boundary(first)?;
        let junction = self.right_boundary(&quantifiers[last], &formula, last)?;

        Ok(Circuit {
            quantifiers,
            formula,
            sink_edge,
            junction,
        })
    }

    /// Source with a self-loop feeding the first `tryin`; sink cycle fed by
    /// the first `satout`.
    fn left_boundary(&mut self, first: &ElementId) -> NclResult<ElementId> {
        let source = self.id("source");
        self.vertex(&source, self.at(-1.5, 0.5))?;
        self.edge(&self.id("source.loop"), &source, &source, Weight::Double)?;
        self.edge(
            &self.id("source.try"),
            &first.child(QuantifierPort::TryIn.name()),
            &source,
            Weight::Double,
        )?;

        let [a, b, c] = [self.id("sink.a"), self.id("sink.b"), self.id("sink.c")];
        self.vertex(&a, self.at(-1.5, 2.5))?;
        self.vertex(&b, self.at(-2.5, 3.0))?;
        self.vertex(&c, self.at(-2.5, 2.0))?;
        for (name, from, to) in [("sink.ab", &a, &b), ("sink.bc", &b, &c), ("sink.ca", &c, &a)] {
            self.edge(&self.id(name), from, to, Weight::Double)?;
        }
        let sink_edge = self.id("sink.sat");
        self.edge(&sink_edge, &a, &first.child(QuantifierPort::SatOut.name()), Weight::Double)?;

        self.label("label.try", self.at(-1.5, 0.0), "try")?;
        self.label("label.sat", self.at(-2.0, 3.5), "sat")?;
        Ok(sink_edge)
    }

    /// Probes on the last `tryout` and on the evaluator output, ANDed by the
    /// junction that feeds the last `satin`.
    fn right_boundary(
        &mut self,
        last: &ElementId,
        formula: &ElementId,
        index: usize,
    ) -> NclResult<ElementId> {
        let x = GADGET_PITCH * index as f64 + 5.0;
        let junction = self.id("junction");
        self.vertex(&junction, self.at(x + 1.0, 2.0))?;

        let tryout = self.id("probe.tryout");
        self.component(&tryout, self.at(x, 1.0), GadgetConfig::Converter)?;
        let tryout_port = tryout.child("port");
        self.edge(
            &self.id("probe.tryout.in"),
            &tryout_port,
            &last.child(QuantifierPort::TryOut.name()),
            Weight::Double,
        )?;
        self.edge(&self.id("probe.tryout.out"), &junction, &tryout_port, Weight::Single)?;

        let result = self.id("probe.result");
        self.component(&result, self.at(x, 3.0), GadgetConfig::Converter)?;
        let result_port = result.child("port");
        self.edge(
            &self.id("probe.result.in"),
            &result_port,
            &formula.child("satisfied"),
            Weight::Double,
        )?;
        self.edge(&self.id("probe.result.out"), &junction, &result_port, Weight::Single)?;

        self.edge(
            &self.id("junction.sat"),
            &last.child(QuantifierPort::SatIn.name()),
            &junction,
            Weight::Double,
        )?;

        self.label("label.tryout", self.at(x, 0.5), "try out")?;
        self.label("label.result", self.at(x, 3.5), "result")?;
        Ok(junction)
    }

    fn vertex(&mut self, id: &ElementId, position: Point) -> NclResult<()> {
        self.graph.add_vertex(id, position, true)?;
        Ok(())
    }

    fn edge(&mut self, id: &ElementId, from: &ElementId, to: &ElementId, weight: Weight) -> NclResult<()> {
        self.graph.add_edge(id, from, to, weight)?;
        Ok(())
    }

    fn component(&mut self, id: &ElementId, position: Point, config: GadgetConfig) -> NclResult<()> {
        self.graph.add_component(id, position, config)?;
        Ok(())
    }

    fn label(&mut self, name: &str, position: Point, text: &str) -> NclResult<()> {
        let id = self.id(name);
        self.graph.add_label(&id, position, text, Align::Center, Align::Center)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncl_core::NclError;

    #[test]
    fn ids_live_under_the_scope() {
        let mut graph = Graph::new();
        let scope = ElementId::from("g");
        let circuit =
            Compiler::compile_into(&mut graph, &scope, point(10.0, 0.0), "forall a exists b : (a||b)")
                .unwrap();
        assert_eq!(circuit.quantifiers, vec![ElementId::from("g.quantifier.a"), ElementId::from("g.quantifier.b")]);
        assert!(graph.has_edge("g.try.0"));
        assert!(graph.has_edge("g.sat.0"));
        assert!(graph.has_edge("g.lit.!b"));
        assert!(graph.has_label("g.label.result"));
        assert_eq!(graph.component("g.quantifier.a").unwrap().position(), point(10.0, 0.0));
        for vertex in graph.vertices() {
            assert!(vertex.id().starts_with(&scope));
        }
    }

    #[test]
    fn collision_leaves_graph_untouched() {
        let mut graph = Graph::new();
        graph.add_vertex("g.junction", point(0.0, 0.0), true).unwrap();
        graph.take_changed();
        let before = graph.revision();
        let err = Compiler::compile_into(&mut graph, &ElementId::from("g"), point(0.0, 0.0), "exists x : (x)")
            .unwrap_err();
        assert!(matches!(err, NclError::DuplicateId { .. }));
        assert_eq!(graph.vertex_count(), 1);
        assert_eq!(graph.edge_count(), 0);
        assert_eq!(graph.component_count(), 0);
        assert_eq!(graph.labels().count(), 0);
        assert_eq!(graph.revision(), before);
        assert!(!graph.is_changed());
    }

    #[test]
    fn two_circuits_side_by_side() {
        let mut graph = Graph::new();
        Compiler::compile_into(&mut graph, &ElementId::from("left"), point(0.0, 0.0), "exists x : (x)").unwrap();
        Compiler::compile_into(&mut graph, &ElementId::from("right"), point(20.0, 0.0), "exists x : (!x)").unwrap();
        assert_eq!(graph.component_count(), 2 * 4);
        assert!(graph.validate().all_satisfied());
    }
}
