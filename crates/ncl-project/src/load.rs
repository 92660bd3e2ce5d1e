//! Scoped loading of graph descriptions.
//!
//! Groups prefix their name onto every id they contain and add their
//! `position` to every coordinate. Vertices and components of every scope
//! are created first, then edges, then labels, so an edge may reference a
//! port or vertex from any group. A bad entry is reported and skipped; the
//! rest of the document still loads.

use core::fmt;

use ncl_core::{ElementId, NclError, NclResult, Point, ensure_finite, point};
use ncl_graph::{Align, GadgetConfig, Graph, Weight};
use ncl_qbf::Compiler;
use tracing::{debug, warn};

use crate::schema::{Arg, Flag, GraphDoc};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    Vertices,
    Edges,
    Components,
    Labels,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Section::Vertices => "vertex",
            Section::Edges => "edge",
            Section::Components => "component",
            Section::Labels => "label",
        };
        f.write_str(name)
    }
}

/// One skipped entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadIssue {
    pub section: Section,
    /// Scoped id as written, e.g. `g.q1`.
    pub id: String,
    pub error: NclError,
}

impl fmt::Display for LoadIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}: {}", self.section, self.id, self.error)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    issues: Vec<LoadIssue>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn issues(&self) -> &[LoadIssue] {
        &self.issues
    }

    fn record(&mut self, section: Section, scope: &Scope<'_>, key: &str, result: NclResult<()>) {
        if let Err(error) = result {
            let id = if scope.id.is_root() {
                key.to_string()
            } else {
                format!("{}.{key}", scope.id)
            };
            warn!(%section, %id, %error, "skipping entry");
            self.issues.push(LoadIssue { section, id, error });
        }
    }
}

struct Scope<'d> {
    id: ElementId,
    offset: Point,
    doc: &'d GraphDoc,
}

fn offset_of(doc: &GraphDoc) -> Point {
    doc.position.map_or(point(0.0, 0.0), |[x, y]| point(x, y))
}

fn collect_scopes<'d>(scope: Scope<'d>, out: &mut Vec<Scope<'d>>) -> NclResult<()> {
    let doc = scope.doc;
    let (id, offset) = (scope.id.clone(), scope.offset);
    out.push(scope);
    for (name, group) in &doc.groups {
        let child = Scope {
            id: id.join(&ElementId::parse(name)?),
            offset: offset + offset_of(group),
            doc: group,
        };
        collect_scopes(child, out)?;
    }
    Ok(())
}

/// Clear `graph` and rebuild it from `doc`.
///
/// Only a malformed group name aborts the load; every other problem is
/// confined to its entry and lands in the report.
pub fn load_into(graph: &mut Graph, doc: &GraphDoc) -> NclResult<LoadReport> {
    let mut scopes = Vec::new();
    let root = Scope {
        id: ElementId::root(),
        offset: offset_of(doc),
        doc,
    };
    collect_scopes(root, &mut scopes)?;

    graph.clear();
    let mut report = LoadReport::default();

    for scope in &scopes {
        for (key, entry) in &scope.doc.vertices {
            let result =
                Arg::tuple(entry).and_then(|args| load_vertex(graph, scope, key, &args));
            report.record(Section::Vertices, scope, key, result);
        }
        for (key, entry) in &scope.doc.components {
            let result =
                Arg::tuple(entry).and_then(|args| load_component(graph, scope, key, &args));
            report.record(Section::Components, scope, key, result);
        }
    }
    for scope in &scopes {
        for (key, entry) in &scope.doc.edges {
            let result =
                Arg::tuple(entry).and_then(|args| load_edge(graph, scope, key, &args));
            report.record(Section::Edges, scope, key, result);
        }
    }
    for scope in &scopes {
        for (key, entry) in &scope.doc.labels {
            let result =
                Arg::tuple(entry).and_then(|args| load_label(graph, scope, key, &args));
            report.record(Section::Labels, scope, key, result);
        }
    }

    debug!(
        scopes = scopes.len(),
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        components = graph.component_count(),
        issues = report.issues.len(),
        "graph loaded"
    );
    Ok(report)
}

fn entry_id(scope: &Scope<'_>, key: &str) -> NclResult<ElementId> {
    Ok(scope.id.join(&ElementId::parse(key)?))
}

/// Leading `x, y` pair, shifted by the scope offset.
fn coords<'a>(scope: &Scope<'_>, args: &'a [Arg]) -> NclResult<(Point, &'a [Arg])> {
    match args {
        [Arg::Num(x), Arg::Num(y), rest @ ..] => {
            let p = point(ensure_finite(*x, "x")?, ensure_finite(*y, "y")?);
            Ok((scope.offset + p, rest))
        }
        _ => Err(NclError::format("expected [x, y, ...]")),
    }
}

fn flags(args: &[Arg], allowed: &[Flag]) -> NclResult<Vec<Flag>> {
    args.iter()
        .map(|arg| {
            let word = arg
                .as_text()
                .ok_or_else(|| NclError::format(format!("unexpected value {arg}")))?;
            Flag::parse(word)
                .filter(|flag| allowed.contains(flag))
                .ok_or_else(|| NclError::format(format!("unknown flag '{word}'")))
        })
        .collect()
}

fn load_vertex(graph: &mut Graph, scope: &Scope<'_>, key: &str, args: &[Arg]) -> NclResult<()> {
    let id = entry_id(scope, key)?;
    let (position, rest) = coords(scope, args)?;
    let flags = flags(rest, &[Flag::Hidden, Flag::Muted])?;

    graph.add_vertex(&id, position, !flags.contains(&Flag::Hidden))?;
    if flags.contains(&Flag::Muted) {
        graph.set_vertex_muted(&id, true)?;
    }
    Ok(())
}

fn parse_weight(n: f64) -> NclResult<Weight> {
    if n.fract() != 0.0 || !(0.0..=f64::from(u32::MAX)).contains(&n) {
        return Err(NclError::format(format!("invalid weight {n}")));
    }
    Weight::try_from(n as u32)
}

/// A reference names a vertex in the current scope if one exists there,
/// otherwise a vertex from the root.
fn resolve(graph: &Graph, scope: &Scope<'_>, reference: &str) -> NclResult<ElementId> {
    let relative = ElementId::parse(reference)?;
    let scoped = scope.id.join(&relative);
    if graph.has_vertex(&scoped) || !graph.has_vertex(&relative) {
        Ok(scoped)
    } else {
        Ok(relative)
    }
}

fn load_edge(graph: &mut Graph, scope: &Scope<'_>, key: &str, args: &[Arg]) -> NclResult<()> {
    const EDGE_FLAGS: [Flag; 3] = [Flag::Muted, Flag::Label, Flag::Flip];

    let id = entry_id(scope, key)?;
    let (from, rest) = match args {
        [Arg::Text(from), rest @ ..] if Flag::parse(from).is_none() => (from.as_str(), rest),
        _ => return Err(NclError::format("expected [from, to?, weight?, flags...]")),
    };

    let mut to = None;
    let mut weight = None;
    let mut flags = Vec::new();
    for arg in rest {
        match arg {
            Arg::Num(n) if weight.is_none() && flags.is_empty() => weight = Some(parse_weight(*n)?),
            Arg::Text(word) => match Flag::parse(word) {
                Some(flag) if EDGE_FLAGS.contains(&flag) => flags.push(flag),
                Some(_) => return Err(NclError::format(format!("unknown flag '{word}'"))),
                None if to.is_none() && weight.is_none() && flags.is_empty() => {
                    to = Some(word.as_str());
                }
                None => return Err(NclError::format(format!("unexpected value {word}"))),
            },
            other => return Err(NclError::format(format!("unexpected value {other}"))),
        }
    }

    let from = resolve(graph, scope, from)?;
    let to = match to {
        Some(to) => resolve(graph, scope, to)?,
        None => from.clone(),
    };
    graph.add_edge(&id, from, to, weight.unwrap_or(Weight::Single))?;

    for flag in flags {
        match flag {
            Flag::Muted => graph.set_edge_muted(&id, true)?,
            Flag::Label => graph.set_edge_label_visible(&id, true)?,
            Flag::Flip => {
                graph.reverse_edge(&id)?;
            }
            Flag::Hidden => {}
        }
    }
    Ok(())
}

enum Build<'a> {
    Gadget(GadgetConfig),
    Circuit(&'a str),
}

fn variable_arg(text: &str) -> NclResult<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_alphabetic() => Ok(c),
        _ => Err(NclError::format(format!("'{text}' is not a single-letter variable"))),
    }
}

fn text_arg<'a>(kind: &str, rest: &'a [Arg]) -> NclResult<(&'a str, &'a [Arg])> {
    match rest {
        [Arg::Text(text), tail @ ..] => Ok((text.as_str(), tail)),
        _ => Err(NclError::format(format!("{kind} needs an argument"))),
    }
}

fn load_component(graph: &mut Graph, scope: &Scope<'_>, key: &str, args: &[Arg]) -> NclResult<()> {
    let id = entry_id(scope, key)?;
    let (position, rest) = coords(scope, args)?;
    let (kind, rest) = match rest {
        [Arg::Text(kind), rest @ ..] => (kind.as_str(), rest),
        _ => return Err(NclError::format("missing component kind")),
    };

    let (build, rest) = match kind {
        "converter" => (Build::Gadget(GadgetConfig::Converter), rest),
        "existential" => {
            let (text, tail) = text_arg(kind, rest)?;
            let variable = variable_arg(text)?;
            (Build::Gadget(GadgetConfig::Existential { variable }), tail)
        }
        "universal" => {
            let (text, tail) = text_arg(kind, rest)?;
            let variable = variable_arg(text)?;
            (Build::Gadget(GadgetConfig::Universal { variable }), tail)
        }
        "cnf" => {
            let (text, tail) = text_arg(kind, rest)?;
            (Build::Gadget(GadgetConfig::Cnf { formula: text.to_string() }), tail)
        }
        "qbf" => {
            let (text, tail) = text_arg(kind, rest)?;
            (Build::Circuit(text), tail)
        }
        other => return Err(NclError::format(format!("unknown component kind '{other}'"))),
    };
    let muted = flags(rest, &[Flag::Muted])?.contains(&Flag::Muted);

    match build {
        Build::Gadget(config) => {
            graph.add_component(&id, position, config)?;
            if muted {
                graph.set_component_muted(&id, true)?;
            }
        }
        Build::Circuit(source) => {
            let circuit = Compiler::compile_into(graph, &id, position, source)?;
            if muted {
                for gadget in circuit.quantifiers.iter().chain([&circuit.formula]) {
                    graph.set_component_muted(gadget, true)?;
                }
            }
        }
    }
    Ok(())
}

fn load_label(graph: &mut Graph, scope: &Scope<'_>, key: &str, args: &[Arg]) -> NclResult<()> {
    let id = entry_id(scope, key)?;
    let (position, rest) = coords(scope, args)?;
    let (text, aligns) = match rest {
        [text, aligns @ ..] if aligns.len() <= 2 => (text.to_string(), aligns),
        _ => return Err(NclError::format("expected [x, y, text, halign?, valign?]")),
    };
    let align = |arg: Option<&Arg>| -> NclResult<Align> {
        match arg {
            None => Ok(Align::default()),
            Some(arg) => arg.to_string().parse(),
        }
    };
    graph.add_label(&id, position, text, align(aligns.first())?, align(aligns.get(1))?)?;
    Ok(())
}
