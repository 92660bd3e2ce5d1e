use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use ncl_core::{ElementId, NclError};
use ncl_graph::{GadgetKind, Graph, Validation};
use ncl_project::{LoadError, LoadReport};
use serde::Serialize;
use tracing::info;

#[derive(Parser)]
#[command(name = "ncl")]
#[command(about = "Non-deterministic Constraint Logic graphs and QBF circuits", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a graph description and validate its current position
    Check {
        /// Path to the graph YAML file
        path: PathBuf,
    },
    /// Compile a QBF into a circuit and report on it
    Compile {
        /// Formula, e.g. "forall x exists y : (x||y)&&(!x||!y)"
        qbf: String,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Apply a sequence of moves to a loaded graph
    Play {
        /// Path to the graph YAML file
        path: PathBuf,
        /// Edge to reverse; repeat for a sequence
        #[arg(long = "flip", value_name = "EDGE")]
        flips: Vec<String>,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Graph(#[from] NclError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

type CliResult<T> = Result<T, CliError>;

#[derive(Debug, Serialize)]
struct Summary {
    vertices: usize,
    edges: usize,
    components: usize,
    quantifiers: usize,
    labels: usize,
    satisfied: bool,
    unsatisfied: Vec<ElementId>,
    latch_changes: Vec<(ElementId, bool)>,
}

impl Summary {
    fn new(graph: &Graph, validation: &Validation) -> Self {
        let quantifiers = graph
            .components()
            .filter(|c| {
                matches!(c.kind(), GadgetKind::Existential { .. } | GadgetKind::Universal { .. })
            })
            .count();
        Self {
            vertices: graph.vertex_count(),
            edges: graph.edge_count(),
            components: graph.component_count(),
            quantifiers,
            labels: graph.labels().count(),
            satisfied: validation.all_satisfied(),
            unsatisfied: validation.unsatisfied.iter().cloned().collect(),
            latch_changes: validation.latch_changes.clone(),
        }
    }

    fn print(&self) {
        println!(
            "  {} vertices, {} edges, {} components ({} quantifiers), {} labels",
            self.vertices, self.edges, self.components, self.quantifiers, self.labels
        );
        for (id, value) in &self.latch_changes {
            println!("  latch {id} -> {}", if *value { "set" } else { "clear" });
        }
        if self.satisfied {
            println!("✓ All constraints satisfied");
        } else {
            println!("✗ {} unsatisfied vertices:", self.unsatisfied.len());
            for id in &self.unsatisfied {
                println!("    {id}");
            }
        }
    }
}

fn main() -> CliResult<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { path } => cmd_check(&path),
        Commands::Compile { qbf, json } => cmd_compile(&qbf, json),
        Commands::Play { path, flips } => cmd_play(&path, &flips),
    }
}

fn load(path: &Path) -> CliResult<Graph> {
    println!("Loading graph: {}", path.display());
    let (graph, report) = ncl_project::load_file(path)?;
    print_report(&report);
    Ok(graph)
}

fn print_report(report: &LoadReport) {
    if report.is_clean() {
        return;
    }
    println!("Skipped {} entries:", report.issues().len());
    for issue in report.issues() {
        println!("  {issue}");
    }
}

fn cmd_check(path: &Path) -> CliResult<()> {
    let mut graph = load(path)?;
    graph.check_integrity()?;
    let validation = graph.validate();
    Summary::new(&graph, &validation).print();
    Ok(())
}

fn cmd_compile(source: &str, json: bool) -> CliResult<()> {
    let mut graph = ncl_qbf::compile_qbf(source)?;
    let validation = graph.validate();
    let summary = Summary::new(&graph, &validation);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("Compiled: {source}");
        summary.print();
    }
    Ok(())
}

fn cmd_play(path: &Path, flips: &[String]) -> CliResult<()> {
    let mut graph = load(path)?;
    // settle latches before the first move
    graph.validate();

    for edge in flips {
        let accepted = graph.try_reverse_edge(edge.as_str())?;
        info!(%edge, accepted, "move");
        println!("  {edge}: {}", if accepted { "accepted" } else { "rejected" });
    }

    let validation = graph.validate();
    Summary::new(&graph, &validation).print();
    Ok(())
}
