//! ncl-project: the YAML graph description format.

pub mod load;
pub mod schema;

use std::path::Path;

use ncl_core::NclError;
use ncl_graph::Graph;

pub use load::{LoadIssue, LoadReport, Section, load_into};
pub use schema::{Arg, Flag, GraphDoc};

pub type LoadResult<T> = Result<T, LoadError>;

#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("Graph error: {0}")]
    Graph(#[from] NclError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub fn parse_str(text: &str) -> LoadResult<GraphDoc> {
    Ok(serde_yaml::from_str(text)?)
}

pub fn load_str(text: &str) -> LoadResult<(Graph, LoadReport)> {
    let doc = parse_str(text)?;
    let mut graph = Graph::new();
    let report = load_into(&mut graph, &doc)?;
    Ok((graph, report))
}

pub fn load_file(path: &Path) -> LoadResult<(Graph, LoadReport)> {
    let content = std::fs::read_to_string(path)?;
    load_str(&content)
}
