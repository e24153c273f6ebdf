//! `vc-hunter relationships <input>`: VC relationship graph from
//! portfolio overlap.

use crate::cli::input::RunInput;
use crate::cli::output::{self, Styled};
use crate::model::EdgeKind;
use crate::relationships::{self, RelationshipGraph};
use anyhow::{Context, Result};
use std::path::Path;

/// Run the relationships command.
pub fn run(input: &Path) -> Result<()> {
    let run = RunInput::load(input)?;
    let graph = relationships::from_associations(&run.candidates)
        .context("failed to build relationship graph")?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "graph": graph,
            "components": graph.component_count(),
        }));
        return Ok(());
    }

    let s = Styled::new();
    if !output::is_quiet() {
        output::print_header(&s);
    }
    print_graph(&s, &graph);
    Ok(())
}

/// Print edges grouped by kind, then the component summary.
pub fn print_graph(s: &Styled, graph: &RelationshipGraph) {
    output::print_section(
        s,
        &format!(
            "Relationships ({} firms, {} edges, {} component(s))",
            graph.node_count(),
            graph.edges().len(),
            graph.component_count()
        ),
    );
    for kind in [EdgeKind::Both, EdgeKind::Collaboration, EdgeKind::Competition] {
        for edge in graph.edges_of_kind(kind) {
            let tag = match kind {
                EdgeKind::Both => s.yellow(kind.as_str()),
                EdgeKind::Collaboration => s.green(kind.as_str()),
                EdgeKind::Competition => s.red(kind.as_str()),
            };
            eprintln!(
                "    {} <-> {}  {tag} {}",
                edge.source,
                edge.target,
                s.dim(&format!("w={}", edge.weight))
            );
        }
    }
    eprintln!();
}
