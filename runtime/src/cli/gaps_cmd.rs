//! `vc-hunter gaps <input>`: clusters near the founder with thin coverage.

use crate::cli::input::RunInput;
use crate::cli::output::{self, Styled};
use crate::config::AnalysisConfig;
use crate::matching::{cluster, gap};
use crate::model::{GapReport, Vector};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::Path;

/// Run the gaps command.
pub fn run(input: &Path, config: &AnalysisConfig) -> Result<()> {
    let run = RunInput::load(input)?;
    let assignment = cluster::assign_clusters(
        &run.candidates,
        Some(run.query.embedding.len()),
        &config.cluster,
    )
        .context("clustering failed")?;
    let vectors: HashMap<String, Vector> = run
        .candidates
        .iter()
        .map(|c| (c.id.clone(), c.embedding.clone()))
        .collect();
    let report = gap::compute_coverage(&run.query.embedding, &assignment, &vectors)
        .context("gap analysis failed")?;

    if output::is_json() {
        output::print_json(&report);
        return Ok(());
    }

    let s = Styled::new();
    if !output::is_quiet() {
        output::print_header(&s);
    }
    print_gaps(&s, &report);
    Ok(())
}

/// Print the gap report, widest gap first.
pub fn print_gaps(s: &Styled, report: &GapReport) {
    output::print_section(s, "White space (lowest coverage first)");
    if report.is_empty() {
        output::print_detail(&s.dim("no cluster points toward the founder"));
    }
    for (i, entry) in report.entries.iter().enumerate() {
        let symbol = if i == 0 { s.ok_sym() } else { "  " };
        output::print_check(
            symbol,
            &format!("cluster #{} ({} firm(s))", entry.label, entry.size),
            &format!(
                "coverage {:.4}  similarity {:.4}",
                entry.coverage, entry.similarity
            ),
        );
    }
    eprintln!();
}
