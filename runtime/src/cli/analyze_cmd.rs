//! `vc-hunter analyze <input>`: full founder-to-VC landscape analysis.

use crate::cli::input::RunInput;
use crate::cli::output::{self, Styled};
use crate::cli::{clusters_cmd, gaps_cmd, match_cmd, relationships_cmd};
use crate::config::AnalysisConfig;
use crate::matching::similarity::Ranking;
use crate::pipeline::Analyzer;
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Instant;

/// Run the analyze command.
pub fn run(input: &Path, config: AnalysisConfig, top: usize) -> Result<()> {
    let start = Instant::now();
    let run = RunInput::load(input)?;
    let analyzer = Analyzer::new(config);
    let report = analyzer
        .analyze(&run.query, &run.candidates)
        .context("analysis failed")?;

    if output::is_json() {
        output::print_json(&report);
        return Ok(());
    }

    let s = Styled::new();
    if !output::is_quiet() {
        output::print_header(&s);
        eprintln!(
            "  Analyzed {} firms for {} in {:.1}ms",
            run.candidates.len(),
            s.bold(&report.query_id),
            start.elapsed().as_secs_f64() * 1000.0
        );
        eprintln!();
    }

    let ranking = Ranking {
        matches: report.matches.clone(),
        excluded: report.excluded.clone(),
    };
    match_cmd::print_matches(&s, &ranking, top);
    match_cmd::print_entities(&s, &report.similar_entities);
    clusters_cmd::print_clusters(&s, &report.clusters);
    relationships_cmd::print_graph(&s, &report.relationships);
    gaps_cmd::print_gaps(&s, &report.gaps);
    Ok(())
}
