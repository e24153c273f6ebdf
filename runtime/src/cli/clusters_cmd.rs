//! `vc-hunter clusters <input>`: group VC firms into thematic clusters.

use crate::cli::input::RunInput;
use crate::cli::output::{self, Styled};
use crate::config::AnalysisConfig;
use crate::matching::cluster::{self, cluster_members, cluster_sizes};
use crate::model::ClusterAssignment;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the clusters command.
pub fn run(input: &Path, config: &AnalysisConfig) -> Result<()> {
    let run = RunInput::load(input)?;
    let assignment = cluster::assign_clusters(
        &run.candidates,
        Some(run.query.embedding.len()),
        &config.cluster,
    )
        .context("clustering failed")?;

    if output::is_json() {
        output::print_json(&assignment);
        return Ok(());
    }

    let s = Styled::new();
    if !output::is_quiet() {
        output::print_header(&s);
    }
    print_clusters(&s, &assignment);
    Ok(())
}

/// Print cluster count, validity and members.
pub fn print_clusters(s: &Styled, assignment: &ClusterAssignment) {
    let validity = assignment
        .validity
        .map(|v| format!("silhouette {v:.4}"))
        .unwrap_or_else(|| "silhouette n/a".to_string());
    output::print_section(
        s,
        &format!("Clusters ({}, {validity})", assignment.k),
    );
    for (label, size) in cluster_sizes(assignment) {
        output::print_check(
            &s.cyan(&format!("#{label}")),
            &format!("{size} firm(s)"),
            "",
        );
        for id in cluster_members(assignment, label) {
            output::print_detail(id);
        }
    }
    eprintln!();
}
