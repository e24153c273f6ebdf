//! `vc-hunter match <input>`: rank VC firms and portfolio companies
//! against the founder.

use crate::cli::input::RunInput;
use crate::cli::output::{self, Styled};
use crate::config::AnalysisConfig;
use crate::matching::similarity::{self, Ranking};
use crate::model::EntityMatch;
use anyhow::{Context, Result};
use std::path::Path;

/// Run the match command.
pub fn run(input: &Path, config: &AnalysisConfig, top: usize) -> Result<()> {
    let run = RunInput::load(input)?;
    let ranking = similarity::rank_with_exclusions(&run.query.embedding, &run.candidates)
        .context("query embedding is unusable")?;
    let entities =
        similarity::similar_entities(&run.query.embedding, &run.candidates, config.top_entities)?;

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "query_id": run.query.id,
            "matches": ranking.matches,
            "similar_entities": entities,
            "excluded": ranking.excluded,
        }));
        return Ok(());
    }

    let s = Styled::new();
    if !output::is_quiet() {
        output::print_header(&s);
    }
    print_matches(&s, &ranking, top);
    print_entities(&s, &entities);
    Ok(())
}

/// Print the top `top` ranked candidates and any exclusions.
pub fn print_matches(s: &Styled, ranking: &Ranking, top: usize) {
    output::print_section(s, "Top VC matches");
    if ranking.matches.is_empty() {
        output::print_detail(&s.dim("no candidates could be ranked"));
    }
    for m in ranking.matches.iter().take(top) {
        eprintln!(
            "    {:>3}. {:<40} {} {}",
            m.rank + 1,
            m.candidate_id,
            s.score(m.score),
            s.dim(&output::bar(m.score, 20))
        );
    }
    if ranking.matches.len() > top && !output::is_quiet() {
        output::print_detail(&s.dim(&format!(
            "... and {} more",
            ranking.matches.len() - top
        )));
    }
    if !ranking.excluded.is_empty() {
        eprintln!();
        for e in &ranking.excluded {
            output::print_check(s.warn_sym(), &e.id, &e.reason);
        }
    }
    eprintln!();
}

/// Print the closest portfolio companies.
pub fn print_entities(s: &Styled, entities: &[EntityMatch]) {
    if entities.is_empty() {
        return;
    }
    output::print_section(s, "Closest portfolio companies");
    for e in entities {
        eprintln!(
            "    {:<28} {} {}",
            e.entity_name,
            s.score(e.similarity),
            s.dim(&format!("backed by {}", e.candidate_id))
        );
        if output::is_verbose() {
            if let Some(desc) = &e.description {
                output::print_detail(desc);
            }
        }
    }
    eprintln!();
}
