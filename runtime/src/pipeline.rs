//! Analyzer: runs every core operation over one query and candidate set.

use crate::config::AnalysisConfig;
use crate::error::{MatchError, Result};
use crate::matching::{cluster, gap, similarity};
use crate::matching::vector::validate_nonzero;
use crate::model::{
    CandidateRecord, ClusterAssignment, EntityMatch, Exclusion, GapReport, MatchResult,
    QueryRecord, Vector,
};
use crate::relationships::{self, RelationshipGraph};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Everything one run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub query_id: String,
    pub matches: Vec<MatchResult>,
    pub similar_entities: Vec<EntityMatch>,
    pub clusters: ClusterAssignment,
    pub relationships: RelationshipGraph,
    pub gaps: GapReport,
    /// Candidates left out of ranking, with the reason.
    pub excluded: Vec<Exclusion>,
}

/// Stateless orchestrator over the matching core.
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Run ranking, entity matching, clustering, relationship derivation
    /// and gap analysis.
    ///
    /// Fails on an invalid query, on zero candidates, and on relationship
    /// data that would produce a self-edge.
    pub fn analyze(
        &self,
        query: &QueryRecord,
        candidates: &[CandidateRecord],
    ) -> Result<AnalysisReport> {
        validate_nonzero(&query.embedding)?;
        if candidates.is_empty() {
            return Err(MatchError::InsufficientData(
                "no candidates to analyze".into(),
            ));
        }
        info!(
            "analyzing {} candidates for {}",
            candidates.len(),
            query.id
        );

        let ranking = similarity::rank_with_exclusions(&query.embedding, candidates)?;
        let similar_entities =
            similarity::similar_entities(&query.embedding, candidates, self.config.top_entities)?;
        let relationships = relationships::from_associations(candidates)?;

        // A candidate excluded from ranking stays out of every later stage.
        let excluded: HashSet<&str> = ranking.excluded.iter().map(|e| e.id.as_str()).collect();
        let usable: Vec<CandidateRecord> = candidates
            .iter()
            .filter(|c| !excluded.contains(c.id.as_str()))
            .cloned()
            .collect();
        let clusters = cluster::assign_clusters(
            &usable,
            Some(query.embedding.len()),
            &self.config.cluster,
        )?;

        let vectors: HashMap<String, Vector> = usable
            .iter()
            .map(|c| (c.id.clone(), c.embedding.clone()))
            .collect();
        let gaps = gap::compute_coverage(&query.embedding, &clusters, &vectors)?;

        Ok(AnalysisReport {
            query_id: query.id.clone(),
            matches: ranking.matches,
            similar_entities,
            clusters,
            relationships,
            gaps,
            excluded: ranking.excluded,
        })
    }
}

impl Default for Analyzer {
    fn default() -> Self {
        Self::new(AnalysisConfig::default())
    }
}
