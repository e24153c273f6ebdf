//! Similarity ranking of candidates and their associated entities against
//! a query vector.

use crate::error::Result;
use crate::matching::vector::{cosine_similarity, round_score, validate_nonzero};
use crate::model::{CandidateRecord, EntityMatch, Exclusion, MatchResult};
use std::cmp::Ordering;
use tracing::warn;

/// Default number of associated entities returned by [`similar_entities`].
pub const DEFAULT_TOP_ENTITIES: usize = 5;

/// Matches plus the candidates that were skipped on the way.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    pub matches: Vec<MatchResult>,
    pub excluded: Vec<Exclusion>,
}

/// Rank candidates by cosine similarity to `query`.
///
/// Scores are rounded to 4 decimals before ordering; ties are broken by
/// candidate id ascending. Candidates with a malformed embedding are logged
/// and left out. Only an invalid query fails the call.
pub fn rank(query: &[f32], candidates: &[CandidateRecord]) -> Result<Vec<MatchResult>> {
    Ok(rank_with_exclusions(query, candidates)?.matches)
}

/// Same as [`rank`], also reporting which candidates were skipped and why.
pub fn rank_with_exclusions(query: &[f32], candidates: &[CandidateRecord]) -> Result<Ranking> {
    validate_nonzero(query)?;

    let mut excluded = Vec::new();
    let mut scored: Vec<(&str, f64)> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match cosine_similarity(query, &candidate.embedding) {
            Ok(sim) => scored.push((candidate.id.as_str(), round_score(sim))),
            Err(e) if !e.is_per_item() => return Err(e),
            Err(e) => {
                warn!("skipping candidate {}: {e}", candidate.id);
                excluded.push(Exclusion {
                    id: candidate.id.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    scored.sort_by(|a, b| by_score_then_id(a.1, a.0, b.1, b.0));

    let matches = scored
        .into_iter()
        .enumerate()
        .map(|(rank, (id, score))| MatchResult {
            candidate_id: id.to_string(),
            score,
            rank,
        })
        .collect();

    Ok(Ranking { matches, excluded })
}

/// Rank the associated entities of all candidates against `query` and keep
/// the `top_n` closest.
///
/// Entities without an embedding are ignored; entities with a malformed one
/// are logged and skipped. Ties order by entity name, then candidate id.
pub fn similar_entities(
    query: &[f32],
    candidates: &[CandidateRecord],
    top_n: usize,
) -> Result<Vec<EntityMatch>> {
    validate_nonzero(query)?;

    let mut results = Vec::new();
    for candidate in candidates {
        for entity in &candidate.associations {
            let Some(embedding) = entity.embedding.as_deref() else {
                continue;
            };
            match cosine_similarity(query, embedding) {
                Ok(sim) => results.push(EntityMatch {
                    entity_name: entity.name.clone(),
                    candidate_id: candidate.id.clone(),
                    similarity: round_score(sim),
                    description: entity.description.clone(),
                }),
                Err(e) if !e.is_per_item() => return Err(e),
                Err(e) => warn!(
                    "skipping entity {} of {}: {e}",
                    entity.name, candidate.id
                ),
            }
        }
    }

    results.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.entity_name.cmp(&b.entity_name))
            .then_with(|| a.candidate_id.cmp(&b.candidate_id))
    });
    results.truncate(top_n);
    Ok(results)
}

fn by_score_then_id(score_a: f64, id_a: &str, score_b: f64, id_b: &str) -> Ordering {
    score_b.total_cmp(&score_a).then_with(|| id_a.cmp(id_b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MatchError;
    use crate::model::AssociatedEntity;

    fn five_candidates() -> Vec<CandidateRecord> {
        vec![
            CandidateRecord::new("c0", vec![1.0, 0.0]),
            CandidateRecord::new("c1", vec![0.9, 0.1]),
            CandidateRecord::new("c2", vec![-1.0, 0.0]),
            CandidateRecord::new("c3", vec![-0.9, -0.1]),
            CandidateRecord::new("c4", vec![0.0, 1.0]),
        ]
    }

    #[test]
    fn test_rank_two_dimensional_scenario() {
        let results = rank(&[1.0, 0.0], &five_candidates()).unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(results[0].candidate_id, "c0");
        assert_eq!(results[0].score, 1.0);
        assert_eq!(results[1].candidate_id, "c1");
        assert_eq!(results[1].score, 0.9939);
        assert_eq!(results[2].candidate_id, "c4");
        assert_eq!(results[3].candidate_id, "c3");
        assert_eq!(results[4].candidate_id, "c2");
        for (i, r) in results.iter().enumerate() {
            assert_eq!(r.rank, i);
        }
    }

    #[test]
    fn test_rank_ties_break_by_id() {
        let candidates = vec![
            CandidateRecord::new("zeta", vec![2.0, 0.0]),
            CandidateRecord::new("alpha", vec![1.0, 0.0]),
            CandidateRecord::new("mid", vec![3.0, 0.0]),
        ];
        let results = rank(&[1.0, 0.0], &candidates).unwrap();
        let ids: Vec<&str> = results.iter().map(|r| r.candidate_id.as_str()).collect();
        assert_eq!(ids, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_rank_rounding_absorbs_jitter() {
        // Differ only past the 4th decimal: rounded scores tie, id decides.
        let candidates = vec![
            CandidateRecord::new("b", vec![1.0, 0.00001]),
            CandidateRecord::new("a", vec![1.0, 0.00002]),
        ];
        let results = rank(&[1.0, 0.0], &candidates).unwrap();
        assert_eq!(results[0].candidate_id, "a");
        assert_eq!(results[0].score, results[1].score);
    }

    #[test]
    fn test_rank_skips_malformed_candidates() {
        let mut candidates = five_candidates();
        candidates.push(CandidateRecord::new("wrong-dim", vec![1.0, 0.0, 0.0]));
        candidates.push(CandidateRecord::new("zero", vec![0.0, 0.0]));
        candidates.push(CandidateRecord::new("empty", vec![]));

        let ranking = rank_with_exclusions(&[1.0, 0.0], &candidates).unwrap();
        assert_eq!(ranking.matches.len(), 5);
        let skipped: Vec<&str> = ranking.excluded.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(skipped, vec!["wrong-dim", "zero", "empty"]);
    }

    #[test]
    fn test_every_per_item_failure_becomes_an_exclusion() {
        let candidates = vec![
            CandidateRecord::new("ok", vec![1.0, 0.0]),
            CandidateRecord::new("short", vec![1.0]),
            CandidateRecord::new("nan", vec![f32::NAN, 1.0]),
            CandidateRecord::new("zero", vec![0.0, 0.0]),
            CandidateRecord::new("empty", vec![]),
        ];
        let ranking = rank_with_exclusions(&[1.0, 0.0], &candidates).unwrap();
        assert_eq!(ranking.matches.len(), 1);
        let ids: Vec<&str> = ranking.excluded.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["short", "nan", "zero", "empty"]);

        for c in &candidates[1..] {
            let err = cosine_similarity(&[1.0, 0.0], &c.embedding).unwrap_err();
            assert!(err.is_per_item(), "{} should only skip the item", c.id);
        }
    }

    #[test]
    fn test_rank_empty_candidates() {
        assert!(rank(&[1.0, 0.0], &[]).unwrap().is_empty());
    }

    #[test]
    fn test_rank_invalid_query() {
        let err = rank(&[0.0, 0.0], &five_candidates()).unwrap_err();
        assert!(matches!(err, MatchError::ZeroMagnitude));
    }

    #[test]
    fn test_rank_is_idempotent() {
        let candidates = five_candidates();
        let first = rank(&[0.3, 0.7], &candidates).unwrap();
        let second = rank(&[0.3, 0.7], &candidates).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_similar_entities() {
        let mut a = CandidateRecord::new("https://a16z.com", vec![1.0, 0.0]);
        a.associations = vec![
            AssociatedEntity::named("Flexport").with_embedding(vec![0.8, 0.2]),
            AssociatedEntity::named("Instacart").with_embedding(vec![-1.0, 0.1]),
            AssociatedEntity::named("NoVector"),
        ];
        let mut b = CandidateRecord::new("https://foundersfund.com", vec![0.0, 1.0]);
        b.associations = vec![
            AssociatedEntity::named("Anduril").with_embedding(vec![1.0, 0.0]),
            AssociatedEntity::named("Broken").with_embedding(vec![1.0]),
        ];

        let results = similar_entities(&[1.0, 0.0], &[a, b], 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].entity_name, "Anduril");
        assert_eq!(results[0].candidate_id, "https://foundersfund.com");
        assert_eq!(results[1].entity_name, "Flexport");
    }
}
