//! Gap analysis: which thematic clusters near the founder are thinly
//! covered by investors.

use crate::error::Result;
use crate::matching::vector::{
    check_dimension, cosine_similarity, mean, round_score, validate, validate_nonzero,
};
use crate::model::{ClusterAssignment, GapEntry, GapReport, Vector};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, warn};

/// Coverage of a cluster relative to the query position.
///
/// `similarity * ln(1 + size)`: a close cluster with few members scores low
/// and reads as white space.
pub fn coverage(similarity: f64, size: usize) -> f64 {
    similarity * (1.0 + size as f64).ln()
}

/// Rank clusters by ascending coverage.
///
/// Clusters whose centroid points away from the query (negative cosine)
/// are excluded rather than reported as gaps. Members missing from
/// `vectors_by_candidate` or with unusable vectors are skipped.
pub fn compute_coverage(
    query: &[f32],
    assignment: &ClusterAssignment,
    vectors_by_candidate: &HashMap<String, Vector>,
) -> Result<GapReport> {
    validate_nonzero(query)?;

    let mut members: BTreeMap<usize, Vec<&[f32]>> = BTreeMap::new();
    for (id, &label) in &assignment.labels {
        let Some(vector) = vectors_by_candidate.get(id) else {
            warn!("no vector for clustered candidate {id}, skipping");
            continue;
        };
        if let Err(e) = validate(vector).and_then(|_| check_dimension(vector, query.len())) {
            warn!("skipping candidate {id} in coverage: {e}");
            continue;
        }
        members.entry(label).or_default().push(vector.as_slice());
    }

    let mut entries = Vec::new();
    for (label, vectors) in members {
        let size = vectors.len();
        let Some(centroid) = mean(vectors) else {
            continue;
        };
        let similarity = match cosine_similarity(query, &centroid) {
            Ok(s) => s,
            Err(e) => {
                warn!("cluster {label} has no usable centroid: {e}");
                continue;
            }
        };
        if similarity < 0.0 {
            debug!("cluster {label} faces away from the query ({similarity:.4}), excluded");
            continue;
        }
        entries.push(GapEntry {
            label,
            coverage: round_score(coverage(similarity, size)),
            similarity: round_score(similarity),
            size,
        });
    }

    entries.sort_by(|a, b| {
        a.coverage
            .total_cmp(&b.coverage)
            .then_with(|| a.label.cmp(&b.label))
    });

    Ok(GapReport { entries })
}
