//! Cluster selection for candidate embeddings.
//!
//! Sweeps the cluster count, runs seeded k-means for each candidate `k`
//! and keeps the labelling with the highest mean silhouette.

use crate::error::{MatchError, Result};
use crate::matching::vector::{
    check_dimension, euclidean, squared_euclidean, validate, validate_nonzero,
};
use crate::model::{CandidateRecord, ClusterAssignment, Vector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// Seed for k-means initialization. Fixed so fixtures are reproducible.
pub const DEFAULT_SEED: u64 = 42;

/// Parameters for the cluster-count sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    pub min_k: usize,
    pub max_k: usize,
    /// Restarts per `k`; the lowest-inertia restart is kept.
    pub n_init: usize,
    pub max_iter: usize,
    /// Stop iterating once no centroid moves more than this (squared).
    pub tolerance: f64,
    pub seed: u64,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            min_k: 2,
            max_k: 10,
            n_init: 10,
            max_iter: 300,
            tolerance: 1e-4,
            seed: DEFAULT_SEED,
        }
    }
}

/// Outcome of [`select_clusters`].
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSelection {
    /// Dense 0-based label per input vector.
    pub labels: Vec<usize>,
    pub k: usize,
    /// Mean silhouette of the labelling, `None` when undefined.
    pub validity: Option<f64>,
    pub centroids: Vec<Vector>,
    pub inertia: f64,
}

impl ClusterSelection {
    fn single(vectors: &[Vector]) -> Self {
        let centroid = crate::matching::vector::mean(vectors.iter().map(|v| v.as_slice()))
            .unwrap_or_default();
        let inertia = vectors
            .iter()
            .map(|v| squared_euclidean(v, &centroid))
            .sum();
        Self {
            labels: vec![0; vectors.len()],
            k: 1,
            validity: None,
            centroids: if vectors.is_empty() {
                Vec::new()
            } else {
                vec![centroid]
            },
            inertia,
        }
    }
}

/// Choose a cluster count and labelling for `vectors`.
///
/// Fewer than two vectors (or an empty sweep range) yields a single cluster
/// with no validity score. Fails with `InsufficientData` on empty input and
/// with a vector error if the inputs are not uniformly shaped.
pub fn select_clusters(vectors: &[Vector], params: &ClusterParams) -> Result<ClusterSelection> {
    let n = vectors.len();
    if n == 0 {
        return Err(MatchError::InsufficientData(
            "cannot cluster zero vectors".into(),
        ));
    }
    let dim = vectors[0].len();
    for v in vectors {
        validate(v)?;
        check_dimension(v, dim)?;
    }

    if n < 2 {
        return Ok(ClusterSelection::single(vectors));
    }

    let upper = params.max_k.min(n - 1);
    let mut sweep: Vec<ClusterSelection> = Vec::new();

    for k in params.min_k.max(2)..=upper {
        let run = best_of_restarts(vectors, k, params);
        let labels = compact_labels(&run.labels);
        let distinct = labels.iter().max().map_or(0, |m| m + 1);
        if distinct < 2 {
            debug!("k={k}: collapsed to a single cluster, skipping");
            continue;
        }
        let score = silhouette_score(vectors, &labels, distinct);
        debug!("k={k}: silhouette {score:.4}, inertia {:.4}", run.inertia);

        sweep.push(ClusterSelection {
            centroids: recompute_centroids(vectors, &labels, distinct),
            labels,
            k: distinct,
            validity: Some(score),
            inertia: run.inertia,
        });
    }

    let scores: Vec<f64> = sweep
        .iter()
        .map(|s| s.validity.unwrap_or(f64::MIN))
        .collect();
    let best = best_silhouette(&scores).map(|idx| sweep.swap_remove(idx));

    match best {
        Some(selection) => {
            info!(
                "selected k={} with silhouette {:.4}",
                selection.k,
                selection.validity.unwrap_or_default()
            );
            Ok(selection)
        }
        None => {
            debug!("no cluster count in {}..={upper} applies, using one cluster", params.min_k);
            Ok(ClusterSelection::single(vectors))
        }
    }
}

/// Cluster candidate records and map the labels back to candidate ids.
///
/// With `expected_dim` set (normally the query's dimension) a candidate must
/// match it and have non-zero magnitude, the same rule ranking applies.
/// Without it, the first candidate with a valid embedding fixes the
/// dimension. Candidates that fail the check are logged and left unassigned.
pub fn assign_clusters(
    candidates: &[CandidateRecord],
    expected_dim: Option<usize>,
    params: &ClusterParams,
) -> Result<ClusterAssignment> {
    let mut ids: Vec<&str> = Vec::with_capacity(candidates.len());
    let mut vectors: Vec<Vector> = Vec::with_capacity(candidates.len());
    let mut dim = expected_dim;

    for candidate in candidates {
        let embedding = &candidate.embedding;
        let checked = match expected_dim {
            Some(d) => validate_nonzero(embedding).and_then(|_| check_dimension(embedding, d)),
            None => validate(embedding).and_then(|_| match dim {
                Some(d) => check_dimension(embedding, d),
                None => Ok(()),
            }),
        };
        match checked {
            Ok(()) => {
                dim.get_or_insert(embedding.len());
                ids.push(&candidate.id);
                vectors.push(embedding.clone());
            }
            Err(e) => warn!("leaving candidate {} out of clustering: {e}", candidate.id),
        }
    }

    if vectors.is_empty() {
        return Err(MatchError::InsufficientData(
            "no candidate has a usable embedding".into(),
        ));
    }

    let selection = select_clusters(&vectors, params)?;
    let labels = ids
        .into_iter()
        .map(String::from)
        .zip(selection.labels)
        .collect();

    Ok(ClusterAssignment {
        labels,
        k: selection.k,
        validity: selection.validity,
    })
}

/// Get all candidate ids belonging to a cluster, sorted.
pub fn cluster_members(assignment: &ClusterAssignment, label: usize) -> Vec<&str> {
    assignment
        .labels
        .iter()
        .filter(|(_, &l)| l == label)
        .map(|(id, _)| id.as_str())
        .collect()
}

/// Member count per cluster label.
pub fn cluster_sizes(assignment: &ClusterAssignment) -> BTreeMap<usize, usize> {
    let mut sizes = BTreeMap::new();
    for &label in assignment.labels.values() {
        *sizes.entry(label).or_insert(0) += 1;
    }
    sizes
}

struct KMeansRun {
    labels: Vec<usize>,
    inertia: f64,
}

fn best_of_restarts(vectors: &[Vector], k: usize, params: &ClusterParams) -> KMeansRun {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let mut runs: Vec<KMeansRun> = (0..params.n_init.max(1))
        .map(|_| kmeans(vectors, k, params, &mut rng))
        .collect();
    let inertias: Vec<f64> = runs.iter().map(|r| r.inertia).collect();
    match best_restart(&inertias) {
        Some(idx) => runs.swap_remove(idx),
        None => KMeansRun {
            labels: vec![0; vectors.len()],
            inertia: f64::INFINITY,
        },
    }
}

/// Position of the strictly highest silhouette; the smaller `k` wins ties.
fn best_silhouette(scores: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &score) in scores.iter().enumerate() {
        if best.map_or(true, |b| score > scores[b]) {
            best = Some(i);
        }
    }
    best
}

/// Position of the lowest inertia; the earliest restart wins ties.
fn best_restart(inertias: &[f64]) -> Option<usize> {
    let mut best: Option<usize> = None;
    for (i, &inertia) in inertias.iter().enumerate() {
        if best.map_or(true, |b| inertia < inertias[b]) {
            best = Some(i);
        }
    }
    best
}

/// One k-means run: k-means++ seeding followed by Lloyd iterations.
fn kmeans(vectors: &[Vector], k: usize, params: &ClusterParams, rng: &mut StdRng) -> KMeansRun {
    let n = vectors.len();
    let dim = vectors[0].len();
    let mut centroids = init_plus_plus(vectors, k, rng);
    let mut assignments = vec![0usize; n];

    for _ in 0..params.max_iter.max(1) {
        // Assign each point to nearest centroid
        for (i, v) in vectors.iter().enumerate() {
            assignments[i] = nearest_centroid(v, &centroids).0;
        }

        // Recompute centroids
        let mut sums = vec![vec![0.0f64; dim]; k];
        let mut counts = vec![0usize; k];
        for (i, v) in vectors.iter().enumerate() {
            let c = assignments[i];
            counts[c] += 1;
            for (d, &val) in v.iter().enumerate() {
                sums[c][d] += val as f64;
            }
        }

        let mut shift = 0.0f64;
        for c in 0..k {
            let updated: Vector = if counts[c] > 0 {
                sums[c].iter().map(|s| (s / counts[c] as f64) as f32).collect()
            } else {
                // Empty cluster: move it onto the point worst served right now.
                farthest_point(vectors, &centroids).clone()
            };
            shift = shift.max(squared_euclidean(&centroids[c], &updated));
            centroids[c] = updated;
        }

        if shift <= params.tolerance {
            break;
        }
    }

    let mut inertia = 0.0;
    for (i, v) in vectors.iter().enumerate() {
        let (c, dist) = nearest_centroid(v, &centroids);
        assignments[i] = c;
        inertia += dist;
    }

    KMeansRun {
        labels: assignments,
        inertia,
    }
}

fn init_plus_plus(vectors: &[Vector], k: usize, rng: &mut StdRng) -> Vec<Vector> {
    let n = vectors.len();
    let mut centroids: Vec<Vector> = Vec::with_capacity(k);
    centroids.push(vectors[rng.gen_range(0..n)].clone());

    while centroids.len() < k {
        let weights: Vec<f64> = vectors
            .iter()
            .map(|v| nearest_centroid(v, &centroids).1)
            .collect();
        let total: f64 = weights.iter().sum();
        let idx = if total > 0.0 {
            let mut target = rng.gen::<f64>() * total;
            let mut chosen = n - 1;
            for (i, w) in weights.iter().enumerate() {
                if target < *w {
                    chosen = i;
                    break;
                }
                target -= w;
            }
            chosen
        } else {
            // All points coincide with existing centroids.
            rng.gen_range(0..n)
        };
        centroids.push(vectors[idx].clone());
    }
    centroids
}

/// Index of and squared distance to the closest centroid.
fn nearest_centroid(v: &[f32], centroids: &[Vector]) -> (usize, f64) {
    let mut best_cluster = 0;
    let mut best_dist = f64::MAX;
    for (c, centroid) in centroids.iter().enumerate() {
        let dist = squared_euclidean(v, centroid);
        if dist < best_dist {
            best_dist = dist;
            best_cluster = c;
        }
    }
    (best_cluster, best_dist)
}

fn farthest_point<'a>(vectors: &'a [Vector], centroids: &[Vector]) -> &'a Vector {
    let mut best = &vectors[0];
    let mut best_dist = f64::MIN;
    for v in vectors {
        let dist = nearest_centroid(v, centroids).1;
        if dist > best_dist {
            best_dist = dist;
            best = v;
        }
    }
    best
}

/// Relabel so labels are dense, in order of first appearance.
fn compact_labels(labels: &[usize]) -> Vec<usize> {
    let mut mapping: BTreeMap<usize, usize> = BTreeMap::new();
    let mut next = 0;
    labels
        .iter()
        .map(|&l| {
            *mapping.entry(l).or_insert_with(|| {
                let assigned = next;
                next += 1;
                assigned
            })
        })
        .collect()
}

fn recompute_centroids(vectors: &[Vector], labels: &[usize], k: usize) -> Vec<Vector> {
    (0..k)
        .map(|c| {
            let members = vectors
                .iter()
                .zip(labels.iter())
                .filter(|(_, &l)| l == c)
                .map(|(v, _)| v.as_slice());
            crate::matching::vector::mean(members).unwrap_or_default()
        })
        .collect()
}

/// Mean silhouette coefficient with Euclidean distance.
///
/// A point alone in its cluster contributes 0.
pub fn silhouette_score(vectors: &[Vector], labels: &[usize], k: usize) -> f64 {
    let n = vectors.len();
    if n < 2 || k < 2 {
        return 0.0;
    }

    let mut cluster_counts = vec![0usize; k];
    for &l in labels {
        cluster_counts[l] += 1;
    }

    let mut total = 0.0;
    for i in 0..n {
        let own = labels[i];
        if cluster_counts[own] <= 1 {
            continue;
        }

        let mut sums = vec![0.0f64; k];
        for j in 0..n {
            if i != j {
                sums[labels[j]] += euclidean(&vectors[i], &vectors[j]);
            }
        }

        let a = sums[own] / (cluster_counts[own] - 1) as f64;
        let b = (0..k)
            .filter(|&c| c != own && cluster_counts[c] > 0)
            .map(|c| sums[c] / cluster_counts[c] as f64)
            .fold(f64::MAX, f64::min);
        if b == f64::MAX {
            continue;
        }

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }
    total / n as f64
}
