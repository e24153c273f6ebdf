//! RelationshipGraphBuilder: accumulates collaboration and competition
//! signals and merges them into one edge per unordered candidate pair.

use crate::error::{MatchError, Result};
use crate::model::{CandidateRecord, EdgeKind, RelationshipEdge};
use crate::relationships::graph::RelationshipGraph;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

/// A weighted signal between two candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedPair {
    pub a: String,
    pub b: String,
    pub weight: f64,
}

impl WeightedPair {
    pub fn new(a: impl Into<String>, b: impl Into<String>, weight: f64) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            weight,
        }
    }
}

/// Builder for constructing a RelationshipGraph incrementally.
///
/// The first edge recorded for a pair fixes its weight; later signals of a
/// different kind only upgrade the kind to [`EdgeKind::Both`].
pub struct RelationshipGraphBuilder {
    nodes: BTreeSet<String>,
    edges: Vec<RelationshipEdge>,
    index: HashMap<(String, String), usize>,
}

impl RelationshipGraphBuilder {
    pub fn new() -> Self {
        Self {
            nodes: BTreeSet::new(),
            edges: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Register a node even if no edge ever touches it.
    pub fn add_node(&mut self, id: &str) {
        if !self.nodes.contains(id) {
            self.nodes.insert(id.to_string());
        }
    }

    pub fn add_collaboration(&mut self, a: &str, b: &str, weight: f64) -> Result<()> {
        self.add_edge(a, b, EdgeKind::Collaboration, weight)
    }

    pub fn add_competition(&mut self, a: &str, b: &str, weight: f64) -> Result<()> {
        self.add_edge(a, b, EdgeKind::Competition, weight)
    }

    /// Add or merge an edge. Rejects self-pairs with `InvalidEdge`.
    pub fn add_edge(&mut self, a: &str, b: &str, kind: EdgeKind, weight: f64) -> Result<()> {
        if a == b {
            return Err(MatchError::InvalidEdge(format!(
                "self-pair {a} <-> {b} ({})",
                kind.as_str()
            )));
        }
        let (source, target) = if a < b { (a, b) } else { (b, a) };
        self.add_node(source);
        self.add_node(target);

        let key = (source.to_string(), target.to_string());
        match self.index.get(&key) {
            Some(&idx) => {
                let edge = &mut self.edges[idx];
                let merged = edge.kind.merge(kind);
                if merged != edge.kind {
                    debug!("{source} <-> {target}: {} -> {}", edge.kind.as_str(), merged.as_str());
                }
                edge.kind = merged;
            }
            None => {
                self.index.insert(key, self.edges.len());
                self.edges.push(RelationshipEdge {
                    source: source.to_string(),
                    target: target.to_string(),
                    kind,
                    weight,
                });
            }
        }
        Ok(())
    }

    /// Whether the unordered pair already has an edge.
    pub fn has_edge(&self, a: &str, b: &str) -> bool {
        let (source, target) = if a < b { (a, b) } else { (b, a) };
        self.index
            .contains_key(&(source.to_string(), target.to_string()))
    }

    /// Finalize the graph.
    pub fn build(self) -> RelationshipGraph {
        RelationshipGraph::new(self.nodes, self.edges)
    }
}

impl Default for RelationshipGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a graph from explicit signals. Collaborations are inserted first,
/// so on overlap the collaboration weight is kept.
///
/// Any self-pair fails the whole build.
pub fn build(
    collaborations: &[WeightedPair],
    competitions: &[WeightedPair],
) -> Result<RelationshipGraph> {
    let mut builder = RelationshipGraphBuilder::new();
    for pair in collaborations {
        builder.add_collaboration(&pair.a, &pair.b, pair.weight)?;
    }
    for pair in competitions {
        builder.add_competition(&pair.a, &pair.b, pair.weight)?;
    }
    Ok(builder.build())
}

/// Collaboration and competition signals derived from association overlap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverlapSignals {
    pub collaborations: Vec<WeightedPair>,
    pub competitions: Vec<WeightedPair>,
}

/// Derive pairwise signals from shared associations (portfolio overlap).
///
/// For every unordered candidate pair: names held by both count toward
/// collaboration, names held by exactly one count toward competition.
/// Names are trimmed and lowercased; duplicates within a list count once.
/// Zero counts produce no signal.
pub fn overlap_signals(candidates: &[CandidateRecord]) -> OverlapSignals {
    let sets: Vec<BTreeSet<String>> = candidates
        .iter()
        .map(|c| {
            c.associations
                .iter()
                .map(|e| normalize_name(&e.name))
                .filter(|n| !n.is_empty())
                .collect()
        })
        .collect();

    let mut signals = OverlapSignals::default();
    for i in 0..candidates.len() {
        for j in (i + 1)..candidates.len() {
            let shared = sets[i].intersection(&sets[j]).count();
            let exclusive = sets[i].symmetric_difference(&sets[j]).count();
            let (a, b) = (&candidates[i].id, &candidates[j].id);
            if shared > 0 {
                signals
                    .collaborations
                    .push(WeightedPair::new(a.as_str(), b.as_str(), shared as f64));
            }
            if exclusive > 0 {
                signals
                    .competitions
                    .push(WeightedPair::new(a.as_str(), b.as_str(), exclusive as f64));
            }
        }
    }
    signals
}

/// Build the relationship graph from candidate association lists.
///
/// Every candidate becomes a node. Duplicate candidate ids surface as
/// `InvalidEdge` once they produce a signal.
pub fn from_associations(candidates: &[CandidateRecord]) -> Result<RelationshipGraph> {
    let signals = overlap_signals(candidates);
    let mut builder = RelationshipGraphBuilder::new();
    for candidate in candidates {
        builder.add_node(&candidate.id);
    }
    for pair in &signals.collaborations {
        builder.add_collaboration(&pair.a, &pair.b, pair.weight)?;
    }
    for pair in &signals.competitions {
        builder.add_competition(&pair.a, &pair.b, pair.weight)?;
    }
    Ok(builder.build())
}

fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}
