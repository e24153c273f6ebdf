//! Core data types: candidate and query records, match results, cluster
//! assignments, relationship edges and gap reports.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A dense embedding. All vectors compared in one call must share a length.
pub type Vector = Vec<f32>;

/// An entity tied to a candidate, e.g. a portfolio company of a VC firm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssociatedEntity {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vector>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl AssociatedEntity {
    /// An entity known by name only.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            embedding: None,
            description: None,
        }
    }

    pub fn with_embedding(mut self, embedding: Vector) -> Self {
        self.embedding = Some(embedding);
        self
    }
}

/// One candidate (a VC firm) with its embedding and associations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    pub id: String,
    pub embedding: Vector,
    #[serde(default)]
    pub associations: Vec<AssociatedEntity>,
}

impl CandidateRecord {
    pub fn new(id: impl Into<String>, embedding: Vector) -> Self {
        Self {
            id: id.into(),
            embedding,
            associations: Vec::new(),
        }
    }

    /// Attach associated entities known by name only.
    pub fn with_associations<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.associations
            .extend(names.into_iter().map(AssociatedEntity::named));
        self
    }
}

/// The single query (the founder) of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryRecord {
    pub id: String,
    pub embedding: Vector,
}

impl QueryRecord {
    pub fn new(id: impl Into<String>, embedding: Vector) -> Self {
        Self {
            id: id.into(),
            embedding,
        }
    }
}

/// A ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate_id: String,
    /// Cosine similarity rounded to 4 decimal digits.
    pub score: f64,
    /// 0-based position in the descending ranking.
    pub rank: usize,
}

/// A ranked associated entity (portfolio company) close to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub entity_name: String,
    /// The candidate this entity is associated with.
    pub candidate_id: String,
    pub similarity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Cluster labels per candidate, plus the chosen K and its validity score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterAssignment {
    pub labels: BTreeMap<String, usize>,
    pub k: usize,
    /// Mean silhouette of the chosen labelling. `None` when not applicable
    /// (fewer than two points or a single cluster).
    pub validity: Option<f64>,
}

impl ClusterAssignment {
    pub fn label_of(&self, candidate_id: &str) -> Option<usize> {
        self.labels.get(candidate_id).copied()
    }
}

/// Nature of a relationship between two candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Collaboration,
    Competition,
    Both,
}

impl EdgeKind {
    /// Merge an incoming kind into an existing one.
    pub fn merge(self, other: EdgeKind) -> EdgeKind {
        if self == other {
            self
        } else {
            EdgeKind::Both
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::Collaboration => "collaboration",
            EdgeKind::Competition => "competition",
            EdgeKind::Both => "both",
        }
    }
}

/// An undirected edge. Endpoints are stored with `source < target`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    pub weight: f64,
}

impl RelationshipEdge {
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.source == a && self.target == b) || (self.source == b && self.target == a)
    }
}

/// One row of a gap report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapEntry {
    pub label: usize,
    pub coverage: f64,
    /// Cosine similarity between the query and the cluster centroid.
    pub similarity: f64,
    pub size: usize,
}

/// Relevant clusters ordered by ascending coverage (most white space first).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapReport {
    pub entries: Vec<GapEntry>,
}

impl GapReport {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// The cluster with the lowest coverage, if any.
    pub fn widest_gap(&self) -> Option<&GapEntry> {
        self.entries.first()
    }

    pub fn labels(&self) -> Vec<usize> {
        self.entries.iter().map(|e| e.label).collect()
    }
}

/// A candidate or entity left out of a run, with the reason.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exclusion {
    pub id: String,
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_kind_merge() {
        assert_eq!(
            EdgeKind::Collaboration.merge(EdgeKind::Competition),
            EdgeKind::Both
        );
        assert_eq!(
            EdgeKind::Competition.merge(EdgeKind::Competition),
            EdgeKind::Competition
        );
        assert_eq!(EdgeKind::Both.merge(EdgeKind::Collaboration), EdgeKind::Both);
    }

    #[test]
    fn test_candidate_deserialize_defaults() {
        let json = r#"{"id": "https://a16z.com", "embedding": [0.1, 0.2]}"#;
        let record: CandidateRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "https://a16z.com");
        assert!(record.associations.is_empty());
    }

    #[test]
    fn test_edge_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EdgeKind::Both).unwrap();
        assert_eq!(json, "\"both\"");
    }

    #[test]
    fn test_edge_connects_either_direction() {
        let edge = RelationshipEdge {
            source: "a".into(),
            target: "b".into(),
            kind: EdgeKind::Collaboration,
            weight: 1.0,
        };
        assert!(edge.connects("a", "b"));
        assert!(edge.connects("b", "a"));
        assert!(!edge.connects("a", "c"));
    }
}
