//! End-to-end behaviour of the public API.

use assert_json_diff::assert_json_include;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use vc_hunter::embedding::{embed_candidates, embed_query, AssociationDocument, CandidateDocument};
use vc_hunter::{
    compute_coverage, cosine_similarity, rank, select_clusters, AnalysisConfig, Analyzer,
    CandidateRecord, ClusterAssignment, ClusterParams, EdgeKind, MatchError, QueryRecord, Vector,
    WeightedPair,
};

#[test]
fn test_five_candidate_ranking() {
    let candidates = vec![
        CandidateRecord::new("c0", vec![1.0, 0.0]),
        CandidateRecord::new("c1", vec![0.9, 0.1]),
        CandidateRecord::new("c2", vec![-1.0, 0.0]),
        CandidateRecord::new("c3", vec![-0.9, -0.1]),
        CandidateRecord::new("c4", vec![0.0, 1.0]),
    ];
    let results = rank(&[1.0, 0.0], &candidates).unwrap();

    assert_eq!(results[0].candidate_id, "c0");
    assert!((results[0].score - 1.0).abs() < 1e-4);
    assert_eq!(results[1].candidate_id, "c1");
    assert!((results[1].score - 0.99).abs() < 0.01);
    assert!(results[2..].iter().all(|r| r.score < results[1].score));
}

#[test]
fn test_rank_never_drops_valid_candidates() {
    let candidates: Vec<CandidateRecord> = (0..20)
        .map(|i| {
            let angle = i as f32 * 0.3;
            CandidateRecord::new(format!("vc-{i}"), vec![angle.cos(), angle.sin(), 0.5])
        })
        .collect();
    let results = rank(&[0.2, 0.9, 0.1], &candidates).unwrap();
    assert_eq!(results.len(), candidates.len());
    let ids: HashSet<&str> = results.iter().map(|r| r.candidate_id.as_str()).collect();
    assert_eq!(ids.len(), candidates.len());
    assert_eq!(rank(&[0.2, 0.9, 0.1], &candidates).unwrap(), results);
}

#[test]
fn test_cosine_self_similarity() {
    let a = [0.25f32, -3.0, 7.5, 0.001];
    assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-9);
}

#[test]
fn test_three_groups_select_k3() {
    let mut vectors: Vec<Vector> = Vec::new();
    for (cx, cy) in [(0.0f32, 0.0f32), (10.0, 0.0), (5.0, 10.0)] {
        for (dx, dy) in [(0.1, 0.0), (-0.1, 0.1), (0.0, -0.1), (0.05, 0.05), (-0.05, -0.05)] {
            vectors.push(vec![cx + dx, cy + dy]);
        }
    }
    let selection = select_clusters(&vectors, &ClusterParams::default()).unwrap();
    assert_eq!(selection.k, 3);
    for group in 0..3 {
        let labels: HashSet<usize> = selection.labels[group * 5..group * 5 + 5]
            .iter()
            .copied()
            .collect();
        assert_eq!(labels.len(), 1);
    }
}

#[test]
fn test_single_vector_single_cluster() {
    let selection = select_clusters(&[vec![3.0, 4.0]], &ClusterParams::default()).unwrap();
    assert_eq!(selection.k, 1);
    assert_eq!(selection.labels, vec![0]);
    assert!(selection.validity.is_none());
}

#[test]
fn test_graph_merge_and_self_edge() {
    let graph = vc_hunter::relationships::build(
        &[WeightedPair::new("A", "B", 0.7)],
        &[WeightedPair::new("A", "B", 0.3)],
    )
    .unwrap();
    assert_eq!(graph.edges().len(), 1);
    assert_eq!(graph.edges()[0].kind, EdgeKind::Both);
    assert_eq!(graph.edges()[0].weight, 0.7);

    let err = vc_hunter::relationships::build(&[WeightedPair::new("A", "A", 1.0)], &[])
        .unwrap_err();
    assert!(matches!(err, MatchError::InvalidEdge(_)));
}

#[test]
fn test_coverage_keeps_only_near_cluster() {
    let assignment = ClusterAssignment {
        labels: [("near", 0), ("far-1", 1), ("far-2", 1)]
            .into_iter()
            .map(|(id, l)| (id.to_string(), l))
            .collect(),
        k: 2,
        validity: Some(0.8),
    };
    let vectors: HashMap<String, Vector> = [
        ("near", vec![0.9, 0.2]),
        ("far-1", vec![-1.0, 0.0]),
        ("far-2", vec![-0.8, -0.3]),
    ]
    .into_iter()
    .map(|(id, v)| (id.to_string(), v))
    .collect();

    let report = compute_coverage(&[1.0, 0.0], &assignment, &vectors).unwrap();
    assert_eq!(report.labels(), vec![0]);
}

#[test]
fn test_documents_through_analyzer() {
    // Toy provider: one dimension per theme keyword.
    let provider = |text: &str| -> vc_hunter::Result<Vector> {
        if text.is_empty() {
            return Err(MatchError::EmbeddingUnavailable("empty document".into()));
        }
        let count = |word: &str| text.matches(word).count() as f32 + 0.01;
        Ok(vec![count("climate"), count("fintech"), count("bio")])
    };

    let docs = vec![
        CandidateDocument {
            id: "https://lowercarbon.vc".into(),
            text: "climate climate energy".into(),
            associations: vec![AssociationDocument {
                name: "Charm Industrial".into(),
                text: Some("climate carbon removal".into()),
            }],
        },
        CandidateDocument {
            id: "https://congruent.vc".into(),
            text: "climate infrastructure".into(),
            associations: vec![AssociationDocument {
                name: "Charm Industrial".into(),
                text: Some("climate carbon removal".into()),
            }],
        },
        CandidateDocument {
            id: "https://ribbit.vc".into(),
            text: "fintech fintech".into(),
            associations: vec![AssociationDocument {
                name: "Robinhood".into(),
                text: Some("fintech brokerage".into()),
            }],
        },
        CandidateDocument {
            id: "https://empty.vc".into(),
            text: String::new(),
            associations: Vec::new(),
        },
    ];

    let query: QueryRecord = embed_query(&provider, "founder", "climate startup").unwrap();
    let embedded = embed_candidates(&provider, &docs);
    assert_eq!(embedded.excluded.len(), 1);
    assert_eq!(embedded.excluded[0].id, "https://empty.vc");

    let report = Analyzer::new(AnalysisConfig::default())
        .analyze(&query, &embedded.records)
        .unwrap();

    assert_eq!(report.matches.len(), 3);
    assert_eq!(report.matches[2].candidate_id, "https://ribbit.vc");
    assert_eq!(report.similar_entities[0].entity_name, "Charm Industrial");

    let json = serde_json::to_value(&report).unwrap();
    assert_json_include!(
        actual: json,
        expected: json!({
            "query_id": "founder",
            "relationships": {
                "edges": [{
                    "source": "https://congruent.vc",
                    "target": "https://lowercarbon.vc",
                    "kind": "collaboration",
                    "weight": 1.0
                }]
            }
        })
    );
}
