//! VC Hunter matching engine.
//!
//! Ranks VC firms against a founder by embedding similarity, groups firms
//! into thematic clusters, derives a relationship graph from portfolio
//! overlap, and surfaces under-covered clusters near the founder.
//!
//! The core takes precomputed vectors and records. Producing embeddings is
//! the job of an injected [`embedding::EmbeddingProvider`].

pub mod cli;
pub mod config;
pub mod embedding;
pub mod error;
pub mod matching;
pub mod model;
pub mod pipeline;
pub mod relationships;

pub use config::AnalysisConfig;
pub use error::{MatchError, Result};
pub use matching::cluster::{assign_clusters, select_clusters, ClusterParams, ClusterSelection};
pub use matching::gap::compute_coverage;
pub use matching::similarity::{rank, similar_entities};
pub use matching::vector::cosine_similarity;
pub use model::*;
pub use pipeline::{AnalysisReport, Analyzer};
pub use relationships::{RelationshipGraph, RelationshipGraphBuilder, WeightedPair};
