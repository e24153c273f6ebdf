//! Candidate relationship graph: construction, merge rules and export.

pub mod builder;
pub mod graph;

pub use builder::{build, from_associations, overlap_signals, RelationshipGraphBuilder, WeightedPair};
pub use graph::RelationshipGraph;
