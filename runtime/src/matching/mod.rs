//! Matching engine: vector math, similarity ranking, cluster selection and
//! gap analysis.

pub mod cluster;
pub mod gap;
pub mod similarity;
pub mod vector;
