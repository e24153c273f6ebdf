//! Records consumed and produced by one analysis run.

pub mod types;

pub use types::*;
