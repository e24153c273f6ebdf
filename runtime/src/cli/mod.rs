//! CLI subcommand implementations for the vc-hunter binary.

pub mod analyze_cmd;
pub mod clusters_cmd;
pub mod gaps_cmd;
pub mod input;
pub mod match_cmd;
pub mod output;
pub mod relationships_cmd;
