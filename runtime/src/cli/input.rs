//! Loading run input (query plus candidate records) from JSON.

use crate::model::{CandidateRecord, QueryRecord};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

/// Precomputed records for one run, as produced by the scrape/embed layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInput {
    pub query: QueryRecord,
    #[serde(default)]
    pub candidates: Vec<CandidateRecord>,
}

impl RunInput {
    pub fn from_json(data: &str) -> Result<Self> {
        serde_json::from_str(data).context("input is not a valid run document")
    }

    /// Load from a file path, or from stdin when the path is `-`.
    pub fn load(path: &Path) -> Result<Self> {
        let data = if path == Path::new("-") {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read input from stdin")?;
            buf
        } else {
            std::fs::read_to_string(path)
                .with_context(|| format!("failed to read input: {}", path.display()))?
        };
        Self::from_json(&data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE: &str = r#"{
        "query": {"id": "founder", "embedding": [1.0, 0.0]},
        "candidates": [
            {"id": "https://a16z.com", "embedding": [0.9, 0.1],
             "associations": [{"name": "Flexport"}, {"name": "OpenAI", "embedding": [1.0, 0.0]}]},
            {"id": "https://8vc.com", "embedding": [0.0, 1.0]}
        ]
    }"#;

    #[test]
    fn test_from_json() {
        let input = RunInput::from_json(SAMPLE).unwrap();
        assert_eq!(input.query.id, "founder");
        assert_eq!(input.candidates.len(), 2);
        assert_eq!(input.candidates[0].associations.len(), 2);
        assert!(input.candidates[0].associations[0].embedding.is_none());
        assert!(input.candidates[1].associations.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        let input = RunInput::load(file.path()).unwrap();
        assert_eq!(input.candidates[1].id, "https://8vc.com");
    }

    #[test]
    fn test_load_missing_file() {
        let err = RunInput::load(Path::new("/nonexistent/run.json")).unwrap_err();
        assert!(err.to_string().contains("failed to read input"));
    }

    #[test]
    fn test_malformed_json() {
        assert!(RunInput::from_json(r#"{"candidates": []}"#).is_err());
    }
}
