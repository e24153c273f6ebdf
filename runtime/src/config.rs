//! Run configuration, with environment overrides.

use crate::matching::cluster::ClusterParams;
use crate::matching::similarity::DEFAULT_TOP_ENTITIES;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Settings for one analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub cluster: ClusterParams,
    /// How many associated entities to keep in the similar-entity list.
    pub top_entities: usize,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            cluster: ClusterParams::default(),
            top_entities: DEFAULT_TOP_ENTITIES,
        }
    }
}

impl AnalysisConfig {
    /// Defaults overridden by `VC_HUNTER_*` environment variables.
    ///
    /// - `VC_HUNTER_MIN_K`, `VC_HUNTER_MAX_K`: cluster count sweep bounds
    /// - `VC_HUNTER_RESTARTS`: k-means restarts per cluster count
    /// - `VC_HUNTER_MAX_ITER`: k-means iteration cap
    /// - `VC_HUNTER_SEED`: initialization seed
    /// - `VC_HUNTER_TOP_ENTITIES`: similar-entity list length
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Override the similar-entity list length when a value is given.
    pub fn with_top_entities(mut self, top: Option<usize>) -> Self {
        if let Some(n) = top {
            self.top_entities = n;
        }
        self
    }

    /// Like [`from_env`](Self::from_env) but reading from an arbitrary source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        override_from(&lookup, "VC_HUNTER_MIN_K", &mut config.cluster.min_k);
        override_from(&lookup, "VC_HUNTER_MAX_K", &mut config.cluster.max_k);
        override_from(&lookup, "VC_HUNTER_RESTARTS", &mut config.cluster.n_init);
        override_from(&lookup, "VC_HUNTER_MAX_ITER", &mut config.cluster.max_iter);
        override_from(&lookup, "VC_HUNTER_SEED", &mut config.cluster.seed);
        override_from(&lookup, "VC_HUNTER_TOP_ENTITIES", &mut config.top_entities);
        config
    }
}

fn override_from<F, T>(lookup: &F, key: &str, slot: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match raw.trim().parse::<T>() {
        Ok(value) => *slot = value,
        Err(_) => warn!("ignoring {key}={raw:?}: not a valid value"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = AnalysisConfig::default();
        assert_eq!(config.cluster.min_k, 2);
        assert_eq!(config.cluster.max_k, 10);
        assert_eq!(config.cluster.n_init, 10);
        assert_eq!(config.cluster.seed, 42);
        assert_eq!(config.top_entities, 5);
    }

    #[test]
    fn test_overrides_and_bad_values() {
        let env: HashMap<&str, &str> = [
            ("VC_HUNTER_MAX_K", "6"),
            ("VC_HUNTER_SEED", " 7 "),
            ("VC_HUNTER_RESTARTS", "many"),
        ]
        .into_iter()
        .collect();
        let config = AnalysisConfig::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.cluster.max_k, 6);
        assert_eq!(config.cluster.seed, 7);
        // Unparsable value keeps the default.
        assert_eq!(config.cluster.n_init, 10);
    }

    #[test]
    fn test_top_entities_override() {
        let config = AnalysisConfig::from_lookup(|key| {
            (key == "VC_HUNTER_TOP_ENTITIES").then(|| "7".to_string())
        });
        assert_eq!(config.top_entities, 7);
        assert_eq!(config.clone().with_top_entities(None).top_entities, 7);
        assert_eq!(config.with_top_entities(Some(2)).top_entities, 2);
    }
}
