use crate::composite::classify::{RegionClassifier, DEFAULT_CORROBORATION_THRESHOLD};
use crate::errors::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_MIN_CHAINS: usize = 2;

/// Knobs for a pipeline run. Missing fields in a config file take the defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Chains that must carry an `X` inside a disorder run for it to be kept.
    pub corroboration_threshold: usize,
    /// Proteins backed by fewer distinct chains are skipped.
    pub min_chains_per_protein: usize,
    /// Process proteins on the rayon pool.
    pub parallel: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            corroboration_threshold: DEFAULT_CORROBORATION_THRESHOLD,
            min_chains_per_protein: DEFAULT_MIN_CHAINS,
            parallel: false,
        }
    }
}

impl EngineConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn classifier(&self) -> RegionClassifier {
        RegionClassifier::new(self.corroboration_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.corroboration_threshold, 2);
        assert_eq!(config.min_chains_per_protein, 2);
        assert!(!config.parallel);
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json(r#"{"corroboration_threshold": 3}"#).unwrap();
        assert_eq!(config.corroboration_threshold, 3);
        assert_eq!(config.min_chains_per_protein, DEFAULT_MIN_CHAINS);
        assert_eq!(config.classifier().corroboration_threshold, 3);

        assert!(EngineConfig::from_json("{not json").is_err());
    }
}
