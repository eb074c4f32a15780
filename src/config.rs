// ⚙️ Classifier Configuration
// Batch behaviour knobs, loadable from a JSON file; every field has a default

use crate::constitution::ConstitutionLabel;
use anyhow::{Context as AnyhowContext, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Label assigned to records that fail validation
    #[serde(default = "default_fallback_label")]
    pub fallback_label: ConstitutionLabel,

    /// Classify batch records on the rayon thread pool
    #[serde(default = "default_parallel")]
    pub parallel: bool,

    /// Keep the first record of a repeated id and skip the rest.
    /// When false the last occurrence wins.
    #[serde(default = "default_skip_duplicate_ids")]
    pub skip_duplicate_ids: bool,
}

fn default_fallback_label() -> ConstitutionLabel {
    ConstitutionLabel::Beta
}

fn default_parallel() -> bool {
    true
}

fn default_skip_duplicate_ids() -> bool {
    true
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            fallback_label: default_fallback_label(),
            parallel: default_parallel(),
            skip_duplicate_ids: default_skip_duplicate_ids(),
        }
    }
}

impl ClassifierConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        serde_json::from_str(&content).context("Failed to parse config JSON")
    }

    pub fn with_fallback_label(mut self, label: ConstitutionLabel) -> Self {
        self.fallback_label = label;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = ClassifierConfig::default();
        assert_eq!(config.fallback_label, ConstitutionLabel::Beta);
        assert!(config.parallel);
        assert!(config.skip_duplicate_ids);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClassifierConfig = serde_json::from_str(r#"{"parallel": false}"#).unwrap();
        assert!(!config.parallel);
        assert_eq!(config.fallback_label, ConstitutionLabel::Beta);

        let config: ClassifierConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ClassifierConfig::default());
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("classifier.json");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, r#"{{"fallback_label": "Gamma", "skip_duplicate_ids": false}}"#).unwrap();

        let config = ClassifierConfig::from_file(&path).unwrap();
        assert_eq!(config.fallback_label, ConstitutionLabel::Gamma);
        assert!(!config.skip_duplicate_ids);
        assert!(config.parallel);
    }

    #[test]
    fn test_missing_file_and_bad_label() {
        assert!(ClassifierConfig::from_file("/nonexistent/classifier.json").is_err());
        assert!(serde_json::from_str::<ClassifierConfig>(r#"{"fallback_label": "Omega"}"#).is_err());
    }

    #[test]
    fn test_builders() {
        let config = ClassifierConfig::default()
            .with_fallback_label(ConstitutionLabel::Delta)
            .with_parallel(false);
        assert_eq!(config.fallback_label, ConstitutionLabel::Delta);
        assert!(!config.parallel);
    }
}
