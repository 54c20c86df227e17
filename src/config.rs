//! Pipeline configuration
//!
//! Every field has a default, so a JSON file only needs to name the values it
//! overrides.

use crate::error::{stage, PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Theme reserved for documents without a dominant topic
pub const UNCLASSIFIED_THEME: &str = "Unclassified";

/// Full pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of LDA topics (K)
    pub topic_count: usize,
    /// Gibbs sampling passes over the corpus
    pub passes: usize,
    /// Seed for the topic model sampler
    pub random_seed: u64,
    /// Scores below this become NEUTRAL
    pub neutral_threshold: f64,
    pub top_n_drivers: usize,
    pub top_n_pain_points: usize,
    /// Document-topic prior
    pub alpha: f64,
    /// Topic-word prior
    pub beta: f64,
    /// Fold-in iterations used when assigning a document
    pub inference_iterations: usize,
    /// Minimum document frequency for a vocabulary term
    pub min_df: usize,
    /// Maximum document frequency ratio for a vocabulary term
    pub max_df_ratio: f64,
    /// Topic id -> theme label, must cover 0..topic_count
    pub topic_themes: BTreeMap<usize, String>,
    /// Pain-point theme -> remediation statement
    pub action_table: BTreeMap<String, String>,
    /// Bank name -> store id; unlisted banks are numbered by first appearance
    pub bank_ids: BTreeMap<String, u32>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            topic_count: 5,
            passes: 10,
            random_seed: 42,
            neutral_threshold: 0.6,
            top_n_drivers: 2,
            top_n_pain_points: 2,
            alpha: 0.1,
            beta: 0.01,
            inference_iterations: 50,
            min_df: 1,
            max_df_ratio: 1.0,
            topic_themes: default_topic_themes(),
            action_table: default_action_table(),
            bank_ids: BTreeMap::new(),
        }
    }
}

impl PipelineConfig {
    /// Load a configuration file; missing fields keep their defaults
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path.as_ref()).map_err(|source| PipelineError::Io {
            stage: stage::CONFIG,
            source,
        })?;
        let config: Self = serde_json::from_reader(file).map_err(|source| PipelineError::Json {
            stage: stage::CONFIG,
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Set number of topics
    pub fn topic_count(mut self, k: usize) -> Self {
        self.topic_count = k;
        self
    }

    /// Set number of sampling passes
    pub fn passes(mut self, passes: usize) -> Self {
        self.passes = passes;
        self
    }

    /// Set random seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    /// Set the NEUTRAL confidence threshold
    pub fn neutral_threshold(mut self, threshold: f64) -> Self {
        self.neutral_threshold = threshold;
        self
    }

    pub fn top_n(mut self, drivers: usize, pain_points: usize) -> Self {
        self.top_n_drivers = drivers;
        self.top_n_pain_points = pain_points;
        self
    }

    pub fn topic_themes(mut self, themes: BTreeMap<usize, String>) -> Self {
        self.topic_themes = themes;
        self
    }

    pub fn action_table(mut self, actions: BTreeMap<String, String>) -> Self {
        self.action_table = actions;
        self
    }

    pub fn bank_ids(mut self, ids: BTreeMap<String, u32>) -> Self {
        self.bank_ids = ids;
        self
    }

    /// Check internal consistency. Theme table coverage is checked by the
    /// theme mapper itself.
    pub fn validate(&self) -> Result<()> {
        if self.topic_count == 0 {
            return Err(PipelineError::config(stage::CONFIG, "topic_count must be positive"));
        }
        if self.passes == 0 {
            return Err(PipelineError::config(stage::CONFIG, "passes must be positive"));
        }
        if !(self.alpha > 0.0) || !(self.beta > 0.0) {
            return Err(PipelineError::config(
                stage::CONFIG,
                format!("alpha and beta must be positive (alpha={}, beta={})", self.alpha, self.beta),
            ));
        }
        if !(0.0..=1.0).contains(&self.neutral_threshold) {
            return Err(PipelineError::config(
                stage::CONFIG,
                format!("neutral_threshold {} is outside [0, 1]", self.neutral_threshold),
            ));
        }
        if !(self.max_df_ratio > 0.0 && self.max_df_ratio <= 1.0) {
            return Err(PipelineError::config(
                stage::CONFIG,
                format!("max_df_ratio {} is outside (0, 1]", self.max_df_ratio),
            ));
        }
        if let Some((theme, _)) = self
            .action_table
            .iter()
            .find(|(theme, action)| theme.trim().is_empty() || action.trim().is_empty())
        {
            return Err(PipelineError::config(
                stage::CONFIG,
                format!("action table entry {:?} has an empty theme or action", theme),
            ));
        }
        Ok(())
    }
}

/// Theme labels for the reference five-topic model
pub fn default_topic_themes() -> BTreeMap<usize, String> {
    [
        (0, "General Banking Operations"),
        (1, "Positive App Features/Experience"),
        (2, "App Functionality/Issues"),
        (3, "User Experience and Efficiency"),
        (4, "App Quality and Services"),
    ]
    .into_iter()
    .map(|(id, theme)| (id, theme.to_string()))
    .collect()
}

/// Remediation statements keyed by pain-point theme
pub fn default_action_table() -> BTreeMap<String, String> {
    [
        (
            "App Malfunction & Technical Bugs",
            "Prioritize crash fixes, improve stability, and increase QA testing coverage.",
        ),
        (
            "App Performance (Speed & Quality)",
            "Optimize loading times, reduce background API calls, improve device compatibility.",
        ),
        (
            "User Experience, Features & Security",
            "Improve UI/UX flows, strengthen security messaging, simplify workflows.",
        ),
        (
            "Transaction & Service Reliability Issues",
            "Improve backend reliability, retry logic, and user-facing error messages.",
        ),
        (
            "Highly Positive Feedback & Brand Perception",
            "Amplify strengths in marketing and user education materials.",
        ),
    ]
    .into_iter()
    .map(|(theme, action)| (theme.to_string(), action.to_string()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_match_reference_configuration() {
        let config = PipelineConfig::default();
        assert_eq!(config.topic_count, 5);
        assert_eq!(config.passes, 10);
        assert_eq!(config.random_seed, 42);
        assert_eq!(config.neutral_threshold, 0.6);
        assert_eq!(config.top_n_drivers, 2);
        assert_eq!(config.top_n_pain_points, 2);
        assert_eq!(config.topic_themes.len(), 5);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(PipelineConfig::default().topic_count(0).validate().is_err());
        assert!(PipelineConfig::default().neutral_threshold(1.5).validate().is_err());

        let mut actions = BTreeMap::new();
        actions.insert("Crashes".to_string(), "   ".to_string());
        let err = PipelineConfig::default().action_table(actions).validate().unwrap_err();
        assert!(matches!(err, PipelineError::Configuration { .. }));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"topic_count": 3, "topic_themes": {{"0": "A", "1": "B", "2": "C"}}}}"#).unwrap();

        let config = PipelineConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.topic_count, 3);
        assert_eq!(config.topic_themes.get(&2).map(String::as_str), Some("C"));
        assert_eq!(config.passes, 10);
        assert_eq!(config.neutral_threshold, 0.6);
    }
}
