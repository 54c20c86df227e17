//! Pipeline error taxonomy
//!
//! Malformed review input is never an error value: every component degrades
//! it to an empty or sentinel result. What remains here is fatal for a run.

use thiserror::Error;

/// Pipeline stage names used in error messages and logs
pub mod stage {
    pub const CONFIG: &str = "config";
    pub const NORMALIZE: &str = "normalize";
    pub const SENTIMENT: &str = "sentiment";
    pub const TOPICS: &str = "topic-model";
    pub const THEMES: &str = "theme-mapper";
    pub const INSIGHTS: &str = "insights";
    pub const SOURCE: &str = "review-source";
    pub const STORE: &str = "review-store";
    pub const REPORT: &str = "reporting-sink";
}

/// Errors that halt a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("[{stage}] configuration error: {message}")]
    Configuration { stage: &'static str, message: String },

    #[error("[{stage}] dependency unavailable: {message}")]
    DependencyUnavailable { stage: &'static str, message: String },

    #[error("[{stage}] I/O error: {source}")]
    Io {
        stage: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("[{stage}] CSV error: {source}")]
    Csv {
        stage: &'static str,
        #[source]
        source: csv::Error,
    },

    #[error("[{stage}] JSON error: {source}")]
    Json {
        stage: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl PipelineError {
    pub fn config(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Configuration {
            stage,
            message: message.into(),
        }
    }

    pub fn unavailable(stage: &'static str, message: impl Into<String>) -> Self {
        Self::DependencyUnavailable {
            stage,
            message: message.into(),
        }
    }

    /// The stage that failed
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Configuration { stage, .. }
            | Self::DependencyUnavailable { stage, .. }
            | Self::Io { stage, .. }
            | Self::Csv { stage, .. }
            | Self::Json { stage, .. } => stage,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_names_stage() {
        let err = PipelineError::config(stage::THEMES, "topic 7 has no theme");
        assert_eq!(err.stage(), "theme-mapper");
        assert_eq!(
            err.to_string(),
            "[theme-mapper] configuration error: topic 7 has no theme"
        );

        let err = PipelineError::unavailable(stage::SENTIMENT, "connection refused");
        assert!(err.to_string().contains("dependency unavailable"));
    }
}
