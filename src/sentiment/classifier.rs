//! Sentiment classification with a confidence band
//!
//! A pretrained binary model supplies a label and a confidence; predictions
//! the model is unsure about are reported as NEUTRAL.

use crate::error::{stage, PipelineError, Result};
use crate::types::{Review, SentimentLabel, SentimentResult};
use rayon::prelude::*;
use thiserror::Error;
use tracing::debug;

/// Errors raised by a sentiment model backend
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Endpoint returned status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("Unexpected model output: {0}")]
    InvalidOutput(String),
}

/// Top prediction of a binary sentiment model
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    /// Model label, e.g. "POSITIVE" or "NEGATIVE"
    pub label: String,
    /// Confidence of the label in [0, 1]
    pub score: f64,
}

impl RawPrediction {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// A pretrained binary sentiment model, used for inference only
pub trait SentimentModel: Send + Sync {
    /// Predict the top label for one text
    fn predict(&self, text: &str) -> std::result::Result<RawPrediction, ModelError>;

    /// Short name used in logs
    fn name(&self) -> &str {
        "sentiment-model"
    }
}

impl<M: SentimentModel + ?Sized> SentimentModel for Box<M> {
    fn predict(&self, text: &str) -> std::result::Result<RawPrediction, ModelError> {
        (**self).predict(text)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Applies the neutral band on top of a [`SentimentModel`]
pub struct SentimentClassifier<M> {
    model: M,
    neutral_threshold: f64,
}

impl<M: SentimentModel> SentimentClassifier<M> {
    /// Create a classifier; scores below `neutral_threshold` become NEUTRAL
    pub fn new(model: M, neutral_threshold: f64) -> Self {
        Self {
            model,
            neutral_threshold,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn neutral_threshold(&self) -> f64 {
        self.neutral_threshold
    }

    /// Classify one text
    ///
    /// Missing text is UNKNOWN with score 0.0 and never reaches the model.
    /// A failing model, an unknown label or a score outside [0, 1] is fatal
    /// for the run. The score itself is passed through untouched.
    pub fn classify(&self, review_id: usize, text: Option<&str>) -> Result<SentimentResult> {
        let Some(text) = text else {
            return Ok(SentimentResult::unknown(review_id));
        };

        let prediction = self.model.predict(text).map_err(|e| {
            PipelineError::unavailable(stage::SENTIMENT, format!("{}: {}", self.model.name(), e))
        })?;

        let label = SentimentLabel::from_model_label(&prediction.label).ok_or_else(|| {
            PipelineError::unavailable(
                stage::SENTIMENT,
                format!("{} returned unknown label {:?}", self.model.name(), prediction.label),
            )
        })?;
        let score = prediction.score;
        if !(0.0..=1.0).contains(&score) {
            return Err(PipelineError::unavailable(
                stage::SENTIMENT,
                format!("{} returned score {} outside [0, 1]", self.model.name(), score),
            ));
        }

        let label = if score < self.neutral_threshold {
            SentimentLabel::Neutral
        } else {
            label
        };

        Ok(SentimentResult {
            review_id,
            label,
            score,
        })
    }

    /// Classify reviews on the rayon pool; results keep input order and the
    /// first failure aborts the batch
    pub fn classify_batch(&self, reviews: &[Review]) -> Result<Vec<SentimentResult>> {
        let results: Vec<SentimentResult> = reviews
            .par_iter()
            .map(|review| self.classify(review.id, review.text()))
            .collect::<Result<_>>()?;

        debug!(
            model = self.model.name(),
            reviews = results.len(),
            "classified review batch"
        );
        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedModel {
        label: &'static str,
        score: f64,
        calls: AtomicUsize,
    }

    impl FixedModel {
        fn new(label: &'static str, score: f64) -> Self {
            Self {
                label,
                score,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SentimentModel for FixedModel {
        fn predict(&self, _text: &str) -> std::result::Result<RawPrediction, ModelError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(RawPrediction::new(self.label, self.score))
        }
    }

    struct OfflineModel;

    impl SentimentModel for OfflineModel {
        fn predict(&self, _text: &str) -> std::result::Result<RawPrediction, ModelError> {
            Err(ModelError::InvalidOutput("model offline".to_string()))
        }
    }

    #[test]
    fn test_confident_prediction_kept() {
        let classifier = SentimentClassifier::new(FixedModel::new("POSITIVE", 0.95), 0.6);
        let result = classifier.classify(1, Some("great app")).unwrap();

        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.score, 0.95);
    }

    #[test]
    fn test_low_confidence_becomes_neutral() {
        let classifier = SentimentClassifier::new(FixedModel::new("NEGATIVE", 0.55), 0.6);
        let result = classifier.classify(1, Some("it is an app")).unwrap();

        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.score, 0.55);
    }

    #[test]
    fn test_threshold_is_inclusive_for_directional_labels() {
        let classifier = SentimentClassifier::new(FixedModel::new("NEGATIVE", 0.6), 0.6);
        let result = classifier.classify(1, Some("slow")).unwrap();
        assert_eq!(result.label, SentimentLabel::Negative);
    }

    #[test]
    fn test_missing_text_is_unknown_without_model_call() {
        let classifier = SentimentClassifier::new(FixedModel::new("POSITIVE", 0.99), 0.6);
        let result = classifier.classify(7, None).unwrap();

        assert_eq!(result, SentimentResult::unknown(7));
        assert_eq!(classifier.model().calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_model_failure_is_dependency_unavailable() {
        let classifier = SentimentClassifier::new(OfflineModel, 0.6);
        let err = classifier.classify(1, Some("text")).unwrap_err();

        assert!(matches!(err, PipelineError::DependencyUnavailable { .. }));
        assert_eq!(err.stage(), stage::SENTIMENT);
    }

    #[test]
    fn test_out_of_range_score_is_dependency_unavailable() {
        for score in [1.25, -0.1, f64::NAN, f64::INFINITY] {
            let classifier = SentimentClassifier::new(FixedModel::new("POSITIVE", score), 0.6);
            let err = classifier.classify(1, Some("good")).unwrap_err();
            assert!(matches!(err, PipelineError::DependencyUnavailable { .. }));
        }
    }

    #[test]
    fn test_boundary_scores_pass_through() {
        let classifier = SentimentClassifier::new(FixedModel::new("NEGATIVE", 1.0), 0.6);
        let result = classifier.classify(1, Some("awful")).unwrap();
        assert_eq!(result.label, SentimentLabel::Negative);
        assert_eq!(result.score, 1.0);

        let classifier = SentimentClassifier::new(FixedModel::new("NEGATIVE", 0.0), 0.6);
        let result = classifier.classify(1, Some("meh")).unwrap();
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.score, 0.0);
    }

    #[test]
    fn test_classify_batch_keeps_order() {
        let classifier = SentimentClassifier::new(FixedModel::new("POSITIVE", 0.9), 0.6);
        let reviews: Vec<Review> = (0..40)
            .map(|i| {
                let text = if i % 4 == 0 { None } else { Some("good") };
                Review::new(i, "BOA", text, 5)
            })
            .collect();

        let results = classifier.classify_batch(&reviews).unwrap();
        assert_eq!(results.len(), 40);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.review_id, i);
            let expected = if i % 4 == 0 {
                SentimentLabel::Unknown
            } else {
                SentimentLabel::Positive
            };
            assert_eq!(result.label, expected);
        }
        assert_eq!(classifier.model().calls.load(Ordering::SeqCst), 30);
    }

    #[test]
    fn test_classify_batch_fails_on_model_error() {
        let classifier = SentimentClassifier::new(OfflineModel, 0.6);
        let reviews = vec![Review::new(0, "CBE", Some("fine"), 4)];
        assert!(classifier.classify_batch(&reviews).is_err());
    }
}
