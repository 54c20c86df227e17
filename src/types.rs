//! Core data types shared across the pipeline

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw review as handed over by a review source
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Review {
    /// Unique within one run
    pub id: usize,
    /// Entity the review belongs to
    pub bank: String,
    /// Review body; `None` when the source field was missing or not text
    pub raw_text: Option<String>,
    /// The review field exactly as the source delivered it, rendered as a
    /// string; empty when the field was missing
    #[serde(default)]
    pub raw_value: String,
    /// Star rating
    pub rating: i32,
    /// Date string as delivered by the source
    pub date: String,
    /// Where the review came from (e.g. "Google Play")
    pub source: String,
}

impl Review {
    pub fn new(id: usize, bank: impl Into<String>, raw_text: Option<&str>, rating: i32) -> Self {
        Self {
            id,
            bank: bank.into(),
            raw_text: raw_text.map(str::to_string),
            raw_value: raw_text.unwrap_or_default().to_string(),
            rating,
            date: String::new(),
            source: String::new(),
        }
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_raw_value(mut self, raw_value: impl Into<String>) -> Self {
        self.raw_value = raw_value.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    pub fn text(&self) -> Option<&str> {
        self.raw_text.as_deref()
    }
}

/// Output of the text normalizer for one review
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NormalizedReview {
    pub review_id: usize,
    /// Lower-cased text with punctuation and digits removed
    pub cleaned: String,
    /// Lemmatized content tokens
    pub tokens: Vec<String>,
}

impl NormalizedReview {
    /// Tokens joined by single spaces
    pub fn lemmatized(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Sentiment label after the confidence-band policy has been applied
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Unknown,
}

impl SentimentLabel {
    pub const ALL: [SentimentLabel; 4] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
            SentimentLabel::Unknown => "UNKNOWN",
        }
    }

    /// Parse a binary model label. Only POSITIVE and NEGATIVE are accepted:
    /// NEUTRAL is derived by the classifier, never emitted by a model.
    pub fn from_model_label(label: &str) -> Option<Self> {
        match label.trim().to_ascii_uppercase().as_str() {
            "POSITIVE" | "POS" | "LABEL_1" => Some(SentimentLabel::Positive),
            "NEGATIVE" | "NEG" | "LABEL_0" => Some(SentimentLabel::Negative),
            _ => None,
        }
    }

    /// Whether the label carries directional signal for ranking
    pub fn is_directional(&self) -> bool {
        matches!(self, SentimentLabel::Positive | SentimentLabel::Negative)
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification of one review
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SentimentResult {
    pub review_id: usize,
    pub label: SentimentLabel,
    /// Model confidence in [0, 1]; 0.0 for UNKNOWN
    pub score: f64,
}

impl SentimentResult {
    pub fn unknown(review_id: usize) -> Self {
        Self {
            review_id,
            label: SentimentLabel::Unknown,
            score: 0.0,
        }
    }
}

/// Dominant topic of one document
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentTopics {
    pub review_id: usize,
    /// `None` when the document had no in-vocabulary terms
    pub dominant_topic: Option<usize>,
}

/// One row of aggregation input
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ThemedSentiment {
    pub entity: String,
    pub sentiment_label: SentimentLabel,
    pub theme: String,
}

impl ThemedSentiment {
    pub fn new(entity: impl Into<String>, sentiment_label: SentimentLabel, theme: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            sentiment_label,
            theme: theme.into(),
        }
    }
}

/// Drivers and pain points for one entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct EntityInsight {
    pub entity: String,
    pub drivers: Vec<String>,
    pub pain_points: Vec<String>,
}

/// Remediation actions for one entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Recommendation {
    pub entity: String,
    pub actions: Vec<String>,
}

/// Row handed to the review store
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReviewRow {
    pub bank_id: u32,
    pub review_text: String,
    pub cleaned_review: String,
    pub rating: i32,
    pub review_date: Option<NaiveDate>,
    pub sentiment_label: String,
    pub sentiment_score: f64,
    pub source: String,
}

/// Parse the date formats review sources commonly emit
pub fn parse_review_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_label_parsing() {
        assert_eq!(
            SentimentLabel::from_model_label("positive"),
            Some(SentimentLabel::Positive)
        );
        assert_eq!(
            SentimentLabel::from_model_label("NEGATIVE"),
            Some(SentimentLabel::Negative)
        );
        assert_eq!(SentimentLabel::from_model_label("NEUTRAL"), None);
    }

    #[test]
    fn test_label_serializes_upper_case() {
        let json = serde_json::to_string(&SentimentLabel::Neutral).unwrap();
        assert_eq!(json, "\"NEUTRAL\"");
    }

    #[test]
    fn test_parse_review_date() {
        let expected = NaiveDate::from_ymd_opt(2024, 11, 3);
        assert_eq!(parse_review_date("2024-11-03 14:22:01"), expected);
        assert_eq!(parse_review_date("2024-11-03"), expected);
        assert_eq!(parse_review_date("2024-11-03T14:22:01+03:00"), expected);
        assert_eq!(parse_review_date("yesterday"), None);
        assert_eq!(parse_review_date(""), None);
    }
}
