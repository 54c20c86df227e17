//! # Review Insights
//!
//! Turns app-store reviews for competing banking apps into per-bank insight
//! reports: dominant positive drivers, dominant pain points and remediation
//! recommendations.
//!
//! ## Modules
//!
//! - `preprocessing` - Text cleaning, lemmatization and vectorization
//! - `sentiment` - Sentiment models and the neutral-band classifier
//! - `models` - LDA topic model
//! - `insights` - Themes, driver/pain-point ranking, recommendations
//! - `pipeline` - The end-to-end entry point
//! - `utils` - Review sources, stores, reporting sinks and model diagnostics
//!
//! ## Example
//!
//! ```no_run
//! use review_insights::{LexiconSentimentModel, Pipeline, PipelineConfig, Review};
//!
//! let reviews = vec![
//!     Review::new(0, "CBE", Some("Great app, very fast transfers"), 5),
//!     Review::new(1, "CBE", Some("Keeps crashing after the update"), 1),
//! ];
//! let pipeline = Pipeline::new(PipelineConfig::default(), LexiconSentimentModel::new());
//! let report = pipeline.run(&reviews).unwrap();
//! for insight in &report.insights {
//!     println!("{}: drivers {:?}, pain points {:?}", insight.entity, insight.drivers, insight.pain_points);
//! }
//! ```

pub mod config;
pub mod error;
pub mod insights;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod sentiment;
pub mod types;
pub mod utils;

pub use config::{PipelineConfig, UNCLASSIFIED_THEME};
pub use error::{PipelineError, Result};
pub use insights::{recommend, InsightAggregator, ThemeMapper};
pub use models::{LdaConfig, TrainedLda, LDA};
pub use pipeline::{Pipeline, PipelineReport};
pub use preprocessing::TextNormalizer;
pub use sentiment::{HttpSentimentModel, LexiconSentimentModel, SentimentClassifier, SentimentModel};
pub use types::{
    DocumentTopics, EntityInsight, NormalizedReview, Recommendation, Review, ReviewRow,
    SentimentLabel, SentimentResult, ThemedSentiment,
};
pub use utils::io::{
    CsvReviewSource, CsvReviewStore, JsonReportSink, JsonReviewSource, MemorySink, ReportingSink,
    ReviewSource, ReviewStore,
};
