//! Sentiment analysis module
//!
//! Includes:
//! - The model capability trait and the neutral-band classifier
//! - An offline lexicon model
//! - A client for a hosted inference endpoint

pub mod classifier;
pub mod lexicon;
pub mod remote;

pub use classifier::{ModelError, RawPrediction, SentimentClassifier, SentimentModel};
pub use lexicon::{LexiconSentimentModel, ReviewLexicon, SentimentLexicon};
pub use remote::HttpSentimentModel;
