//! Text preprocessing module
//!
//! Provides cleaning, tokenization, lemmatization and vectorization
//! for preparing review text for topic modeling.

pub mod lemmatizer;
pub mod tokenizer;
pub mod vectorizer;

pub use lemmatizer::Lemmatizer;
pub use tokenizer::TextNormalizer;
pub use vectorizer::{BagOfWords, CountVectorizer, Vocabulary};
