//! Latent Dirichlet Allocation (LDA)
//!
//! LDA is a generative probabilistic model for topic modeling.
//! This implementation fits with collapsed Gibbs sampling from a fixed seed,
//! so identical corpora and configurations always produce identical models.
//! Documents are assigned by a deterministic fold-in against the fitted
//! topic-word distribution, which never touches the random number generator.

use crate::preprocessing::vectorizer::{BagOfWords, Vocabulary};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use std::cmp::Ordering;
use thiserror::Error;

/// Errors that can occur during LDA computation
#[derive(Error, Debug)]
pub enum LdaError {
    #[error("Number of topics must be positive")]
    InvalidTopicCount,

    #[error("Invalid hyperparameter: {0}")]
    InvalidParameter(String),

    #[error("Document references term {term} outside a vocabulary of {vocabulary_size}")]
    TermOutOfRange { term: usize, vocabulary_size: usize },
}

/// Topic representation with words and probabilities
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct LdaTopic {
    /// Topic index
    pub index: usize,
    /// Top words with their probabilities
    pub top_words: Vec<(String, f64)>,
    /// Topic prevalence in corpus
    pub prevalence: f64,
}

/// LDA model configuration
#[derive(Debug, Clone, PartialEq)]
pub struct LdaConfig {
    /// Number of topics
    pub n_topics: usize,
    /// Document-topic prior (alpha)
    pub alpha: f64,
    /// Topic-word prior (beta/eta)
    pub beta: f64,
    /// Number of Gibbs sampling passes over the corpus
    pub passes: usize,
    /// Fold-in iterations per assigned document
    pub inference_iterations: usize,
    /// Random seed for reproducibility
    pub random_seed: u64,
}

impl Default for LdaConfig {
    fn default() -> Self {
        Self {
            n_topics: 5,
            alpha: 0.1,
            beta: 0.01,
            passes: 10,
            inference_iterations: 50,
            random_seed: 42,
        }
    }
}

impl LdaConfig {
    /// Create a new configuration with specified number of topics
    pub fn new(n_topics: usize) -> Self {
        Self {
            n_topics,
            ..Default::default()
        }
    }

    /// Set alpha (document-topic prior)
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set beta (topic-word prior)
    pub fn beta(mut self, beta: f64) -> Self {
        self.beta = beta;
        self
    }

    /// Set number of sampling passes
    pub fn passes(mut self, n: usize) -> Self {
        self.passes = n;
        self
    }

    /// Set number of fold-in iterations
    pub fn inference_iterations(mut self, n: usize) -> Self {
        self.inference_iterations = n;
        self
    }

    /// Set random seed
    pub fn random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    fn validate(&self) -> Result<(), LdaError> {
        if self.n_topics == 0 {
            return Err(LdaError::InvalidTopicCount);
        }
        if !(self.alpha > 0.0) {
            return Err(LdaError::InvalidParameter("alpha must be positive".into()));
        }
        if !(self.beta > 0.0) {
            return Err(LdaError::InvalidParameter("beta must be positive".into()));
        }
        Ok(())
    }
}

/// Latent Dirichlet Allocation trainer
///
/// Uses collapsed Gibbs sampling for inference.
#[derive(Debug, Clone)]
pub struct LDA {
    /// Model configuration
    config: LdaConfig,
}

impl LDA {
    /// Create a new LDA trainer
    pub fn new(config: LdaConfig) -> Result<Self, LdaError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Create a trainer with just a topic count
    pub fn simple(n_topics: usize) -> Result<Self, LdaError> {
        Self::new(LdaConfig::new(n_topics))
    }

    /// Get configuration
    pub fn config(&self) -> &LdaConfig {
        &self.config
    }

    /// Fit the model using Gibbs sampling
    ///
    /// # Arguments
    /// * `corpus` - Sparse bag-of-words documents over `vocabulary`
    /// * `vocabulary` - The corpus vocabulary; owned by the trained model
    ///
    /// An empty corpus or vocabulary yields a model that assigns no topic to
    /// any document.
    pub fn fit(&self, corpus: &[BagOfWords], vocabulary: Vocabulary) -> Result<TrainedLda, LdaError> {
        let n_docs = corpus.len();
        let n_words = vocabulary.len();
        let n_topics = self.config.n_topics;

        for doc in corpus {
            if let Some(&(term, _)) = doc.iter().find(|&&(term, _)| term >= n_words) {
                return Err(LdaError::TermOutOfRange {
                    term,
                    vocabulary_size: n_words,
                });
            }
        }

        let mut rng = StdRng::seed_from_u64(self.config.random_seed);

        // Initialize topic assignments randomly
        // topic_assignments[doc][token_position] = topic
        let mut topic_assignments: Vec<Vec<usize>> = Vec::with_capacity(n_docs);
        let mut topic_word_counts: Array2<f64> = Array2::zeros((n_topics, n_words));
        let mut doc_topic_counts: Array2<f64> = Array2::zeros((n_docs, n_topics));
        let mut topic_counts: Array1<f64> = Array1::zeros(n_topics);

        for (doc_idx, words) in corpus.iter().enumerate() {
            let mut doc_assignments = Vec::new();
            for &(word_idx, count) in words {
                for _ in 0..count {
                    let topic = rng.gen_range(0..n_topics);
                    doc_assignments.push(topic);

                    topic_word_counts[[topic, word_idx]] += 1.0;
                    doc_topic_counts[[doc_idx, topic]] += 1.0;
                    topic_counts[topic] += 1.0;
                }
            }
            topic_assignments.push(doc_assignments);
        }

        let alpha = self.config.alpha;
        let beta = self.config.beta;
        let beta_sum = beta * n_words as f64;
        let mut probs = vec![0.0; n_topics];
        let mut log_likelihood_history = Vec::with_capacity(self.config.passes);

        for _ in 0..self.config.passes {
            for (doc_idx, words) in corpus.iter().enumerate() {
                let mut word_pos = 0;
                for &(word_idx, count) in words {
                    for _ in 0..count {
                        let old_topic = topic_assignments[doc_idx][word_pos];

                        // Remove word from counts
                        topic_word_counts[[old_topic, word_idx]] -= 1.0;
                        doc_topic_counts[[doc_idx, old_topic]] -= 1.0;
                        topic_counts[old_topic] -= 1.0;

                        // P(topic | doc) * P(word | topic); the document-length
                        // denominator is shared by all topics and cancels out
                        let mut total = 0.0;
                        for (topic, prob) in probs.iter_mut().enumerate() {
                            *prob = (doc_topic_counts[[doc_idx, topic]] + alpha)
                                * (topic_word_counts[[topic, word_idx]] + beta)
                                / (topic_counts[topic] + beta_sum);
                            total += *prob;
                        }
                        let new_topic = sample_index(&probs, total, &mut rng);

                        // Add word to counts with new topic
                        topic_word_counts[[new_topic, word_idx]] += 1.0;
                        doc_topic_counts[[doc_idx, new_topic]] += 1.0;
                        topic_counts[new_topic] += 1.0;

                        topic_assignments[doc_idx][word_pos] = new_topic;
                        word_pos += 1;
                    }
                }
            }

            log_likelihood_history.push(log_likelihood(
                &topic_word_counts,
                &doc_topic_counts,
                &topic_counts,
                alpha,
                beta,
                beta_sum,
            ));
        }

        // Topic-word distribution
        let mut topic_words = Array2::zeros((n_topics, n_words));
        for topic in 0..n_topics {
            for word_idx in 0..n_words {
                topic_words[[topic, word_idx]] =
                    (topic_word_counts[[topic, word_idx]] + beta) / (topic_counts[topic] + beta_sum);
            }
        }

        Ok(TrainedLda {
            config: self.config.clone(),
            topic_words,
            topic_counts,
            vocabulary,
            log_likelihood_history,
        })
    }
}

/// Draw an index proportionally to `probs`
fn sample_index(probs: &[f64], total: f64, rng: &mut StdRng) -> usize {
    let threshold = rng.gen::<f64>() * total;
    let mut cumsum = 0.0;
    for (idx, &prob) in probs.iter().enumerate() {
        cumsum += prob;
        if cumsum >= threshold {
            return idx;
        }
    }
    probs.len() - 1
}

/// Log-likelihood of the current sampler state
fn log_likelihood(
    topic_word_counts: &Array2<f64>,
    doc_topic_counts: &Array2<f64>,
    topic_counts: &Array1<f64>,
    alpha: f64,
    beta: f64,
    beta_sum: f64,
) -> f64 {
    let n_topics = topic_counts.len();
    let mut ll = 0.0;

    // Log-likelihood of word-topic distribution
    for ((topic, _), &count) in topic_word_counts.indexed_iter() {
        if count > 0.0 {
            ll += count * ((count + beta) / (topic_counts[topic] + beta_sum)).ln();
        }
    }

    // Log-likelihood of document-topic distribution
    for row in doc_topic_counts.rows() {
        let doc_total = row.sum();
        for &count in row.iter() {
            if count > 0.0 {
                ll += count * ((count + alpha) / (doc_total + n_topics as f64 * alpha)).ln();
            }
        }
    }

    ll
}

/// Index of the highest probability. Equal probabilities resolve to the
/// lowest topic id; NaN never wins. Returns `None` for an empty vector.
pub fn dominant_topic(probabilities: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (topic, &p) in probabilities.iter().enumerate() {
        let p = if p.is_nan() { f64::NEG_INFINITY } else { p };
        match best {
            // strictly greater required to displace the incumbent
            Some((_, best_p)) if p <= best_p => {}
            _ => best = Some((topic, p)),
        }
    }
    best.map(|(topic, _)| topic)
}

/// A fitted LDA model. Immutable: every query takes `&self`, so documents can
/// be assigned from many threads at once.
#[derive(Debug, Clone)]
pub struct TrainedLda {
    config: LdaConfig,
    /// P(word | topic): n_topics x n_words
    topic_words: Array2<f64>,
    /// Tokens assigned to each topic at the end of sampling
    topic_counts: Array1<f64>,
    vocabulary: Vocabulary,
    log_likelihood_history: Vec<f64>,
}

impl TrainedLda {
    pub fn config(&self) -> &LdaConfig {
        &self.config
    }

    pub fn n_topics(&self) -> usize {
        self.config.n_topics
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    /// Get topic-word distribution
    pub fn topic_words(&self) -> &Array2<f64> {
        &self.topic_words
    }

    /// Get log-likelihood after each sampling pass
    pub fn log_likelihood_history(&self) -> &[f64] {
        &self.log_likelihood_history
    }

    /// Infer the topic distribution of a document.
    ///
    /// Returns an empty vector when the document has no in-vocabulary terms.
    pub fn document_topics(&self, bow: &[(usize, usize)]) -> Vec<f64> {
        let n_topics = self.config.n_topics;
        let n_words = self.vocabulary.len();
        let words: Vec<(usize, f64)> = bow
            .iter()
            .filter(|&&(word_idx, count)| word_idx < n_words && count > 0)
            .map(|&(word_idx, count)| (word_idx, count as f64))
            .collect();

        if words.is_empty() {
            return Vec::new();
        }

        let alpha = self.config.alpha;
        let doc_len: f64 = words.iter().map(|&(_, count)| count).sum();
        let norm = doc_len + n_topics as f64 * alpha;

        let mut theta = vec![1.0 / n_topics as f64; n_topics];
        let mut expected = vec![0.0; n_topics];
        let mut responsibility = vec![0.0; n_topics];

        for _ in 0..self.config.inference_iterations.max(1) {
            expected.iter_mut().for_each(|e| *e = 0.0);

            for &(word_idx, count) in &words {
                let mut total = 0.0;
                for (topic, r) in responsibility.iter_mut().enumerate() {
                    *r = theta[topic] * self.topic_words[[topic, word_idx]];
                    total += *r;
                }
                if total > 0.0 {
                    for (e, r) in expected.iter_mut().zip(&responsibility) {
                        *e += count * r / total;
                    }
                }
            }

            for (t, e) in theta.iter_mut().zip(&expected) {
                *t = (e + alpha) / norm;
            }
        }

        theta
    }

    /// Dominant topic of a token sequence, `None` when it has no
    /// in-vocabulary terms
    pub fn assign<S: AsRef<str>>(&self, tokens: &[S]) -> Option<usize> {
        let bow = self.vocabulary.doc2bow(tokens);
        dominant_topic(&self.document_topics(&bow))
    }

    /// Get topics with top words
    ///
    /// # Arguments
    /// * `n_words` - Number of top words per topic
    pub fn topics(&self, n_words: usize) -> Vec<LdaTopic> {
        let total_words: f64 = self.topic_counts.sum();

        (0..self.config.n_topics)
            .map(|topic_idx| {
                let mut word_probs: Vec<(usize, f64)> = self
                    .topic_words
                    .row(topic_idx)
                    .iter()
                    .copied()
                    .enumerate()
                    .collect();

                // Highest probability first, lower term id on ties
                word_probs.sort_by(|a, b| match b.1.total_cmp(&a.1) {
                    Ordering::Equal => a.0.cmp(&b.0),
                    other => other,
                });
                word_probs.truncate(n_words);

                let top_words = word_probs
                    .into_iter()
                    .filter_map(|(idx, prob)| self.vocabulary.term(idx).map(|term| (term.to_string(), prob)))
                    .collect();

                let prevalence = if total_words > 0.0 {
                    self.topic_counts[topic_idx] / total_words
                } else {
                    0.0
                };

                LdaTopic {
                    index: topic_idx,
                    top_words,
                    prevalence,
                }
            })
            .collect()
    }
}

/// Display implementation for LdaTopic
impl std::fmt::Display for LdaTopic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Topic {}: (prevalence: {:.2}%) [",
            self.index,
            self.prevalence * 100.0
        )?;
        for (i, (word, prob)) in self.top_words.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {:.3}", word, prob)?;
        }
        write!(f, "]")
    }
}
