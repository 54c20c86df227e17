//! Quality diagnostics for fitted topic models

use crate::models::lda::LdaTopic;
use crate::preprocessing::vectorizer::{BagOfWords, Vocabulary};
use serde::Serialize;
use std::collections::HashSet;

/// Topic model evaluation metrics over a sparse corpus
pub struct Evaluator<'a> {
    corpus: &'a [BagOfWords],
    vocabulary: &'a Vocabulary,
}

impl<'a> Evaluator<'a> {
    pub fn new(corpus: &'a [BagOfWords], vocabulary: &'a Vocabulary) -> Self {
        Self { corpus, vocabulary }
    }

    fn contains(doc: &BagOfWords, term: usize) -> bool {
        doc.binary_search_by_key(&term, |&(id, _)| id).is_ok()
    }

    /// Compute UMass coherence for a topic
    ///
    /// UMass coherence uses document co-occurrence to measure topic quality.
    /// Higher (less negative) values indicate more coherent topics.
    pub fn umass_coherence(&self, top_words: &[String]) -> Option<f64> {
        let word_indices: Vec<usize> = top_words
            .iter()
            .filter_map(|w| self.vocabulary.id(w))
            .collect();

        if word_indices.len() < 2 {
            return None;
        }

        let epsilon = 1.0; // Smoothing factor
        let mut coherence = 0.0;
        let mut pair_count = 0;

        for (i, &w1) in word_indices.iter().enumerate() {
            for &w2 in word_indices.iter().skip(i + 1) {
                let d_w2 = self.corpus.iter().filter(|doc| Self::contains(doc, w2)).count() as f64;
                if d_w2 == 0.0 {
                    continue;
                }
                let d_w1_w2 = self
                    .corpus
                    .iter()
                    .filter(|doc| Self::contains(doc, w1) && Self::contains(doc, w2))
                    .count() as f64;

                coherence += ((d_w1_w2 + epsilon) / d_w2).ln();
                pair_count += 1;
            }
        }

        if pair_count > 0 {
            Some(coherence / pair_count as f64)
        } else {
            None
        }
    }

    /// Compute topic diversity
    ///
    /// Share of unique words among all topics' top words; 1.0 means no
    /// topic shares a top word with another.
    pub fn topic_diversity(topics: &[Vec<String>]) -> f64 {
        let all_words: Vec<&str> = topics.iter().flatten().map(String::as_str).collect();
        if all_words.is_empty() {
            return 0.0;
        }

        let unique_words: HashSet<&str> = all_words.iter().copied().collect();
        unique_words.len() as f64 / all_words.len() as f64
    }
}

/// Summary statistics for a topic model
#[derive(Debug, Clone, Serialize)]
pub struct ModelSummary {
    /// Number of topics
    pub n_topics: usize,
    /// Average coherence score
    pub avg_coherence: Option<f64>,
    /// Topic diversity
    pub diversity: f64,
    /// Per-topic coherence scores
    pub topic_coherences: Vec<Option<f64>>,
}

impl ModelSummary {
    /// Create a summary from fitted topics
    pub fn from_topics(topics: &[LdaTopic], evaluator: &Evaluator<'_>) -> Self {
        let topic_words: Vec<Vec<String>> = topics
            .iter()
            .map(|t| t.top_words.iter().map(|(w, _)| w.clone()).collect())
            .collect();

        let topic_coherences: Vec<Option<f64>> = topic_words
            .iter()
            .map(|words| evaluator.umass_coherence(words))
            .collect();

        let coherence_values: Vec<f64> = topic_coherences.iter().filter_map(|&c| c).collect();
        let avg_coherence = if coherence_values.is_empty() {
            None
        } else {
            Some(coherence_values.iter().sum::<f64>() / coherence_values.len() as f64)
        };

        Self {
            n_topics: topics.len(),
            avg_coherence,
            diversity: Evaluator::topic_diversity(&topic_words),
            topic_coherences,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::vectorizer::CountVectorizer;

    #[test]
    fn test_topic_diversity() {
        let topics = vec![
            vec!["crash".to_string(), "login".to_string()],
            vec!["fast".to_string(), "easy".to_string()],
        ];
        assert_eq!(Evaluator::topic_diversity(&topics), 1.0);

        let topics_overlap = vec![
            vec!["crash".to_string(), "login".to_string()],
            vec!["crash".to_string(), "easy".to_string()],
        ];
        assert_eq!(Evaluator::topic_diversity(&topics_overlap), 0.75);
        assert_eq!(Evaluator::topic_diversity(&[]), 0.0);
    }

    #[test]
    fn test_umass_coherence() {
        let docs: Vec<Vec<&str>> = vec![
            vec!["crash", "login"],
            vec!["crash", "login"],
            vec!["transfer"],
            vec!["transfer"],
        ];
        let (vocabulary, corpus) = CountVectorizer::new().fit_transform(&docs);
        let evaluator = Evaluator::new(&corpus, &vocabulary);

        // crash and login always appear together
        let together = evaluator
            .umass_coherence(&["crash".to_string(), "login".to_string()])
            .unwrap();
        let apart = evaluator
            .umass_coherence(&["crash".to_string(), "transfer".to_string()])
            .unwrap();
        assert!(together > apart);
        assert!(evaluator.umass_coherence(&["crash".to_string()]).is_none());
    }
}
