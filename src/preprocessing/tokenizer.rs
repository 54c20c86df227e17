//! Review text normalization
//!
//! This module provides:
//! - Text cleaning (case folding, punctuation and digit removal)
//! - Tokenization on Unicode word boundaries
//! - Stop word and non-alphabetic token removal
//! - Lemmatization

use crate::preprocessing::lemmatizer::Lemmatizer;
use crate::types::{NormalizedReview, Review};
use rayon::prelude::*;
use regex::Regex;
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Turns raw review text into lemmatized content tokens
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    /// Stop words to filter out
    stop_words: HashSet<String>,
    /// Minimum token length
    min_length: usize,
    lemmatizer: Lemmatizer,
    punctuation: Regex,
    digits: Regex,
    whitespace: Regex,
}

impl TextNormalizer {
    /// Create a normalizer with the default English stop words
    pub fn new() -> Self {
        Self {
            stop_words: default_stop_words(),
            min_length: 1,
            lemmatizer: Lemmatizer::new(),
            punctuation: Regex::new(r"[[:punct:]]").expect("punctuation pattern is valid"),
            digits: Regex::new(r"\d+").expect("digit pattern is valid"),
            whitespace: Regex::new(r"\s+").expect("whitespace pattern is valid"),
        }
    }

    /// Add custom stop words
    pub fn add_stop_words(&mut self, words: &[&str]) {
        for word in words {
            self.stop_words.insert(word.to_lowercase());
        }
    }

    /// Set minimum token length
    pub fn min_length(mut self, len: usize) -> Self {
        self.min_length = len;
        self
    }

    pub fn is_stop_word(&self, word: &str) -> bool {
        self.stop_words.contains(word)
    }

    /// Lower-case, strip punctuation and digits, collapse whitespace.
    /// Missing text cleans to the empty string.
    pub fn clean(&self, text: Option<&str>) -> String {
        let Some(text) = text else {
            return String::new();
        };

        let cleaned = text.to_lowercase();
        let cleaned = self.punctuation.replace_all(&cleaned, "");
        let cleaned = self.digits.replace_all(&cleaned, "");
        let cleaned = self.whitespace.replace_all(cleaned.trim(), " ");

        cleaned.trim().to_string()
    }

    /// Tokenize already-cleaned text into lemmas
    pub fn lemmatize_cleaned(&self, cleaned: &str) -> Vec<String> {
        cleaned
            .unicode_words()
            .filter(|word| {
                word.chars().count() >= self.min_length
                    && word.chars().all(char::is_alphabetic)
                    && !self.stop_words.contains(*word)
            })
            .map(|word| self.lemmatizer.lemmatize(word))
            // a lemma can itself be a stop word ("did" -> "do"); dropping it
            // keeps normalization idempotent
            .filter(|lemma| !lemma.is_empty() && !self.stop_words.contains(lemma))
            .collect()
    }

    /// Normalize raw text into lemmatized content tokens
    pub fn normalize(&self, text: Option<&str>) -> Vec<String> {
        self.lemmatize_cleaned(&self.clean(text))
    }

    /// Normalize one review
    pub fn normalize_review(&self, review: &Review) -> NormalizedReview {
        let cleaned = self.clean(review.text());
        let tokens = self.lemmatize_cleaned(&cleaned);
        NormalizedReview {
            review_id: review.id,
            cleaned,
            tokens,
        }
    }

    /// Normalize a batch of reviews on the rayon pool; output keeps input order
    pub fn normalize_reviews(&self, reviews: &[Review]) -> Vec<NormalizedReview> {
        reviews
            .par_iter()
            .map(|review| self.normalize_review(review))
            .collect()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Default English stop words
fn default_stop_words() -> HashSet<String> {
    let words = [
        // Articles
        "a", "an", "the",
        // Pronouns
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "your", "yours",
        "yourself", "yourselves", "he", "him", "his", "himself", "she", "her", "hers", "herself",
        "it", "its", "itself", "they", "them", "their", "theirs", "themselves", "what", "which",
        "who", "whom", "whose", "this", "that", "these", "those", "everyone", "everything",
        "someone", "something", "anyone", "anything", "nobody", "nothing", "noone",
        // Verbs
        "am", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had", "having",
        "do", "does", "did", "doing", "done", "would", "should", "could", "ought", "might",
        "must", "shall", "will", "can", "may", "make", "get", "go", "say", "see", "put",
        // Contractions with the apostrophe stripped
        "im", "ive", "id", "ill", "youre", "youve", "hes", "shes", "its", "were", "theyre",
        "dont", "doesnt", "didnt", "cant", "couldnt", "wont", "wouldnt", "shouldnt", "isnt",
        "arent", "wasnt", "werent", "havent", "hasnt", "hadnt", "thats", "theres", "lets",
        // Prepositions
        "at", "by", "for", "from", "in", "into", "of", "on", "to", "with", "about", "against",
        "between", "during", "before", "after", "above", "below", "up", "down", "out", "off",
        "over", "under", "again", "further", "then", "once", "through", "across", "along",
        "around", "behind", "beside", "besides", "beyond", "within", "without", "toward",
        "towards", "upon", "via", "per",
        // Conjunctions
        "and", "but", "or", "nor", "so", "yet", "both", "either", "neither", "not", "only",
        "than", "when", "where", "while", "if", "because", "as", "until", "although", "though",
        "unless", "whether", "whereas",
        // Other common words
        "here", "there", "all", "each", "few", "more", "most", "other", "some", "such", "no",
        "any", "own", "same", "too", "very", "just", "also", "now", "how", "why", "well",
        "always", "never", "often", "sometimes", "already", "still", "even", "ever", "really",
        "quite", "rather", "almost", "perhaps", "please", "yes", "ok", "okay", "much", "many",
        "every", "another", "else", "however", "therefore", "thus", "hence", "since", "back",
        "first", "last", "one", "two", "three", "can", "cannot", "via", "etc", "whatever",
        "whenever", "wherever", "amount", "become", "became", "becomes", "becoming", "across",
        "mostly", "mine", "thru", "us", "onto",
    ];

    words.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text() {
        let normalizer = TextNormalizer::new();
        let cleaned = normalizer.clean(Some("  The App CRASHED 3 times!!!   Fix it, please... "));
        assert_eq!(cleaned, "the app crashed times fix it please");
    }

    #[test]
    fn test_clean_missing_text() {
        let normalizer = TextNormalizer::new();
        assert_eq!(normalizer.clean(None), "");
        assert!(normalizer.normalize(None).is_empty());
    }

    #[test]
    fn test_normalize_removes_stop_words_and_lemmatizes() {
        let normalizer = TextNormalizer::new();
        let tokens = normalizer.normalize(Some("The transfers are failing and the app crashes!"));

        assert!(!tokens.contains(&"the".to_string()));
        assert!(!tokens.contains(&"are".to_string()));
        assert!(tokens.contains(&"transfer".to_string()));
        assert!(tokens.contains(&"crash".to_string()));
        assert!(tokens.contains(&"app".to_string()));
    }

    #[test]
    fn test_non_alphabetic_tokens_dropped() {
        let normalizer = TextNormalizer::new();
        let tokens = normalizer.normalize(Some("great app 👍 2024 v2"));
        assert_eq!(tokens, vec!["great".to_string(), "app".to_string(), "v".to_string()]);
    }

    #[test]
    fn test_degenerate_input_yields_no_tokens() {
        let normalizer = TextNormalizer::new();
        assert!(normalizer.normalize(Some("12345")).is_empty());
        assert!(normalizer.normalize(Some("!!! ??? ...")).is_empty());
        assert!(normalizer.normalize(Some("")).is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let normalizer = TextNormalizer::new();
        let samples = [
            "The app keeps crashing whenever I try to log in. Worst banking app ever!!",
            "Transfers were delayed for 3 days; customer service never replied.",
            "Very good app, fast and easy to use. Loved the new features",
            "Didn't work after the update... stopped loading my accounts",
            "Best bank in Ethiopia 👍👍",
        ];

        for sample in samples {
            let once = normalizer.normalize(Some(sample));
            let twice = normalizer.normalize(Some(once.join(" ").as_str()));
            assert_eq!(once, twice, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_normalize_reviews_keeps_order() {
        let normalizer = TextNormalizer::new();
        let reviews: Vec<Review> = (0..50)
            .map(|i| Review::new(i, "CBE", Some(format!("review number {} apps", i).as_str()), 5))
            .collect();

        let normalized = normalizer.normalize_reviews(&reviews);
        assert_eq!(normalized.len(), 50);
        for (i, doc) in normalized.iter().enumerate() {
            assert_eq!(doc.review_id, i);
            assert_eq!(doc.tokens, vec!["review".to_string(), "number".to_string(), "app".to_string()]);
        }
    }
}
