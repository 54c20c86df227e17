//! Lexicon-based sentiment model for app reviews
//!
//! Contains:
//! - A polarity lexicon tuned to mobile banking reviews
//! - Intensity modifiers and negation handling
//! - A binary model producing POSITIVE/NEGATIVE with a confidence

use crate::sentiment::classifier::{ModelError, RawPrediction, SentimentModel};
use std::collections::{HashMap, HashSet};
use unicode_segmentation::UnicodeSegmentation;

/// Trait for sentiment lexicons
pub trait SentimentLexicon {
    /// Polarity of a word in [-1.0, 1.0]
    fn get_score(&self, word: &str) -> Option<f64>;

    /// Check whether the word carries polarity
    fn contains(&self, word: &str) -> bool;
}

/// Polarity lexicon for banking app reviews
#[derive(Debug, Clone)]
pub struct ReviewLexicon {
    /// Positive words with scores
    positive: HashMap<String, f64>,
    /// Negative words with scores
    negative: HashMap<String, f64>,
    /// Intensifiers and dampeners
    modifiers: HashMap<String, f64>,
    negations: HashSet<String>,
}

impl ReviewLexicon {
    /// Create the lexicon with the built-in word lists
    pub fn new() -> Self {
        let strong_positive = [
            ("excellent", 0.9),
            ("amazing", 0.85),
            ("awesome", 0.8),
            ("fantastic", 0.85),
            ("perfect", 0.9),
            ("wonderful", 0.85),
            ("outstanding", 0.9),
            ("love", 0.8),
            ("loved", 0.8),
            ("best", 0.8),
            ("great", 0.7),
            ("brilliant", 0.8),
            ("superb", 0.85),
            ("seamless", 0.75),
            ("reliable", 0.7),
            ("secure", 0.6),
            ("recommend", 0.7),
            ("thank", 0.6),
            ("thanks", 0.6),
        ];

        let moderate_positive = [
            ("good", 0.5),
            ("nice", 0.45),
            ("fast", 0.5),
            ("easy", 0.5),
            ("simple", 0.4),
            ("smooth", 0.5),
            ("convenient", 0.55),
            ("helpful", 0.5),
            ("useful", 0.45),
            ("friendly", 0.45),
            ("quick", 0.45),
            ("working", 0.3),
            ("works", 0.3),
            ("stable", 0.4),
            ("improved", 0.4),
            ("satisfied", 0.5),
            ("happy", 0.55),
            ("like", 0.35),
            ("fine", 0.3),
            ("clean", 0.35),
        ];

        let strong_negative = [
            ("worst", -0.9),
            ("terrible", -0.85),
            ("horrible", -0.85),
            ("awful", -0.8),
            ("useless", -0.8),
            ("scam", -0.9),
            ("fraud", -0.9),
            ("hate", -0.8),
            ("crash", -0.75),
            ("crashes", -0.75),
            ("crashed", -0.75),
            ("crashing", -0.75),
            ("broken", -0.7),
            ("disappointed", -0.7),
            ("disappointing", -0.7),
            ("failed", -0.65),
            ("fails", -0.65),
            ("failure", -0.7),
            ("stolen", -0.85),
            ("rubbish", -0.8),
            ("pathetic", -0.85),
        ];

        let moderate_negative = [
            ("bad", -0.55),
            ("poor", -0.55),
            ("slow", -0.5),
            ("error", -0.5),
            ("errors", -0.5),
            ("bug", -0.5),
            ("bugs", -0.5),
            ("problem", -0.45),
            ("problems", -0.45),
            ("issue", -0.4),
            ("issues", -0.4),
            ("stuck", -0.5),
            ("freeze", -0.5),
            ("freezes", -0.5),
            ("delay", -0.45),
            ("delayed", -0.45),
            ("annoying", -0.5),
            ("difficult", -0.45),
            ("confusing", -0.45),
            ("lag", -0.45),
            ("fail", -0.55),
            ("unable", -0.45),
            ("wrong", -0.45),
            ("complicated", -0.4),
        ];

        let positive = strong_positive
            .iter()
            .chain(moderate_positive.iter())
            .map(|(word, score)| (word.to_string(), *score))
            .collect();
        let negative = strong_negative
            .iter()
            .chain(moderate_negative.iter())
            .map(|(word, score)| (word.to_string(), *score))
            .collect();

        let modifiers = [
            ("very", 1.5),
            ("really", 1.4),
            ("extremely", 1.8),
            ("super", 1.5),
            ("absolutely", 1.6),
            ("totally", 1.4),
            ("completely", 1.5),
            ("so", 1.3),
            ("too", 1.3),
            ("highly", 1.4),
            ("quite", 1.2),
            ("somewhat", 0.8),
            ("slightly", 0.7),
            ("bit", 0.7),
            ("little", 0.7),
        ]
        .into_iter()
        .map(|(word, multiplier)| (word.to_string(), multiplier))
        .collect();

        let negations = [
            "not", "no", "never", "nothing", "nobody", "dont", "don't", "doesnt", "doesn't",
            "didnt", "didn't", "cant", "can't", "cannot", "couldnt", "couldn't", "wont", "won't",
            "isnt", "isn't", "wasnt", "wasn't", "arent", "aren't", "havent", "haven't",
        ]
        .into_iter()
        .map(str::to_string)
        .collect();

        Self {
            positive,
            negative,
            modifiers,
            negations,
        }
    }

    pub fn is_negation(&self, word: &str) -> bool {
        self.negations.contains(word)
    }

    /// Intensity multiplier of a word
    pub fn get_modifier(&self, word: &str) -> Option<f64> {
        self.modifiers.get(word).copied()
    }

    /// Add or override a word's polarity
    pub fn add_word(&mut self, word: &str, score: f64) {
        let word = word.to_lowercase();
        self.positive.remove(&word);
        self.negative.remove(&word);
        if score >= 0.0 {
            self.positive.insert(word, score);
        } else {
            self.negative.insert(word, score);
        }
    }
}

impl Default for ReviewLexicon {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentLexicon for ReviewLexicon {
    fn get_score(&self, word: &str) -> Option<f64> {
        self.positive.get(word).or_else(|| self.negative.get(word)).copied()
    }

    fn contains(&self, word: &str) -> bool {
        self.positive.contains_key(word) || self.negative.contains_key(word)
    }
}

/// Offline binary sentiment model backed by [`ReviewLexicon`]
///
/// The averaged polarity decides the label; its magnitude maps to a
/// confidence in [0.5, 1.0], so texts without polarity words come out at
/// 0.5 and fall into the neutral band.
#[derive(Debug, Clone)]
pub struct LexiconSentimentModel {
    lexicon: ReviewLexicon,
    /// Number of words a negation reaches forward
    negation_window: usize,
}

impl LexiconSentimentModel {
    pub fn new() -> Self {
        Self {
            lexicon: ReviewLexicon::new(),
            negation_window: 3,
        }
    }

    /// Use a custom lexicon
    pub fn with_lexicon(mut self, lexicon: ReviewLexicon) -> Self {
        self.lexicon = lexicon;
        self
    }

    /// Set the negation window
    pub fn with_negation_window(mut self, window: usize) -> Self {
        self.negation_window = window;
        self
    }

    /// Averaged polarity of a text in [-1.0, 1.0]
    pub fn polarity(&self, text: &str) -> f64 {
        let lowered = text.to_lowercase();

        let mut total_score = 0.0;
        let mut word_count = 0;
        let mut current_modifier = 1.0;
        let mut negation_active = false;
        let mut words_since_negation = 0;

        for token in lowered.unicode_words() {
            if self.lexicon.is_negation(token) {
                negation_active = true;
                words_since_negation = 0;
                continue;
            }

            if let Some(modifier) = self.lexicon.get_modifier(token) {
                current_modifier = modifier;
                continue;
            }

            if let Some(base_score) = self.lexicon.get_score(token) {
                let mut score = base_score * current_modifier;

                // flip with slight damping inside the negation window
                if negation_active && words_since_negation < self.negation_window {
                    score = -score * 0.8;
                }

                total_score += score;
                word_count += 1;
                current_modifier = 1.0;
            }

            if negation_active {
                words_since_negation += 1;
                if words_since_negation >= self.negation_window {
                    negation_active = false;
                }
            }
        }

        if word_count > 0 {
            (total_score / word_count as f64).clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for LexiconSentimentModel {
    fn default() -> Self {
        Self::new()
    }
}

impl SentimentModel for LexiconSentimentModel {
    fn predict(&self, text: &str) -> Result<RawPrediction, ModelError> {
        let polarity = self.polarity(text);
        let label = if polarity >= 0.0 { "POSITIVE" } else { "NEGATIVE" };
        Ok(RawPrediction::new(label, 0.5 + polarity.abs() / 2.0))
    }

    fn name(&self) -> &str {
        "lexicon"
    }
}
