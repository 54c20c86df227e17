//! Vocabulary and bag-of-words vectorization for topic modeling
//!
//! Documents are represented sparsely as `(term_id, count)` pairs over a
//! corpus-wide vocabulary.

use hashbrown::HashMap;
use std::collections::HashSet;

/// Sparse bag-of-words document: `(term_id, count)` sorted by term id
pub type BagOfWords = Vec<(usize, usize)>;

/// Bidirectional token <-> id mapping built once per corpus
///
/// Ids are assigned in sorted token order so the same corpus always produces
/// the same ids.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vocabulary {
    /// Term -> index mapping
    term_to_id: HashMap<String, usize>,
    /// Index -> term
    terms: Vec<String>,
    /// Document frequency per term id
    document_frequencies: Vec<usize>,
}

impl Vocabulary {
    /// Number of terms
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Id of a term, if it survived pruning
    pub fn id(&self, term: &str) -> Option<usize> {
        self.term_to_id.get(term).copied()
    }

    /// Term by id
    pub fn term(&self, id: usize) -> Option<&str> {
        self.terms.get(id).map(String::as_str)
    }

    /// All terms in id order
    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Number of documents containing the term
    pub fn document_frequency(&self, id: usize) -> Option<usize> {
        self.document_frequencies.get(id).copied()
    }

    /// Convert a token sequence into a sparse count vector.
    /// Out-of-vocabulary tokens are ignored.
    pub fn doc2bow<S: AsRef<str>>(&self, tokens: &[S]) -> BagOfWords {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for token in tokens {
            if let Some(id) = self.id(token.as_ref()) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }

        let mut bow: BagOfWords = counts.into_iter().collect();
        bow.sort_unstable_by_key(|&(id, _)| id);
        bow
    }
}

/// Builds a [`Vocabulary`] with uniform document-frequency pruning
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    /// Minimum document frequency
    min_df: usize,
    /// Maximum document frequency ratio
    max_df_ratio: f64,
    /// Maximum vocabulary size
    max_features: Option<usize>,
}

impl CountVectorizer {
    /// Create a vectorizer that keeps every term
    pub fn new() -> Self {
        Self {
            min_df: 1,
            max_df_ratio: 1.0,
            max_features: None,
        }
    }

    /// Set minimum document frequency
    pub fn min_df(mut self, min_df: usize) -> Self {
        self.min_df = min_df;
        self
    }

    /// Set maximum document frequency ratio
    pub fn max_df_ratio(mut self, ratio: f64) -> Self {
        self.max_df_ratio = ratio;
        self
    }

    /// Set maximum vocabulary size
    pub fn max_features(mut self, max: usize) -> Self {
        self.max_features = Some(max);
        self
    }

    /// Build the vocabulary from the union of all documents' tokens
    pub fn fit<S: AsRef<str>>(&self, tokenized_docs: &[Vec<S>]) -> Vocabulary {
        let n_docs = tokenized_docs.len();

        // Count document and corpus frequencies
        let mut term_doc_freq: HashMap<&str, usize> = HashMap::new();
        let mut term_total_freq: HashMap<&str, usize> = HashMap::new();

        for doc in tokenized_docs {
            let unique_terms: HashSet<&str> = doc.iter().map(|t| t.as_ref()).collect();
            for term in unique_terms {
                *term_doc_freq.entry(term).or_insert(0) += 1;
            }
            for term in doc {
                *term_total_freq.entry(term.as_ref()).or_insert(0) += 1;
            }
        }

        let max_df = (n_docs as f64 * self.max_df_ratio) as usize;
        let mut filtered_terms: Vec<(&str, usize, usize)> = term_doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= self.min_df && *df <= max_df)
            .map(|(term, df)| (term, df, term_total_freq.get(term).copied().unwrap_or(0)))
            .collect();

        if let Some(max) = self.max_features {
            // Highest corpus frequency first, term text breaks ties
            filtered_terms.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(b.0)));
            filtered_terms.truncate(max);
        }

        // Sort alphabetically for consistent id assignment
        filtered_terms.sort_by(|a, b| a.0.cmp(b.0));

        let mut vocabulary = Vocabulary::default();
        for (idx, (term, df, _)) in filtered_terms.into_iter().enumerate() {
            vocabulary.term_to_id.insert(term.to_string(), idx);
            vocabulary.terms.push(term.to_string());
            vocabulary.document_frequencies.push(df);
        }
        vocabulary
    }

    /// Build the vocabulary and convert every document
    pub fn fit_transform<S: AsRef<str>>(&self, tokenized_docs: &[Vec<S>]) -> (Vocabulary, Vec<BagOfWords>) {
        let vocabulary = self.fit(tokenized_docs);
        let corpus = tokenized_docs
            .iter()
            .map(|doc| vocabulary.doc2bow(doc))
            .collect();
        (vocabulary, corpus)
    }
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self::new()
    }
}
