//! End-to-end review analysis
//!
//! ```text
//! reviews -> normalize -> vocabulary -> LDA fit -> dominant topic -> theme ┐
//!         -> classify ---------------------------------------------------> merge
//!                                                   -> aggregate -> recommend
//! ```
//!
//! Per-review stages run on the rayon pool. Fitting the topic model is the
//! only barrier; assignment against the fitted model is read-only.

use crate::config::PipelineConfig;
use crate::error::{stage, PipelineError, Result};
use crate::insights::summary::{self, SentimentSummary, ThemeDistribution};
use crate::insights::{recommend, InsightAggregator, ThemeMapper};
use crate::models::lda::{dominant_topic, LdaConfig, LdaTopic, TrainedLda, LDA};
use crate::preprocessing::{BagOfWords, CountVectorizer, TextNormalizer};
use crate::sentiment::{SentimentClassifier, SentimentModel};
use crate::types::{
    parse_review_date, DocumentTopics, EntityInsight, NormalizedReview, Recommendation, Review,
    ReviewRow, SentimentResult, ThemedSentiment,
};
use crate::utils::evaluation::{Evaluator, ModelSummary};
use crate::utils::io::{ReportingSink, ReviewSource, ReviewStore};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, warn};

/// Top words reported per topic
pub const TOPIC_WORDS: usize = 10;

/// Everything a run produces; per-review vectors are parallel to the input
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineReport {
    pub normalized: Vec<NormalizedReview>,
    pub sentiments: Vec<SentimentResult>,
    pub document_topics: Vec<DocumentTopics>,
    pub themes: Vec<String>,
    pub topics: Vec<LdaTopic>,
    pub model_summary: Option<ModelSummary>,
    pub insights: Vec<EntityInsight>,
    pub recommendations: Vec<Recommendation>,
    pub sentiment_summaries: Vec<SentimentSummary>,
    pub theme_distributions: Vec<ThemeDistribution>,
    /// No review contributed a single vocabulary term
    pub empty_corpus: bool,
}

/// A fitted topic model together with the corpus it was fitted on
pub struct FittedTopics {
    pub model: TrainedLda,
    pub corpus: Vec<BagOfWords>,
}

impl FittedTopics {
    /// Dominant topic per document, in corpus order
    pub fn assignments(&self, normalized: &[NormalizedReview]) -> Vec<DocumentTopics> {
        self.corpus
            .par_iter()
            .zip(normalized.par_iter())
            .map(|(bow, doc)| DocumentTopics {
                review_id: doc.review_id,
                dominant_topic: dominant_topic(&self.model.document_topics(bow)),
            })
            .collect()
    }

    /// Coherence and diversity of the fitted topics
    pub fn summary(&self, topics: &[LdaTopic]) -> ModelSummary {
        let evaluator = Evaluator::new(&self.corpus, self.model.vocabulary());
        ModelSummary::from_topics(topics, &evaluator)
    }
}

/// Review analysis pipeline
///
/// Construction only stores the configuration and the model; all work
/// happens in [`Pipeline::run`].
pub struct Pipeline<M> {
    config: PipelineConfig,
    normalizer: TextNormalizer,
    classifier: SentimentClassifier<M>,
}

impl<M: SentimentModel> Pipeline<M> {
    pub fn new(config: PipelineConfig, model: M) -> Self {
        let classifier = SentimentClassifier::new(model, config.neutral_threshold);
        Self {
            config,
            normalizer: TextNormalizer::new(),
            classifier,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn normalizer(&self) -> &TextNormalizer {
        &self.normalizer
    }

    pub fn classifier(&self) -> &SentimentClassifier<M> {
        &self.classifier
    }

    fn lda_config(&self) -> LdaConfig {
        LdaConfig::new(self.config.topic_count)
            .alpha(self.config.alpha)
            .beta(self.config.beta)
            .passes(self.config.passes)
            .inference_iterations(self.config.inference_iterations)
            .random_seed(self.config.random_seed)
    }

    /// Build the vocabulary and fit the topic model over normalized reviews
    pub fn fit_topics(&self, normalized: &[NormalizedReview]) -> Result<FittedTopics> {
        let tokens: Vec<Vec<&str>> = normalized
            .iter()
            .map(|doc| doc.tokens.iter().map(String::as_str).collect())
            .collect();

        let (vocabulary, corpus) = CountVectorizer::new()
            .min_df(self.config.min_df)
            .max_df_ratio(self.config.max_df_ratio)
            .fit_transform(&tokens);
        info!(
            documents = corpus.len(),
            vocabulary = vocabulary.len(),
            "built vocabulary"
        );

        let model = LDA::new(self.lda_config())
            .and_then(|lda| lda.fit(&corpus, vocabulary))
            .map_err(|e| PipelineError::config(stage::TOPICS, e.to_string()))?;

        if let Some(ll) = model.log_likelihood_history().last() {
            debug!(log_likelihood = ll, passes = self.config.passes, "fitted topic model");
        }
        Ok(FittedTopics { model, corpus })
    }

    /// Analyze a batch of reviews
    pub fn run(&self, reviews: &[Review]) -> Result<PipelineReport> {
        self.config.validate()?;
        let mapper = ThemeMapper::new(&self.config.topic_themes, self.config.topic_count)?;

        if reviews.is_empty() {
            warn!("no reviews to analyze");
            return Ok(PipelineReport {
                empty_corpus: true,
                ..PipelineReport::default()
            });
        }

        let normalized = self.normalizer.normalize_reviews(reviews);
        info!(reviews = normalized.len(), stage = stage::NORMALIZE, "normalized reviews");

        let sentiments = self.classifier.classify_batch(reviews)?;
        info!(reviews = sentiments.len(), stage = stage::SENTIMENT, "classified reviews");

        let fitted = self.fit_topics(&normalized)?;
        let empty_corpus = fitted.model.vocabulary().is_empty();
        if empty_corpus {
            warn!(
                reviews = reviews.len(),
                "no review contributed a vocabulary term, every review is unclassified"
            );
        }

        let document_topics = fitted.assignments(&normalized);
        let topics = fitted.model.topics(TOPIC_WORDS);
        let model_summary = if empty_corpus {
            None
        } else {
            let summary = fitted.summary(&topics);
            info!(
                topics = summary.n_topics,
                diversity = summary.diversity,
                coherence = ?summary.avg_coherence,
                stage = stage::TOPICS,
                "topic model diagnostics"
            );
            Some(summary)
        };

        let themes: Vec<String> = document_topics
            .iter()
            .map(|doc| mapper.theme_of(doc.dominant_topic).map(str::to_string))
            .collect::<Result<_>>()?;

        let rows: Vec<ThemedSentiment> = reviews
            .iter()
            .zip(&sentiments)
            .zip(&themes)
            .map(|((review, sentiment), theme)| {
                ThemedSentiment::new(review.bank.clone(), sentiment.label, theme.clone())
            })
            .collect();

        let aggregator = InsightAggregator::new(self.config.top_n_drivers, self.config.top_n_pain_points);
        let insights = aggregator.aggregate(&rows);
        let recommendations: Vec<Recommendation> = insights
            .iter()
            .map(|insight| recommend(insight, &self.config.action_table))
            .collect();
        info!(
            entities = insights.len(),
            stage = stage::INSIGHTS,
            "synthesized insights"
        );

        Ok(PipelineReport {
            sentiment_summaries: summary::sentiment_summaries(reviews, &sentiments),
            theme_distributions: summary::theme_distributions(reviews, &themes),
            normalized,
            sentiments,
            document_topics,
            themes,
            topics,
            model_summary,
            insights,
            recommendations,
            empty_corpus,
        })
    }

    /// Fetch reviews, analyze them, then hand rows to the store and
    /// aggregates to the sink
    pub fn run_with(
        &self,
        source: &dyn ReviewSource,
        store: &mut dyn ReviewStore,
        sink: &mut dyn ReportingSink,
    ) -> Result<PipelineReport> {
        let reviews = source.fetch()?;
        let report = self.run(&reviews)?;

        let rows = review_rows(&reviews, &report, &self.config.bank_ids)?;
        store.store(&rows)?;

        sink.sentiment_distribution(&summary::label_distribution(&report.sentiments))?;
        sink.rating_distribution(&summary::rating_distribution(&reviews))?;
        for (bank, text) in summary::keyword_text(&reviews, &report.normalized) {
            sink.keyword_text(&bank, &text)?;
        }
        sink.insights(&report.insights, &report.recommendations)?;

        info!(rows = rows.len(), "published results");
        Ok(report)
    }
}

/// Store ids for every bank in `reviews`
///
/// Configured ids win; other banks are numbered in first-appearance order
/// after the highest configured id.
pub fn assign_bank_ids(reviews: &[Review], configured: &BTreeMap<String, u32>) -> Result<HashMap<String, u32>> {
    let exhausted = || PipelineError::config(stage::STORE, "bank id space exhausted above u32::MAX");

    let mut ids: HashMap<String, u32> = configured.iter().map(|(k, v)| (k.clone(), *v)).collect();
    let mut next = match configured.values().max() {
        Some(max) => max.checked_add(1),
        None => Some(1),
    };

    for review in reviews {
        if !ids.contains_key(&review.bank) {
            let id = next.ok_or_else(exhausted)?;
            ids.insert(review.bank.clone(), id);
            next = id.checked_add(1);
        }
    }
    Ok(ids)
}

/// Review store rows for a finished run, one per review
///
/// Reviews without usable text keep the source's raw value as
/// `review_text` and carry the UNKNOWN sentiment.
pub fn review_rows(
    reviews: &[Review],
    report: &PipelineReport,
    configured_ids: &BTreeMap<String, u32>,
) -> Result<Vec<ReviewRow>> {
    let bank_ids = assign_bank_ids(reviews, configured_ids)?;

    let rows = reviews
        .iter()
        .zip(&report.normalized)
        .zip(&report.sentiments)
        .map(|((review, doc), sentiment)| ReviewRow {
            bank_id: bank_ids.get(&review.bank).copied().unwrap_or_default(),
            review_text: review.raw_value.clone(),
            cleaned_review: doc.cleaned.clone(),
            rating: review.rating,
            review_date: parse_review_date(&review.date),
            sentiment_label: sentiment.label.to_string(),
            sentiment_score: sentiment.score,
            source: review.source.clone(),
        })
        .collect();
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::LexiconSentimentModel;

    fn reviews() -> Vec<Review> {
        vec![
            Review::new(0, "CBE", Some("Great app, fast and easy transfers"), 5).with_date("2024-11-03"),
            Review::new(1, "CBE", Some("The app keeps crashing after the update"), 1),
            Review::new(2, "BOA", Some("Worst app, transfers fail every time"), 1),
            Review::new(3, "BOA", None, 3),
            Review::new(4, "Dashen", Some("12345"), 4),
        ]
    }

    fn pipeline() -> Pipeline<LexiconSentimentModel> {
        Pipeline::new(
            PipelineConfig::default().topic_count(5).passes(20),
            LexiconSentimentModel::new(),
        )
    }

    #[test]
    fn test_run_produces_parallel_outputs() {
        let reviews = reviews();
        let report = pipeline().run(&reviews).unwrap();

        assert_eq!(report.normalized.len(), 5);
        assert_eq!(report.sentiments.len(), 5);
        assert_eq!(report.document_topics.len(), 5);
        assert_eq!(report.themes.len(), 5);
        assert_eq!(report.topics.len(), 5);
        assert!(!report.empty_corpus);

        // missing and degenerate text
        assert_eq!(report.sentiments[3], SentimentResult::unknown(3));
        assert_eq!(report.document_topics[3].dominant_topic, None);
        assert_eq!(report.themes[3], "Unclassified");
        assert_eq!(report.themes[4], "Unclassified");

        let entities: Vec<&str> = report.insights.iter().map(|i| i.entity.as_str()).collect();
        assert_eq!(entities, vec!["CBE", "BOA", "Dashen"]);
        assert_eq!(report.recommendations.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        let report = pipeline().run(&[]).unwrap();
        assert!(report.empty_corpus);
        assert!(report.insights.is_empty());
    }

    #[test]
    fn test_no_vocabulary_is_not_fatal() {
        let reviews = vec![
            Review::new(0, "CBE", Some("!!!"), 5),
            Review::new(1, "CBE", None, 1),
        ];
        let report = pipeline().run(&reviews).unwrap();

        assert!(report.empty_corpus);
        assert!(report.themes.iter().all(|t| t == "Unclassified"));
        assert!(report.model_summary.is_none());
    }

    #[test]
    fn test_theme_table_mismatch_fails_before_work() {
        let config = PipelineConfig::default().topic_count(7);
        let err = Pipeline::new(config, LexiconSentimentModel::new())
            .run(&reviews())
            .unwrap_err();
        assert_eq!(err.stage(), stage::THEMES);
    }

    #[test]
    fn test_bank_ids() {
        let configured: BTreeMap<String, u32> = [("BOA".to_string(), 2)].into_iter().collect();
        let ids = assign_bank_ids(&reviews(), &configured).unwrap();

        assert_eq!(ids["BOA"], 2);
        assert_eq!(ids["CBE"], 3);
        assert_eq!(ids["Dashen"], 4);

        let ids = assign_bank_ids(&reviews(), &BTreeMap::new()).unwrap();
        assert_eq!(ids["CBE"], 1);
        assert_eq!(ids["BOA"], 2);
    }

    #[test]
    fn test_bank_ids_overflow_is_configuration_error() {
        let configured: BTreeMap<String, u32> = [("BOA".to_string(), u32::MAX)].into_iter().collect();
        let err = assign_bank_ids(&reviews(), &configured).unwrap_err();

        assert!(matches!(err, PipelineError::Configuration { .. }));
        assert_eq!(err.stage(), stage::STORE);

        // every bank already configured, nothing to allocate
        let configured: BTreeMap<String, u32> = [("CBE", 1), ("BOA", u32::MAX), ("Dashen", 2)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(assign_bank_ids(&reviews(), &configured).unwrap()["BOA"], u32::MAX);

        // the last free id can still be handed out
        let configured: BTreeMap<String, u32> = [("CBE", u32::MAX - 1), ("BOA", 5)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        assert_eq!(assign_bank_ids(&reviews(), &configured).unwrap()["Dashen"], u32::MAX);
    }

    #[test]
    fn test_review_rows_cover_every_review() {
        let reviews = reviews();
        let report = pipeline().run(&reviews).unwrap();
        let rows = review_rows(&reviews, &report, &BTreeMap::new()).unwrap();

        assert_eq!(rows.len(), 5);
        assert_eq!(rows[0].bank_id, 1);
        assert_eq!(rows[0].cleaned_review, "great app fast and easy transfers");
        assert_eq!(rows[0].review_date, chrono::NaiveDate::from_ymd_opt(2024, 11, 3));
        assert_eq!(rows[0].sentiment_label, "POSITIVE");

        // missing text degrades to an empty UNKNOWN row
        assert_eq!(rows[3].bank_id, 2);
        assert_eq!(rows[3].review_text, "");
        assert_eq!(rows[3].sentiment_label, "UNKNOWN");
        assert_eq!(rows[3].sentiment_score, 0.0);

        assert_eq!(rows[4].review_text, "12345");
        assert_eq!(rows[4].cleaned_review, "");
    }
}
