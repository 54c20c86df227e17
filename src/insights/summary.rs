//! Corpus statistics per bank
//!
//! Counts and shares computed over the whole run, in the order banks first
//! appear in the input.

use crate::types::{NormalizedReview, Review, SentimentLabel, SentimentResult};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Sentiment statistics for one bank
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SentimentSummary {
    pub bank: String,
    /// Reviews that carried text; the denominator of the percentages
    pub total_reviews: usize,
    pub positive_count: usize,
    pub negative_count: usize,
    pub neutral_count: usize,
    pub unknown_count: usize,
    /// Mean classifier score over all of the bank's reviews
    pub average_score: f64,
    pub positive_percentage: f64,
    pub negative_percentage: f64,
    pub neutral_percentage: f64,
}

impl fmt::Display for SentimentSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} reviews ({:.1}% positive, {:.1}% negative, {:.1}% neutral, {} unknown), avg score {:.3}",
            self.bank,
            self.total_reviews,
            self.positive_percentage,
            self.negative_percentage,
            self.neutral_percentage,
            self.unknown_count,
            self.average_score
        )
    }
}

/// Share of a bank's reviews assigned to each theme
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ThemeDistribution {
    pub bank: String,
    pub total_reviews: usize,
    /// Theme -> percentage of the bank's reviews
    pub percentages: BTreeMap<String, f64>,
}

fn percentage(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64 * 100.0
    }
}

/// Group row indices by bank in first-appearance order
fn group_by_bank(reviews: &[Review]) -> Vec<(&str, Vec<usize>)> {
    let mut groups: Vec<(&str, Vec<usize>)> = Vec::new();
    let mut slots: HashMap<&str, usize> = HashMap::new();

    for (i, review) in reviews.iter().enumerate() {
        let slot = *slots.entry(review.bank.as_str()).or_insert_with(|| {
            groups.push((review.bank.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(i);
    }
    groups
}

/// Per-bank sentiment statistics; `sentiments` is parallel to `reviews`
pub fn sentiment_summaries(reviews: &[Review], sentiments: &[SentimentResult]) -> Vec<SentimentSummary> {
    group_by_bank(reviews)
        .into_iter()
        .map(|(bank, rows)| {
            let mut counts: HashMap<SentimentLabel, usize> = HashMap::new();
            let mut score_sum = 0.0;
            let with_text = rows.iter().filter(|&&i| reviews[i].text().is_some()).count();
            for &i in &rows {
                if let Some(result) = sentiments.get(i) {
                    *counts.entry(result.label).or_insert(0) += 1;
                    score_sum += result.score;
                }
            }

            let total = rows.len();
            let count = |label: SentimentLabel| counts.get(&label).copied().unwrap_or(0);
            SentimentSummary {
                bank: bank.to_string(),
                total_reviews: with_text,
                positive_count: count(SentimentLabel::Positive),
                negative_count: count(SentimentLabel::Negative),
                neutral_count: count(SentimentLabel::Neutral),
                unknown_count: count(SentimentLabel::Unknown),
                average_score: if total == 0 { 0.0 } else { score_sum / total as f64 },
                positive_percentage: percentage(count(SentimentLabel::Positive), with_text),
                negative_percentage: percentage(count(SentimentLabel::Negative), with_text),
                neutral_percentage: percentage(count(SentimentLabel::Neutral), with_text),
            }
        })
        .collect()
}

/// Per-bank theme shares; `themes` is parallel to `reviews`
pub fn theme_distributions(reviews: &[Review], themes: &[String]) -> Vec<ThemeDistribution> {
    group_by_bank(reviews)
        .into_iter()
        .map(|(bank, rows)| {
            let mut counts: BTreeMap<String, usize> = BTreeMap::new();
            for &i in &rows {
                if let Some(theme) = themes.get(i) {
                    *counts.entry(theme.clone()).or_insert(0) += 1;
                }
            }

            let total = rows.len();
            ThemeDistribution {
                bank: bank.to_string(),
                total_reviews: total,
                percentages: counts
                    .into_iter()
                    .map(|(theme, n)| (theme, percentage(n, total)))
                    .collect(),
            }
        })
        .collect()
}

/// `(label, count)` over the whole run, in label order, zero counts omitted
pub fn label_distribution(sentiments: &[SentimentResult]) -> Vec<(String, usize)> {
    SentimentLabel::ALL
        .iter()
        .map(|label| {
            let n = sentiments.iter().filter(|s| s.label == *label).count();
            (label.as_str().to_string(), n)
        })
        .filter(|(_, n)| *n > 0)
        .collect()
}

/// `(rating, count)` in ascending rating order
pub fn rating_distribution(reviews: &[Review]) -> Vec<(i32, usize)> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for review in reviews {
        *counts.entry(review.rating).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// Lemmatized text of each bank's reviews joined by spaces, for keyword
/// clouds. `normalized` is parallel to `reviews`.
pub fn keyword_text(reviews: &[Review], normalized: &[NormalizedReview]) -> Vec<(String, String)> {
    group_by_bank(reviews)
        .into_iter()
        .map(|(bank, rows)| {
            let text = rows
                .iter()
                .filter_map(|&i| normalized.get(i))
                .filter(|doc| !doc.tokens.is_empty())
                .map(NormalizedReview::lemmatized)
                .collect::<Vec<_>>()
                .join(" ");
            (bank.to_string(), text)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture() -> (Vec<Review>, Vec<SentimentResult>) {
        let reviews = vec![
            Review::new(0, "CBE", Some("good"), 5),
            Review::new(1, "BOA", Some("bad"), 1),
            Review::new(2, "CBE", Some("slow"), 2),
            Review::new(3, "CBE", None, 3),
        ];
        let labels = [
            (SentimentLabel::Positive, 0.9),
            (SentimentLabel::Negative, 0.8),
            (SentimentLabel::Neutral, 0.5),
            (SentimentLabel::Unknown, 0.0),
        ];
        let sentiments = labels
            .iter()
            .enumerate()
            .map(|(i, &(label, score))| SentimentResult {
                review_id: i,
                label,
                score,
            })
            .collect();
        (reviews, sentiments)
    }

    #[test]
    fn test_sentiment_summary_percentages() {
        let (reviews, sentiments) = fixture();
        let summaries = sentiment_summaries(&reviews, &sentiments);

        assert_eq!(summaries.len(), 2);
        let cbe = &summaries[0];
        assert_eq!(cbe.bank, "CBE");
        // the review without text is counted as unknown but not in the total
        assert_eq!(cbe.total_reviews, 2);
        assert_eq!(cbe.positive_count, 1);
        assert_eq!(cbe.neutral_count, 1);
        assert_eq!(cbe.unknown_count, 1);
        assert_eq!(cbe.positive_percentage, 50.0);
        assert_eq!(cbe.neutral_percentage, 50.0);
        assert!((cbe.average_score - 1.4 / 3.0).abs() < 1e-9);

        let boa = &summaries[1];
        assert_eq!(boa.negative_percentage, 100.0);
    }

    #[test]
    fn test_theme_distribution() {
        let (reviews, _) = fixture();
        let themes: Vec<String> = ["A", "B", "A", "Unclassified"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let dists = theme_distributions(&reviews, &themes);

        let cbe = &dists[0];
        assert!((cbe.percentages["A"] - 200.0 / 3.0).abs() < 1e-9);
        assert!((cbe.percentages["Unclassified"] - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(dists[1].percentages["B"], 100.0);
    }

    #[test]
    fn test_label_and_rating_distributions() {
        let (reviews, sentiments) = fixture();

        assert_eq!(
            label_distribution(&sentiments),
            vec![
                ("POSITIVE".to_string(), 1),
                ("NEGATIVE".to_string(), 1),
                ("NEUTRAL".to_string(), 1),
                ("UNKNOWN".to_string(), 1),
            ]
        );
        assert_eq!(rating_distribution(&reviews), vec![(1, 1), (2, 1), (3, 1), (5, 1)]);
    }

    #[test]
    fn test_keyword_text_skips_empty_documents() {
        let (reviews, _) = fixture();
        let normalized: Vec<NormalizedReview> = reviews
            .iter()
            .map(|r| NormalizedReview {
                review_id: r.id,
                cleaned: r.text().unwrap_or_default().to_string(),
                tokens: r.text().map(|t| vec![t.to_string()]).unwrap_or_default(),
            })
            .collect();

        let text = keyword_text(&reviews, &normalized);
        assert_eq!(text[0], ("CBE".to_string(), "good slow".to_string()));
        assert_eq!(text[1], ("BOA".to_string(), "bad".to_string()));
    }
}
