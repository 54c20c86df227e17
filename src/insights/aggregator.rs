//! Per-entity driver and pain-point ranking

use crate::types::{EntityInsight, SentimentLabel, ThemedSentiment};
use std::cmp::Ordering;
use std::collections::HashMap;

/// Occurrences of one theme inside a sentiment subset
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeCount {
    pub theme: String,
    pub count: usize,
    /// Position of the theme's first row in the subset
    pub first_seen: usize,
}

/// Count desc, then first occurrence asc
fn rank_order(a: &ThemeCount, b: &ThemeCount) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.first_seen.cmp(&b.first_seen))
}

/// Count themes in order and rank them
pub fn rank_themes<'a, I>(themes: I) -> Vec<ThemeCount>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: Vec<ThemeCount> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for (position, theme) in themes.into_iter().enumerate() {
        match index.get(theme) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                index.insert(theme, counts.len());
                counts.push(ThemeCount {
                    theme: theme.to_string(),
                    count: 1,
                    first_seen: position,
                });
            }
        }
    }

    counts.sort_by(rank_order);
    counts
}

/// Ranks the themes of positive and negative reviews per entity
#[derive(Debug, Clone)]
pub struct InsightAggregator {
    top_n_drivers: usize,
    top_n_pain_points: usize,
}

impl InsightAggregator {
    pub fn new(top_n_drivers: usize, top_n_pain_points: usize) -> Self {
        Self {
            top_n_drivers,
            top_n_pain_points,
        }
    }

    /// One insight per entity, in first-appearance order
    ///
    /// Drivers come from POSITIVE rows and pain points from NEGATIVE rows;
    /// NEUTRAL and UNKNOWN rows carry no directional signal and are ignored.
    pub fn aggregate(&self, rows: &[ThemedSentiment]) -> Vec<EntityInsight> {
        let mut entities: Vec<&str> = Vec::new();
        let mut by_entity: HashMap<&str, Vec<&ThemedSentiment>> = HashMap::new();

        for row in rows {
            let entry = by_entity.entry(row.entity.as_str()).or_insert_with(|| {
                entities.push(row.entity.as_str());
                Vec::new()
            });
            entry.push(row);
        }

        entities
            .into_iter()
            .map(|entity| {
                let entity_rows = &by_entity[entity];
                EntityInsight {
                    entity: entity.to_string(),
                    drivers: top_themes(entity_rows, SentimentLabel::Positive, self.top_n_drivers),
                    pain_points: top_themes(
                        entity_rows,
                        SentimentLabel::Negative,
                        self.top_n_pain_points,
                    ),
                }
            })
            .collect()
    }
}

fn top_themes(rows: &[&ThemedSentiment], label: SentimentLabel, n: usize) -> Vec<String> {
    rank_themes(
        rows.iter()
            .filter(|row| row.sentiment_label == label)
            .map(|row| row.theme.as_str()),
    )
    .into_iter()
    .take(n)
    .map(|tc| tc.theme)
    .collect()
}
