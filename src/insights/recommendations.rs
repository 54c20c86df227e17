//! Remediation statements for pain-point themes

use crate::types::{EntityInsight, Recommendation};
use std::collections::BTreeMap;
use tracing::debug;

/// One action per pain point that has an entry in `action_table`, in
/// pain-point order. Themes without an entry contribute nothing.
pub fn recommend(insight: &EntityInsight, action_table: &BTreeMap<String, String>) -> Recommendation {
    let actions = insight
        .pain_points
        .iter()
        .filter_map(|theme| match action_table.get(theme) {
            Some(action) => Some(action.clone()),
            None => {
                debug!(entity = %insight.entity, theme = %theme, "no action for pain point");
                None
            }
        })
        .collect();

    Recommendation {
        entity: insight.entity.clone(),
        actions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn actions() -> BTreeMap<String, String> {
        [("B", "Fix B"), ("C", "Fix C")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn insight(pain_points: &[&str]) -> EntityInsight {
        EntityInsight {
            entity: "CBE".to_string(),
            drivers: vec!["A".to_string()],
            pain_points: pain_points.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_actions_follow_pain_point_order() {
        let rec = recommend(&insight(&["C", "B"]), &actions());
        assert_eq!(rec.entity, "CBE");
        assert_eq!(rec.actions, vec!["Fix C", "Fix B"]);
    }

    #[test]
    fn test_unmapped_themes_skipped() {
        let rec = recommend(&insight(&["X", "B"]), &actions());
        assert_eq!(rec.actions, vec!["Fix B"]);

        let rec = recommend(&insight(&["X"]), &actions());
        assert!(rec.actions.is_empty());
    }

    #[test]
    fn test_no_pain_points() {
        let rec = recommend(&insight(&[]), &actions());
        assert!(rec.actions.is_empty());
    }
}
