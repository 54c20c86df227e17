//! Topic id to theme label lookup

use crate::config::UNCLASSIFIED_THEME;
use crate::error::{stage, PipelineError, Result};
use std::collections::BTreeMap;

/// Static mapping from topic id to theme, validated against the topic count
#[derive(Debug, Clone)]
pub struct ThemeMapper {
    themes: Vec<String>,
}

impl ThemeMapper {
    /// Build a mapper for `topic_count` topics
    ///
    /// The table must hold exactly the ids `0..topic_count`, none of them
    /// blank or reusing the unclassified sentinel.
    pub fn new(table: &BTreeMap<usize, String>, topic_count: usize) -> Result<Self> {
        let mut themes = Vec::with_capacity(topic_count);
        for id in 0..topic_count {
            let theme = table.get(&id).ok_or_else(|| {
                PipelineError::config(
                    stage::THEMES,
                    format!("topic {} has no theme (topic_count = {})", id, topic_count),
                )
            })?;
            if theme.trim().is_empty() || theme == UNCLASSIFIED_THEME {
                return Err(PipelineError::config(
                    stage::THEMES,
                    format!("topic {} has an invalid theme {:?}", id, theme),
                ));
            }
            themes.push(theme.clone());
        }

        if let Some(extra) = table.keys().find(|&&id| id >= topic_count) {
            return Err(PipelineError::config(
                stage::THEMES,
                format!("theme table names topic {} but topic_count is {}", extra, topic_count),
            ));
        }

        Ok(Self { themes })
    }

    pub fn topic_count(&self) -> usize {
        self.themes.len()
    }

    /// Theme of a dominant topic; `None` is "Unclassified"
    pub fn theme_of(&self, topic: Option<usize>) -> Result<&str> {
        match topic {
            None => Ok(UNCLASSIFIED_THEME),
            Some(id) => self.themes.get(id).map(String::as_str).ok_or_else(|| {
                PipelineError::config(
                    stage::THEMES,
                    format!("topic {} is outside 0..{}", id, self.themes.len()),
                )
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize) -> BTreeMap<usize, String> {
        (0..n).map(|id| (id, format!("Theme {}", id))).collect()
    }

    #[test]
    fn test_theme_lookup() {
        let mapper = ThemeMapper::new(&table(3), 3).unwrap();

        assert_eq!(mapper.theme_of(Some(0)).unwrap(), "Theme 0");
        assert_eq!(mapper.theme_of(Some(2)).unwrap(), "Theme 2");
        assert_eq!(mapper.theme_of(None).unwrap(), "Unclassified");
    }

    #[test]
    fn test_out_of_range_topic_fails() {
        let mapper = ThemeMapper::new(&table(3), 3).unwrap();
        let err = mapper.theme_of(Some(3)).unwrap_err();

        assert!(matches!(err, PipelineError::Configuration { .. }));
        assert_eq!(err.stage(), stage::THEMES);
    }

    #[test]
    fn test_table_must_match_topic_count() {
        assert!(ThemeMapper::new(&table(3), 5).is_err());
        assert!(ThemeMapper::new(&table(5), 3).is_err());
    }

    #[test]
    fn test_sentinel_theme_rejected() {
        let mut themes = table(2);
        themes.insert(1, UNCLASSIFIED_THEME.to_string());
        assert!(ThemeMapper::new(&themes, 2).is_err());
    }
}
