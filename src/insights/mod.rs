//! Turning per-review labels into per-bank insights
//!
//! - Theme lookup for dominant topics
//! - Driver and pain-point ranking
//! - Remediation recommendations
//! - Corpus statistics for reporting

pub mod aggregator;
pub mod recommendations;
pub mod summary;
pub mod themes;

pub use aggregator::{rank_themes, InsightAggregator, ThemeCount};
pub use recommendations::recommend;
pub use summary::{SentimentSummary, ThemeDistribution};
pub use themes::ThemeMapper;
