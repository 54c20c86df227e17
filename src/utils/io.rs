//! Review sources, review stores and reporting sinks
//!
//! File-backed adapters for the pipeline's external collaborators.

use crate::error::{stage, PipelineError, Result};
use crate::types::{EntityInsight, Recommendation, Review, ReviewRow};
use csv::{Reader, Writer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Produces raw reviews
pub trait ReviewSource {
    fn fetch(&self) -> Result<Vec<Review>>;
}

/// Consumes the final per-review rows
pub trait ReviewStore {
    fn store(&mut self, rows: &[ReviewRow]) -> Result<()>;
}

/// Consumes aggregate counts and strings for reporting
pub trait ReportingSink {
    fn sentiment_distribution(&mut self, counts: &[(String, usize)]) -> Result<()>;
    fn rating_distribution(&mut self, counts: &[(i32, usize)]) -> Result<()>;
    fn keyword_text(&mut self, bank: &str, text: &str) -> Result<()>;
    fn insights(&mut self, insights: &[EntityInsight], recommendations: &[Recommendation]) -> Result<()>;
}

impl ReviewSource for Vec<Review> {
    fn fetch(&self) -> Result<Vec<Review>> {
        Ok(self.clone())
    }
}

impl ReviewStore for Vec<ReviewRow> {
    fn store(&mut self, rows: &[ReviewRow]) -> Result<()> {
        self.extend_from_slice(rows);
        Ok(())
    }
}

fn io_error(stage: &'static str) -> impl FnOnce(std::io::Error) -> PipelineError {
    move |source| PipelineError::Io { stage, source }
}

fn csv_error(stage: &'static str) -> impl FnOnce(csv::Error) -> PipelineError {
    move |source| PipelineError::Csv { stage, source }
}

fn json_error(stage: &'static str) -> impl FnOnce(serde_json::Error) -> PipelineError {
    move |source| PipelineError::Json { stage, source }
}

/// Star ratings arrive as "5", "5.0" or garbage; garbage becomes 0
fn parse_rating(raw: &str) -> i32 {
    raw.trim().parse::<f64>().map(|r| r.round() as i32).unwrap_or(0)
}

#[derive(Debug, Deserialize)]
struct CsvReviewRecord {
    #[serde(default)]
    review: Option<String>,
    #[serde(default)]
    rating: Option<String>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    bank: Option<String>,
    #[serde(default)]
    source: Option<String>,
}

/// Reads `review,rating,date,bank,source` CSV files
///
/// An empty `review` cell is treated as missing text.
#[derive(Debug, Clone)]
pub struct CsvReviewSource {
    path: PathBuf,
}

impl CsvReviewSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ReviewSource for CsvReviewSource {
    fn fetch(&self) -> Result<Vec<Review>> {
        let mut reader = Reader::from_path(&self.path).map_err(csv_error(stage::SOURCE))?;
        let mut reviews = Vec::new();

        for (id, result) in reader.deserialize::<CsvReviewRecord>().enumerate() {
            let record = result.map_err(csv_error(stage::SOURCE))?;
            let raw_value = record.review.unwrap_or_default();
            let text = Some(raw_value.as_str()).filter(|t| !t.trim().is_empty());
            reviews.push(
                Review::new(
                    id,
                    record.bank.unwrap_or_default(),
                    text,
                    record.rating.as_deref().map(parse_rating).unwrap_or(0),
                )
                .with_raw_value(raw_value.as_str())
                .with_date(record.date.unwrap_or_default())
                .with_source(record.source.unwrap_or_default()),
            );
        }

        info!(path = %self.path.display(), reviews = reviews.len(), "loaded CSV reviews");
        Ok(reviews)
    }
}

/// Reads a JSON array of review objects
///
/// A `review` field that is missing or not a string is treated as missing
/// text; the record itself is kept, with non-string values rendered as JSON
/// in `raw_value`.
#[derive(Debug, Clone)]
pub struct JsonReviewSource {
    path: PathBuf,
}

impl JsonReviewSource {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    fn review_from_value(id: usize, value: &Value) -> Review {
        let field = |name: &str| value.get(name).and_then(Value::as_str).unwrap_or_default();
        let rating = match value.get("rating") {
            Some(Value::Number(n)) => n.as_f64().map(|r| r.round() as i32).unwrap_or(0),
            Some(Value::String(s)) => parse_rating(s),
            _ => 0,
        };
        let review = value.get("review");
        let text = review.and_then(Value::as_str);
        let raw_value = match review {
            Some(Value::String(s)) => s.clone(),
            None | Some(Value::Null) => String::new(),
            Some(other) => other.to_string(),
        };

        Review::new(id, field("bank"), text, rating)
            .with_raw_value(raw_value)
            .with_date(field("date"))
            .with_source(field("source"))
    }
}

impl ReviewSource for JsonReviewSource {
    fn fetch(&self) -> Result<Vec<Review>> {
        let file = File::open(&self.path).map_err(io_error(stage::SOURCE))?;
        let values: Vec<Value> = serde_json::from_reader(file).map_err(json_error(stage::SOURCE))?;

        let reviews: Vec<Review> = values
            .iter()
            .enumerate()
            .map(|(id, value)| Self::review_from_value(id, value))
            .collect();

        info!(path = %self.path.display(), reviews = reviews.len(), "loaded JSON reviews");
        Ok(reviews)
    }
}

/// Writes review rows to a CSV file
#[derive(Debug, Clone)]
pub struct CsvReviewStore {
    path: PathBuf,
}

impl CsvReviewStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl ReviewStore for CsvReviewStore {
    fn store(&mut self, rows: &[ReviewRow]) -> Result<()> {
        let mut writer = Writer::from_path(&self.path).map_err(csv_error(stage::STORE))?;
        if rows.is_empty() {
            writer
                .write_record([
                    "bank_id",
                    "review_text",
                    "cleaned_review",
                    "rating",
                    "review_date",
                    "sentiment_label",
                    "sentiment_score",
                    "source",
                ])
                .map_err(csv_error(stage::STORE))?;
        }
        for row in rows {
            writer.serialize(row).map_err(csv_error(stage::STORE))?;
        }
        writer.flush().map_err(io_error(stage::STORE))?;

        info!(path = %self.path.display(), rows = rows.len(), "stored review rows");
        Ok(())
    }
}

/// Save any serializable data to JSON
pub fn save_json<T: Serialize + ?Sized, P: AsRef<Path>>(data: &T, path: P) -> Result<()> {
    let file = File::create(path).map_err(io_error(stage::REPORT))?;
    serde_json::to_writer_pretty(file, data).map_err(json_error(stage::REPORT))?;
    Ok(())
}

/// Create directory if it doesn't exist
pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
    if !path.as_ref().exists() {
        std::fs::create_dir_all(path).map_err(io_error(stage::REPORT))?;
    }
    Ok(())
}

#[derive(Serialize)]
struct InsightReport<'a> {
    insights: &'a [EntityInsight],
    recommendations: &'a [Recommendation],
}

/// Writes one JSON file per report into an output directory
#[derive(Debug, Clone)]
pub struct JsonReportSink {
    dir: PathBuf,
    keywords: BTreeMap<String, String>,
}

impl JsonReportSink {
    pub const SENTIMENT_FILE: &'static str = "sentiment_distribution.json";
    pub const RATING_FILE: &'static str = "rating_distribution.json";
    pub const KEYWORD_FILE: &'static str = "keywords.json";
    pub const INSIGHT_FILE: &'static str = "insights.json";

    /// Create the sink, creating `dir` if needed
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        ensure_dir(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
            keywords: BTreeMap::new(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportingSink for JsonReportSink {
    fn sentiment_distribution(&mut self, counts: &[(String, usize)]) -> Result<()> {
        let counts: BTreeMap<&str, usize> = counts.iter().map(|(l, n)| (l.as_str(), *n)).collect();
        save_json(&counts, self.dir.join(Self::SENTIMENT_FILE))
    }

    fn rating_distribution(&mut self, counts: &[(i32, usize)]) -> Result<()> {
        let counts: BTreeMap<String, usize> = counts.iter().map(|(r, n)| (r.to_string(), *n)).collect();
        save_json(&counts, self.dir.join(Self::RATING_FILE))
    }

    fn keyword_text(&mut self, bank: &str, text: &str) -> Result<()> {
        self.keywords.insert(bank.to_string(), text.to_string());
        save_json(&self.keywords, self.dir.join(Self::KEYWORD_FILE))
    }

    fn insights(&mut self, insights: &[EntityInsight], recommendations: &[Recommendation]) -> Result<()> {
        save_json(
            &InsightReport {
                insights,
                recommendations,
            },
            self.dir.join(Self::INSIGHT_FILE),
        )
    }
}

/// Collects reports in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub sentiment_counts: Vec<(String, usize)>,
    pub rating_counts: Vec<(i32, usize)>,
    pub keywords: Vec<(String, String)>,
    pub insights: Vec<EntityInsight>,
    pub recommendations: Vec<Recommendation>,
}

impl ReportingSink for MemorySink {
    fn sentiment_distribution(&mut self, counts: &[(String, usize)]) -> Result<()> {
        self.sentiment_counts = counts.to_vec();
        Ok(())
    }

    fn rating_distribution(&mut self, counts: &[(i32, usize)]) -> Result<()> {
        self.rating_counts = counts.to_vec();
        Ok(())
    }

    fn keyword_text(&mut self, bank: &str, text: &str) -> Result<()> {
        self.keywords.push((bank.to_string(), text.to_string()));
        Ok(())
    }

    fn insights(&mut self, insights: &[EntityInsight], recommendations: &[Recommendation]) -> Result<()> {
        self.insights = insights.to_vec();
        self.recommendations = recommendations.to_vec();
        Ok(())
    }
}
