//! CLI for bank app review analysis
//!
//! Usage:
//! ```bash
//! review_insights analyze --input reviews.csv --output-dir reports --store rows.csv
//! review_insights topics --input reviews.json --words 8
//! review_insights classify --text "The app keeps crashing"
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use review_insights::{
    pipeline::TOPIC_WORDS, CsvReviewSource, CsvReviewStore, HttpSentimentModel, JsonReportSink,
    JsonReviewSource, LexiconSentimentModel, Pipeline, PipelineConfig, ReviewSource,
    SentimentClassifier, SentimentModel,
};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "review_insights")]
#[command(version = "0.1.0")]
#[command(about = "Sentiment, topics and insights for banking app reviews", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Logging level
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// JSON configuration file; missing fields keep their defaults
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Hosted sentiment model endpoint; the offline lexicon is used otherwise
    #[arg(long, global = true)]
    remote: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over a review file
    Analyze {
        /// Reviews as CSV (review,rating,date,bank,source) or a JSON array
        #[arg(short, long)]
        input: PathBuf,

        /// Directory for the JSON reports
        #[arg(short, long, default_value = "reports")]
        output_dir: PathBuf,

        /// CSV file receiving the per-review rows
        #[arg(short, long, default_value = "reviews_processed.csv")]
        store: PathBuf,
    },

    /// Fit the topic model and print its topics
    Topics {
        #[arg(short, long)]
        input: PathBuf,

        /// Words shown per topic
        #[arg(short, long, default_value_t = TOPIC_WORDS)]
        words: usize,
    },

    /// Classify a single text
    Classify {
        #[arg(short, long)]
        text: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = match &cli.config {
        Some(path) => PipelineConfig::from_json_file(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let model = build_model(cli.remote.as_deref())?;

    match cli.command {
        Commands::Analyze {
            input,
            output_dir,
            store,
        } => run_analyze(config, model, &input, &output_dir, &store),
        Commands::Topics { input, words } => run_topics(config, model, &input, words),
        Commands::Classify { text } => run_classify(&config, model, &text),
    }
}

fn build_model(remote: Option<&str>) -> Result<Box<dyn SentimentModel>> {
    match remote {
        Some(endpoint) => {
            let mut model = HttpSentimentModel::new(endpoint)?;
            if let Ok(token) = std::env::var("HF_API_TOKEN") {
                model = model.with_token(token);
            }
            info!(endpoint, "using hosted sentiment model");
            Ok(Box::new(model))
        }
        None => Ok(Box::new(LexiconSentimentModel::new())),
    }
}

fn open_source(input: &Path) -> Result<Box<dyn ReviewSource>> {
    match input.extension().and_then(|e| e.to_str()) {
        Some("csv") => Ok(Box::new(CsvReviewSource::new(input))),
        Some("json") => Ok(Box::new(JsonReviewSource::new(input))),
        _ => bail!("unsupported review file {}: expected .csv or .json", input.display()),
    }
}

fn run_analyze(
    config: PipelineConfig,
    model: Box<dyn SentimentModel>,
    input: &Path,
    output_dir: &Path,
    store_path: &Path,
) -> Result<()> {
    let source = open_source(input)?;
    let mut store = CsvReviewStore::new(store_path);
    let mut sink = JsonReportSink::new(output_dir)?;

    let pipeline = Pipeline::new(config, model);
    let report = pipeline
        .run_with(source.as_ref(), &mut store, &mut sink)
        .map_err(|e| anyhow::anyhow!("pipeline failed at stage '{}': {}", e.stage(), e))?;

    if report.empty_corpus {
        println!("\nNo review produced any usable terms; every review is Unclassified.");
    }

    println!("\nSentiment");
    println!("─────────");
    for summary in &report.sentiment_summaries {
        println!("  {}", summary);
    }

    println!("\nInsights");
    println!("────────");
    for (insight, rec) in report.insights.iter().zip(&report.recommendations) {
        println!("  {}", insight.entity);
        println!("    drivers:     {:?}", insight.drivers);
        println!("    pain points: {:?}", insight.pain_points);
        for action in &rec.actions {
            println!("    -> {}", action);
        }
    }

    println!(
        "\nRows written to {}, reports to {}",
        store_path.display(),
        output_dir.display()
    );
    Ok(())
}

fn run_topics(config: PipelineConfig, model: Box<dyn SentimentModel>, input: &Path, words: usize) -> Result<()> {
    config.validate()?;
    let reviews = open_source(input)?.fetch()?;
    let pipeline = Pipeline::new(config, model);

    let normalized = pipeline.normalizer().normalize_reviews(&reviews);
    let fitted = pipeline.fit_topics(&normalized)?;
    if fitted.model.vocabulary().is_empty() {
        println!("No review produced any usable terms.");
        return Ok(());
    }

    let topics = fitted.model.topics(words);
    for topic in &topics {
        println!("{}", topic);
    }

    let summary = fitted.summary(&topics);
    println!("Topic diversity: {:.3}", summary.diversity);
    if let Some(coherence) = summary.avg_coherence {
        println!("Average UMass coherence: {:.3}", coherence);
    }
    Ok(())
}

fn run_classify(config: &PipelineConfig, model: Box<dyn SentimentModel>, text: &str) -> Result<()> {
    config.validate()?;
    let classifier = SentimentClassifier::new(model, config.neutral_threshold);
    let result = classifier.classify(0, Some(text))?;

    println!("Label: {}", result.label);
    println!("Score: {:.3}", result.score);
    Ok(())
}
