use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use groundswell::aggregate::{AggregateSnapshot, Metric};
use groundswell::anomaly;
use groundswell::cluster::CancelToken;
use groundswell::config::EngineConfig;
use groundswell::insight::{self, CompareContext};
use groundswell::normalize::RawMention;
use groundswell::output::terminal;
use groundswell::pipeline;
use groundswell::risk::{self, AuthorProfile};

/// Groundswell: mention clustering and comparative analytics.
///
/// Turns normalized social-listening mention streams into clusters, trend
/// anomalies, bot-risk distributions, and period-over-period insights.
#[derive(Parser)]
#[command(name = "groundswell", version, about)]
struct Cli {
    /// Topic whose configured scope governs this run
    #[arg(long, default_value = "default", global = true)]
    topic: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full analysis pipeline over a raw mention batch
    Analyze {
        /// JSON file containing an array of raw mention records
        mentions: PathBuf,

        /// Optional JSON file of author profiles for bot risk scoring
        #[arg(long)]
        authors: Option<PathBuf>,

        /// Override the clustering time-bucket width in hours
        #[arg(long)]
        window_hours: Option<i64>,

        /// Override the single-linkage similarity threshold in [0, 1]
        #[arg(long)]
        similarity_threshold: Option<f64>,
    },

    /// Detect trend anomalies over a chronological snapshot series
    Anomalies {
        /// JSON file containing an array of aggregate snapshots
        series: PathBuf,

        /// Metric to examine (mention-volume, positive-share, negative-share, avg-engagement)
        #[arg(long, default_value = "mention-volume")]
        metric: String,

        /// Optional JSON file of author profiles feeding bot-amplification attribution
        #[arg(long)]
        authors: Option<PathBuf>,

        /// Override the rolling-baseline bucket count
        #[arg(long)]
        baseline_window: Option<usize>,
    },

    /// Compare two aggregate snapshots and generate insights
    Compare {
        /// JSON file with the baseline snapshot
        baseline: PathBuf,

        /// JSON file with the snapshot to compare against the baseline
        current: PathBuf,

        /// Override the minimum |delta| before a metric is reported
        #[arg(long)]
        min_delta: Option<f64>,
    },

    /// Score author profiles into a bot risk distribution
    Risk {
        /// JSON file containing an array of author profiles
        authors: PathBuf,
    },
}

fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    // Set up structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("groundswell=info")),
        )
        .init();

    let cli = Cli::parse();
    // Flag overrides land on top of env/default config; each engine entry
    // point validates the final values before any processing.
    let mut config = EngineConfig::from_env(&cli.topic);

    match cli.command {
        Commands::Analyze {
            mentions,
            authors,
            window_hours,
            similarity_threshold,
        } => {
            if let Some(hours) = window_hours {
                config.cluster.window_hours = hours;
            }
            if let Some(threshold) = similarity_threshold {
                config.cluster.similarity_threshold = threshold;
            }

            let raws: Vec<RawMention> = read_json(&mentions)?;
            let profiles: Vec<AuthorProfile> = match authors {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };

            info!(topic = %cli.topic, records = raws.len(), "starting analysis");
            let report = pipeline::run(&raws, &profiles, &config, &CancelToken::new())?;

            terminal::display_cluster_list(&report.clusters);
            terminal::display_snapshot(&report.snapshot);
            if let Some(summary) = &report.risk {
                terminal::display_risk_summary(summary);
            }

            if !report.rejected.is_empty() {
                println!(
                    "  {} {} records rejected during normalization:",
                    "!".yellow(),
                    report.rejected.len()
                );
                for rejected in &report.rejected {
                    println!(
                        "    #{} ({}): {}",
                        rejected.index,
                        if rejected.id.is_empty() { "?" } else { &rejected.id },
                        rejected.error
                    );
                }
            }
            if report.out_of_scope > 0 {
                println!(
                    "  {} mentions skipped as outside the topic scope",
                    report.out_of_scope
                );
            }
        }

        Commands::Anomalies {
            series,
            metric,
            authors,
            baseline_window,
        } => {
            if let Some(window) = baseline_window {
                config.anomaly.baseline_window = window;
            }

            let snapshots: Vec<AggregateSnapshot> = read_json(&series)?;
            let metric = Metric::parse(&metric)
                .with_context(|| format!("unknown metric '{metric}'"))?;
            let bot_risk = match authors {
                Some(path) => {
                    let profiles: Vec<AuthorProfile> = read_json(&path)?;
                    Some(risk::score(&profiles))
                }
                None => None,
            };

            let anomalies =
                anomaly::detect(&snapshots, metric, &config.anomaly, bot_risk.as_ref())?;
            terminal::display_anomalies(&anomalies);
        }

        Commands::Compare {
            baseline,
            current,
            min_delta,
        } => {
            if let Some(delta) = min_delta {
                config.compare.min_delta = delta;
            }

            let a: AggregateSnapshot = read_json(&baseline)?;
            let b: AggregateSnapshot = read_json(&current)?;

            let context = CompareContext::default();
            let insights = insight::compare(&a, &b, &context, &config.compare)?;
            terminal::display_insights(&insights);
        }

        Commands::Risk { authors } => {
            let profiles: Vec<AuthorProfile> = read_json(&authors)?;
            let summary = risk::score(&profiles);
            terminal::display_risk_summary(&summary);
        }
    }

    Ok(())
}

/// Read and deserialize a JSON file, attaching the path to any failure.
fn read_json<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("failed to parse {}", path.display()))
}
