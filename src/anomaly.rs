// Trend anomaly detection over a chronological snapshot series.
//
// A trailing-N rolling baseline (mean + sample standard deviation) judges
// each bucket past the warm-up period. Buckets whose z-score clears the
// moderate threshold become anomalies; root cause is attributed by a rule
// cascade evaluated in fixed order so attribution is reproducible.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::aggregate::{AggregateSnapshot, Metric};
use crate::config::AnomalyConfig;
use crate::error::ConfigError;
use crate::model::TimeInterval;
use crate::risk::BotRiskSummary;

/// Baselines quieter than this mean volume can't meaningfully signal a
/// data gap — silence is just a quiet topic.
const DATA_GAP_MIN_BASELINE_VOLUME: f64 = 10.0;

/// Minimum distinct platforms for a spike to read as organically viral.
const VIRAL_MIN_PLATFORMS: usize = 3;

/// Baselines with stddev below this carry no variability signal; z-scores
/// against them would be unbounded noise, so those buckets are skipped.
const MIN_BASELINE_STDDEV: f64 = 1e-9;

/// Attributed likely driver of a detected anomaly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootCause {
    ViralEvent,
    BotAmplification,
    NewsCycle,
    DataGap,
    Unknown,
}

impl RootCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            RootCause::ViralEvent => "viral-event",
            RootCause::BotAmplification => "bot-amplification",
            RootCause::NewsCycle => "news-cycle",
            RootCause::DataGap => "data-gap",
            RootCause::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for RootCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity derived from |z| against the configured thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Severity {
    Moderate,
    Severe,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A detected deviation. Consumed, never mutated, by alerting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendAnomaly {
    pub metric: Metric,
    pub bucket: TimeInterval,
    pub observed: f64,
    /// The rolling baseline mean at this bucket.
    pub expected: f64,
    /// Signed z-score against the baseline.
    pub z_score: f64,
    pub root_cause: RootCause,
    pub severity: Severity,
}

impl TrendAnomaly {
    /// Whether the alerting collaborator should consider delivering this.
    pub fn is_alertable(&self) -> bool {
        self.severity == Severity::Severe
    }
}

/// Detect anomalies for one metric across a chronologically ordered series.
///
/// The first `baseline_window` buckets are warm-up and never emit anomalies
/// regardless of their values — insufficient baseline is suppressed output,
/// not an error. `bot_risk` feeds the bot-amplification root-cause rule; it
/// is optional because callers may not have author signals for the topic.
pub fn detect(
    series: &[AggregateSnapshot],
    metric: Metric,
    config: &AnomalyConfig,
    bot_risk: Option<&BotRiskSummary>,
) -> Result<Vec<TrendAnomaly>, ConfigError> {
    config.validate()?;

    let mut anomalies = Vec::new();
    let n = config.baseline_window;

    for i in n..series.len() {
        let baseline = &series[i - n..i];
        let current = &series[i];

        let values: Vec<f64> = baseline.iter().map(|s| s.metric(metric)).collect();
        let baseline_mean = mean(&values);
        let baseline_stddev = sample_stddev(&values, baseline_mean);

        if baseline_stddev < MIN_BASELINE_STDDEV {
            debug!(bucket = i, "flat baseline, skipping z-score");
            continue;
        }

        let observed = current.metric(metric);
        let z = (observed - baseline_mean) / baseline_stddev;
        if z.abs() < config.moderate_z {
            continue;
        }

        let severity = if z.abs() >= config.severe_z {
            Severity::Severe
        } else {
            Severity::Moderate
        };

        anomalies.push(TrendAnomaly {
            metric,
            bucket: current.interval,
            observed,
            expected: baseline_mean,
            z_score: z,
            root_cause: attribute(current, baseline, z, config, bot_risk),
            severity,
        });
    }

    Ok(anomalies)
}

/// Root-cause rule cascade, evaluated in fixed order:
///   1. concentrated platform + elevated bot tiers → bot-amplification
///   2. volume spike led by news platforms        → news-cycle
///   3. volume spike with broad platform spread   → viral-event
///   4. near-silence against an active baseline   → data-gap
///   5. otherwise                                 → unknown
fn attribute(
    current: &AggregateSnapshot,
    baseline: &[AggregateSnapshot],
    z: f64,
    config: &AnomalyConfig,
    bot_risk: Option<&BotRiskSummary>,
) -> RootCause {
    let baseline_volumes: Vec<f64> = baseline.iter().map(|s| s.mention_count as f64).collect();
    let baseline_volume_mean = mean(&baseline_volumes);

    // 1. Bot amplification: one platform dominates and the author pool
    //    shows high/critical risk tiers.
    if let Some((_, share)) = current.dominant_platform() {
        if share > config.platform_concentration
            && bot_risk.is_some_and(BotRiskSummary::has_elevated_tiers)
        {
            return RootCause::BotAmplification;
        }
    }

    // 2. News cycle: a positive spike where news platforms surge past both
    //    the configured share and their baseline presence.
    if z > 0.0 {
        let baseline_news = mean(&baseline.iter().map(AggregateSnapshot::news_share).collect::<Vec<_>>());
        if current.news_share() >= config.news_surge_share && current.news_share() > baseline_news {
            return RootCause::NewsCycle;
        }
    }

    // 3. Viral event: a positive spike spread across platforms rather than
    //    concentrated on one.
    if z > 0.0 && current.platform_diversity() >= VIRAL_MIN_PLATFORMS {
        let concentrated = current
            .dominant_platform()
            .is_some_and(|(_, share)| share > config.platform_concentration);
        if !concentrated {
            return RootCause::ViralEvent;
        }
    }

    // 4. Data gap: a normally active series going near-silent.
    if baseline_volume_mean >= DATA_GAP_MIN_BASELINE_VOLUME
        && (current.mention_count as f64) <= config.data_gap_ratio * baseline_volume_mean
    {
        return RootCause::DataGap;
    }

    RootCause::Unknown
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn sample_stddev(values: &[f64], m: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let var =
        values.iter().map(|&v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
