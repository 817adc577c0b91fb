// Comparison insight generation — diffs two aggregate snapshots and emits
// ranked, typed insights.
//
// Every message comes from a fixed template keyed by (insight type, metric),
// so output is fully deterministic and testable. Metrics whose |delta| falls
// below the configured threshold are omitted entirely, never reported as
// "no change". Recommendations are emitted only when a sentiment decline is
// paired with an actionable driver (a rising negative emotion or a platform
// share shift) — never from volume-only deltas.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aggregate::{round1, AggregateSnapshot};
use crate::config::CompareConfig;
use crate::error::ConfigError;
use crate::model::{Emotion, Platform};

/// What kind of statement an insight makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightType {
    Improvement,
    Decline,
    Observation,
    Recommendation,
}

impl InsightType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightType::Improvement => "improvement",
            InsightType::Decline => "decline",
            InsightType::Observation => "observation",
            InsightType::Recommendation => "recommendation",
        }
    }
}

impl std::fmt::Display for InsightType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which tracked metric an insight is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "emotion")]
pub enum InsightMetric {
    PositiveSentiment,
    NegativeSentiment,
    Engagement,
    Volume,
    Emotion(Emotion),
}

impl InsightMetric {
    /// Fixed tie-break priority: sentiment > engagement > volume > emotion.
    fn priority(&self) -> u8 {
        match self {
            InsightMetric::PositiveSentiment | InsightMetric::NegativeSentiment => 0,
            InsightMetric::Engagement => 1,
            InsightMetric::Volume => 2,
            InsightMetric::Emotion(_) => 3,
        }
    }

    pub fn label(&self) -> String {
        match self {
            InsightMetric::PositiveSentiment => "positive sentiment".to_string(),
            InsightMetric::NegativeSentiment => "negative sentiment".to_string(),
            InsightMetric::Engagement => "engagement".to_string(),
            InsightMetric::Volume => "mention volume".to_string(),
            InsightMetric::Emotion(e) => format!("{e} emotion"),
        }
    }
}

/// Display hint for the dashboard (icon selection), derived from the
/// insight type rather than free-form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InsightHint {
    Up,
    Down,
    Flat,
    Action,
}

impl InsightHint {
    pub fn as_str(&self) -> &'static str {
        match self {
            InsightHint::Up => "up",
            InsightHint::Down => "down",
            InsightHint::Flat => "flat",
            InsightHint::Action => "action",
        }
    }
}

/// One synthesized statement. Read-only to consumers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonInsight {
    pub id: Uuid,
    pub insight_type: InsightType,
    pub metric: InsightMetric,
    pub message: String,
    /// Percentage points for share metrics, percent change for
    /// engagement/volume. Rounded to one decimal.
    pub delta: f64,
    pub hint: InsightHint,
}

/// Labels for the two snapshots being compared — two periods, or a topic
/// and a competitor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareContext {
    pub baseline_label: String,
    pub current_label: String,
}

impl Default for CompareContext {
    fn default() -> Self {
        Self {
            baseline_label: "previous period".to_string(),
            current_label: "current period".to_string(),
        }
    }
}

/// Message templates, keyed by (type, metric family). Data, not hand-written
/// per call. Placeholders: {metric}, {delta}, {baseline}, {current},
/// {driver}.
fn message_template(insight_type: InsightType, metric: &InsightMetric) -> &'static str {
    match (insight_type, metric) {
        (InsightType::Improvement, InsightMetric::PositiveSentiment) => {
            "{metric} rose {delta} points from {baseline} to {current}"
        }
        (InsightType::Improvement, InsightMetric::NegativeSentiment) => {
            "{metric} eased {delta} points from {baseline} to {current}"
        }
        (InsightType::Improvement, InsightMetric::Engagement) => {
            "{metric} per mention grew {delta}% versus {baseline}"
        }
        (InsightType::Decline, InsightMetric::PositiveSentiment) => {
            "{metric} fell {delta} points from {baseline} to {current}"
        }
        (InsightType::Decline, InsightMetric::NegativeSentiment) => {
            "{metric} climbed {delta} points from {baseline} to {current}"
        }
        (InsightType::Decline, InsightMetric::Engagement) => {
            "{metric} per mention dropped {delta}% versus {baseline}"
        }
        (InsightType::Observation, InsightMetric::Volume) => {
            "{metric} shifted {delta}% between {baseline} and {current}"
        }
        (InsightType::Observation, InsightMetric::Emotion(_)) => {
            "{metric} share moved {delta} points in {current}"
        }
        (InsightType::Recommendation, _) => {
            "review {driver}: it is driving the negative sentiment rise in {current}"
        }
        // Remaining combinations are never emitted by compare(); give them
        // a neutral fallback instead of panicking.
        _ => "{metric} changed {delta} in {current}",
    }
}

fn render(
    insight_type: InsightType,
    metric: &InsightMetric,
    delta: f64,
    context: &CompareContext,
    driver: Option<&str>,
) -> String {
    message_template(insight_type, metric)
        .replace("{metric}", &metric.label())
        .replace("{delta}", &format!("{:.1}", delta.abs()))
        .replace("{baseline}", &context.baseline_label)
        .replace("{current}", &context.current_label)
        .replace("{driver}", driver.unwrap_or("the shift"))
}

/// Diff two snapshots into a ranked insight sequence. `a` is the baseline,
/// `b` the comparison target. Identical snapshots produce an empty output.
pub fn compare(
    a: &AggregateSnapshot,
    b: &AggregateSnapshot,
    context: &CompareContext,
    config: &CompareConfig,
) -> Result<Vec<ComparisonInsight>, ConfigError> {
    config.validate()?;

    let mut insights: Vec<ComparisonInsight> = Vec::new();
    let mut push = |insight_type: InsightType,
                    metric: InsightMetric,
                    delta: f64,
                    hint: InsightHint,
                    driver: Option<&str>| {
        insights.push(ComparisonInsight {
            id: Uuid::new_v4(),
            insight_type,
            metric,
            message: render(insight_type, &metric, delta, context, driver),
            delta: round1(delta),
            hint,
        });
    };

    // Sentiment shares: percentage-point deltas.
    let positive_delta = b.sentiment.positive - a.sentiment.positive;
    if positive_delta.abs() >= config.min_delta {
        if positive_delta > 0.0 {
            push(
                InsightType::Improvement,
                InsightMetric::PositiveSentiment,
                positive_delta,
                InsightHint::Up,
                None,
            );
        } else {
            push(
                InsightType::Decline,
                InsightMetric::PositiveSentiment,
                positive_delta,
                InsightHint::Down,
                None,
            );
        }
    }

    let negative_delta = b.sentiment.negative - a.sentiment.negative;
    let negative_rising = negative_delta >= config.min_delta;
    if negative_delta.abs() >= config.min_delta {
        if negative_rising {
            push(
                InsightType::Decline,
                InsightMetric::NegativeSentiment,
                negative_delta,
                InsightHint::Down,
                None,
            );
        } else {
            push(
                InsightType::Improvement,
                InsightMetric::NegativeSentiment,
                negative_delta,
                InsightHint::Up,
                None,
            );
        }
    }

    // Engagement: percent change against the baseline average.
    if let Some(engagement_delta) = percent_change(a.avg_engagement, b.avg_engagement) {
        if engagement_delta.abs() >= config.min_delta {
            if engagement_delta > 0.0 {
                push(
                    InsightType::Improvement,
                    InsightMetric::Engagement,
                    engagement_delta,
                    InsightHint::Up,
                    None,
                );
            } else {
                push(
                    InsightType::Decline,
                    InsightMetric::Engagement,
                    engagement_delta,
                    InsightHint::Down,
                    None,
                );
            }
        }
    }

    // Volume: percent change, observation only — volume alone says nothing
    // about quality, so it never becomes improvement/decline/recommendation.
    if let Some(volume_delta) = percent_change(a.mention_count as f64, b.mention_count as f64) {
        if volume_delta.abs() >= config.min_delta {
            push(
                InsightType::Observation,
                InsightMetric::Volume,
                volume_delta,
                InsightHint::Flat,
                None,
            );
        }
    }

    // Emotions: percentage-point deltas, observations.
    for emotion in Emotion::ALL {
        let delta = emotion_share(b, emotion) - emotion_share(a, emotion);
        if delta.abs() >= config.min_delta {
            push(
                InsightType::Observation,
                InsightMetric::Emotion(emotion),
                delta,
                if delta > 0.0 {
                    InsightHint::Up
                } else {
                    InsightHint::Down
                },
                None,
            );
        }
    }

    // Recommendation: only when negative sentiment rose AND a specific
    // driver is identifiable.
    if negative_rising {
        if let Some((driver, driver_delta)) = find_decline_driver(a, b, config.min_delta) {
            push(
                InsightType::Recommendation,
                InsightMetric::NegativeSentiment,
                driver_delta,
                InsightHint::Action,
                Some(&driver),
            );
        }
    }

    // Rank by |delta| descending; ties by fixed metric priority.
    insights.sort_by(|x, y| {
        y.delta
            .abs()
            .partial_cmp(&x.delta.abs())
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| x.metric.priority().cmp(&y.metric.priority()))
    });

    Ok(insights)
}

/// Percent change from `from` to `to`. `None` when the baseline is zero —
/// there is no meaningful percentage against nothing.
fn percent_change(from: f64, to: f64) -> Option<f64> {
    if from == 0.0 {
        return None;
    }
    Some((to - from) / from * 100.0)
}

fn emotion_share(snapshot: &AggregateSnapshot, emotion: Emotion) -> f64 {
    snapshot.emotions.get(&emotion).copied().unwrap_or(0.0)
}

/// The actionable signal behind a negative-sentiment rise: the strongest
/// rising negative emotion, else the strongest rising platform share.
/// Evaluated in that fixed order; `None` when nothing clears the threshold.
fn find_decline_driver(
    a: &AggregateSnapshot,
    b: &AggregateSnapshot,
    min_delta: f64,
) -> Option<(String, f64)> {
    let emotion_driver = Emotion::ALL
        .iter()
        .filter(|e| e.is_negative())
        .map(|&e| (e, emotion_share(b, e) - emotion_share(a, e)))
        .filter(|(_, delta)| *delta >= min_delta)
        .max_by(|(ea, da), (eb, db)| {
            da.partial_cmp(db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| eb.cmp(ea))
        });
    if let Some((emotion, delta)) = emotion_driver {
        return Some((format!("rising {emotion}"), delta));
    }

    let platform_driver = Platform::ALL
        .iter()
        .map(|&p| (p, platform_share(b, p) - platform_share(a, p)))
        .filter(|(_, delta)| *delta >= min_delta)
        .max_by(|(pa, da), (pb, db)| {
            da.partial_cmp(db)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| pb.cmp(pa))
        });
    platform_driver.map(|(platform, delta)| (format!("the surge on {platform}"), delta))
}

/// Platform share as a percentage of the snapshot's mention count.
fn platform_share(snapshot: &AggregateSnapshot, platform: Platform) -> f64 {
    if snapshot.mention_count == 0 {
        return 0.0;
    }
    let count = snapshot.platform_counts.get(&platform).copied().unwrap_or(0);
    count as f64 / snapshot.mention_count as f64 * 100.0
}
