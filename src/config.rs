use std::env;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::model::Platform;

/// The active topic scope. Always passed explicitly into engine calls —
/// the engine holds no ambient topic/project state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicScope {
    pub topic_id: String,
    /// Topic keyword rules supplied by the configuration collaborator.
    pub keywords: Vec<String>,
    /// Platforms in scope. `None` means all recognized platforms.
    pub platforms: Option<Vec<Platform>>,
}

impl TopicScope {
    pub fn new(topic_id: impl Into<String>) -> Self {
        Self {
            topic_id: topic_id.into(),
            keywords: Vec::new(),
            platforms: None,
        }
    }

    pub fn includes(&self, platform: Platform) -> bool {
        match &self.platforms {
            Some(scoped) => scoped.contains(&platform),
            None => true,
        }
    }

    /// Whether text matches the topic's keyword rules. An empty rule set
    /// matches everything — the ingestion collaborator has usually already
    /// scoped the stream.
    pub fn matches_text(&self, text: &str) -> bool {
        if self.keywords.is_empty() {
            return true;
        }
        let lower = text.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(&k.to_lowercase()))
    }
}

/// Clustering knobs. Everything else about triage (type and priority
/// thresholds) is a documented constant in `cluster::triage` so cluster
/// output is reproducible across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Time bucket width for bounding pairwise comparisons. Mentions are
    /// compared only within the same or adjacent bucket.
    pub window_hours: i64,
    /// Single-linkage merge threshold in [0, 1].
    pub similarity_threshold: f64,
    /// Terms that mark coordinated-campaign messaging for this topic.
    pub campaign_keywords: Vec<String>,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            window_hours: 6,
            similarity_threshold: 0.72,
            campaign_keywords: Vec::new(),
        }
    }
}

impl ClusterConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_hours <= 0 {
            return Err(ConfigError::NonPositiveWindow(self.window_hours));
        }
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.similarity_threshold));
        }
        Ok(())
    }
}

/// Anomaly detection knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyConfig {
    /// Trailing bucket count for the rolling baseline. Buckets with fewer
    /// prior samples are warm-up and never emit anomalies.
    pub baseline_window: usize,
    /// |z| at or above this is a moderate anomaly.
    pub moderate_z: f64,
    /// |z| at or above this is severe (alert-eligible).
    pub severe_z: f64,
    /// Dominant-platform share above which the bot-amplification rule fires
    /// (when the risk summary also shows elevated tiers).
    pub platform_concentration: f64,
    /// News-platform share above which a volume spike reads as a news cycle.
    pub news_surge_share: f64,
    /// A bucket at or below this fraction of the baseline mean volume reads
    /// as a data gap when the baseline is normally active.
    pub data_gap_ratio: f64,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            baseline_window: 7,
            moderate_z: 2.0,
            severe_z: 3.0,
            platform_concentration: 0.8,
            news_surge_share: 0.4,
            data_gap_ratio: 0.1,
        }
    }
}

impl AnomalyConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baseline_window < 2 {
            return Err(ConfigError::BaselineTooSmall(self.baseline_window));
        }
        if self.moderate_z <= 0.0 || self.severe_z < self.moderate_z {
            return Err(ConfigError::BadSeverityThresholds {
                moderate: self.moderate_z,
                severe: self.severe_z,
            });
        }
        if !(0.0..=1.0).contains(&self.platform_concentration) {
            return Err(ConfigError::ConcentrationOutOfRange(
                self.platform_concentration,
            ));
        }
        Ok(())
    }
}

/// Comparison insight knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Minimum |delta| (percentage points) before a metric is reported.
    /// Below this, the metric is omitted — not reported as "no change".
    pub min_delta: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self { min_delta: 3.0 }
    }
}

impl CompareConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_delta < 0.0 {
            return Err(ConfigError::NegativeMinDelta(self.min_delta));
        }
        Ok(())
    }
}

/// Full engine configuration for one topic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub scope: TopicScope,
    pub cluster: ClusterConfig,
    pub anomaly: AnomalyConfig,
    pub compare: CompareConfig,
}

impl EngineConfig {
    /// Defaults for a topic with no keyword rules or platform restriction.
    pub fn for_topic(topic_id: impl Into<String>) -> Self {
        Self {
            scope: TopicScope::new(topic_id),
            cluster: ClusterConfig::default(),
            anomaly: AnomalyConfig::default(),
            compare: CompareConfig::default(),
        }
    }

    /// Defaults overridden from environment variables where set. The .env
    /// file is loaded at startup via dotenvy; unset or unparsable values
    /// keep the default (validation still runs on the result).
    pub fn from_env(topic_id: impl Into<String>) -> Self {
        let mut config = Self::for_topic(topic_id);

        if let Some(hours) = env_parse::<i64>("GROUNDSWELL_WINDOW_HOURS") {
            config.cluster.window_hours = hours;
        }
        if let Some(threshold) = env_parse::<f64>("GROUNDSWELL_SIMILARITY_THRESHOLD") {
            config.cluster.similarity_threshold = threshold;
        }
        if let Ok(keywords) = env::var("GROUNDSWELL_CAMPAIGN_KEYWORDS") {
            config.cluster.campaign_keywords = parse_keyword_list(&keywords);
        }
        if let Ok(keywords) = env::var("GROUNDSWELL_TOPIC_KEYWORDS") {
            config.scope.keywords = parse_keyword_list(&keywords);
        }
        if let Some(window) = env_parse::<usize>("GROUNDSWELL_BASELINE_WINDOW") {
            config.anomaly.baseline_window = window;
        }
        if let Some(delta) = env_parse::<f64>("GROUNDSWELL_MIN_DELTA") {
            config.compare.min_delta = delta;
        }

        config
    }

    /// Validate every section. Called before any processing begins so a bad
    /// configuration aborts with no partial output.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cluster.validate()?;
        self.anomaly.validate()?;
        self.compare.validate()?;
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn parse_keyword_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}
