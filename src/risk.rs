// Bot risk scoring — classifies authors into risk tiers from behavioral
// signals and aggregates a topic-level distribution.
//
// The underlying signals (posting velocity, account age, duplication rate,
// network fan-out/reciprocity) are supplied by the ingestion/graph-analysis
// collaborator; this module only owns the tiering. Deterministic given
// identical inputs.

use serde::{Deserialize, Serialize};
use tracing::info;

/// Posts per day at which the velocity component saturates.
const VELOCITY_SATURATION: f64 = 50.0;

/// Accounts younger than this many days earn the full age penalty at age 0,
/// scaling linearly to none at the threshold.
const YOUNG_ACCOUNT_DAYS: f64 = 30.0;

/// Following/followers ratio at which the fan-out component saturates.
const FAN_OUT_SATURATION: f64 = 20.0;

// Component weights; they sum to 100.
const VELOCITY_WEIGHT: f64 = 30.0;
const AGE_WEIGHT: f64 = 20.0;
const DUPLICATION_WEIGHT: f64 = 30.0;
const FAN_OUT_WEIGHT: f64 = 10.0;
const RECIPROCITY_WEIGHT: f64 = 10.0;

/// Behavioral signals for one author, precomputed upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorProfile {
    pub author_id: String,
    /// Posts per day over the observation window.
    pub posting_velocity: f64,
    pub account_age_days: u32,
    /// Fraction of the author's posts that are near-duplicates, in [0, 1].
    pub duplication_rate: f64,
    /// Following count divided by follower count.
    pub fan_out: f64,
    /// Share of the author's follows that follow back, in [0, 1].
    pub reciprocity: f64,
}

/// Author risk tier, derived from the 0-100 risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RiskTier {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskTier {
    /// Determine the tier from a risk score (0-100).
    pub fn from_score(score: f64) -> Self {
        match score {
            s if s >= 76.0 => RiskTier::Critical,
            s if s >= 51.0 => RiskTier::High,
            s if s >= 26.0 => RiskTier::Medium,
            _ => RiskTier::Low,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Medium => "medium",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }
}

impl std::fmt::Display for RiskTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Topic-level distribution of author risk tiers. Recomputed per run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotRiskSummary {
    pub low: u64,
    pub medium: u64,
    pub high: u64,
    pub critical: u64,
    /// Accounts in the high or critical tier.
    pub flagged: u64,
}

impl BotRiskSummary {
    pub fn total(&self) -> u64 {
        self.low + self.medium + self.high + self.critical
    }

    /// Whether the distribution shows elevated high/critical tiers — the
    /// signal the anomaly detector's bot-amplification rule checks.
    pub fn has_elevated_tiers(&self) -> bool {
        self.flagged > 0
    }
}

/// Compute the 0-100 risk score for one author.
///
/// Additive components, each scaled into its weight:
/// - posting velocity (saturates at 50 posts/day)
/// - account youth (linear penalty under 30 days)
/// - content duplication rate
/// - network shape: fan-out imbalance and low reciprocity
pub fn risk_score(profile: &AuthorProfile) -> f64 {
    let velocity = (profile.posting_velocity / VELOCITY_SATURATION).clamp(0.0, 1.0);
    let youth = (1.0 - profile.account_age_days as f64 / YOUNG_ACCOUNT_DAYS).clamp(0.0, 1.0);
    let duplication = profile.duplication_rate.clamp(0.0, 1.0);
    let fan_out = (profile.fan_out / FAN_OUT_SATURATION).clamp(0.0, 1.0);
    let isolation = (1.0 - profile.reciprocity).clamp(0.0, 1.0);

    let score = velocity * VELOCITY_WEIGHT
        + youth * AGE_WEIGHT
        + duplication * DUPLICATION_WEIGHT
        + fan_out * FAN_OUT_WEIGHT
        + isolation * RECIPROCITY_WEIGHT;

    score.clamp(0.0, 100.0)
}

/// Tier one author.
pub fn tier(profile: &AuthorProfile) -> RiskTier {
    RiskTier::from_score(risk_score(profile))
}

/// Score a set of authors into the topic-level risk distribution.
pub fn score(authors: &[AuthorProfile]) -> BotRiskSummary {
    let mut summary = BotRiskSummary::default();
    for profile in authors {
        match tier(profile) {
            RiskTier::Low => summary.low += 1,
            RiskTier::Medium => summary.medium += 1,
            RiskTier::High => summary.high += 1,
            RiskTier::Critical => summary.critical += 1,
        }
    }
    summary.flagged = summary.high + summary.critical;

    info!(
        authors = authors.len(),
        flagged = summary.flagged,
        "bot risk distribution computed"
    );
    summary
}
