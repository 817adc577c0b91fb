// Core value objects shared across engine stages.
//
// These are the types that flow through the pipeline. They're separate from
// the stage modules so the dashboard/storage collaborator can deserialize
// them without depending on any stage logic.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The platforms the engine recognizes. Anything else is rejected at the
/// normalization boundary rather than carried as a loose string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Platform {
    Twitter,
    Instagram,
    Tiktok,
    Youtube,
    Facebook,
    Threads,
    NewsPortal,
    GoogleNews,
}

impl Platform {
    pub const ALL: [Platform; 8] = [
        Platform::Twitter,
        Platform::Instagram,
        Platform::Tiktok,
        Platform::Youtube,
        Platform::Facebook,
        Platform::Threads,
        Platform::NewsPortal,
        Platform::GoogleNews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Twitter => "twitter",
            Platform::Instagram => "instagram",
            Platform::Tiktok => "tiktok",
            Platform::Youtube => "youtube",
            Platform::Facebook => "facebook",
            Platform::Threads => "threads",
            Platform::NewsPortal => "news-portal",
            Platform::GoogleNews => "google-news",
        }
    }

    /// Parse the kebab-case form used in raw mention payloads.
    pub fn parse(s: &str) -> Option<Platform> {
        Platform::ALL.iter().copied().find(|p| p.as_str() == s)
    }

    /// News-media platforms, used by the news-cycle root-cause rule.
    pub fn is_news(&self) -> bool {
        matches!(self, Platform::NewsPortal | Platform::GoogleNews)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Three-way sentiment label attached to each mention by the ingestion layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "positive",
            SentimentLabel::Neutral => "neutral",
            SentimentLabel::Negative => "negative",
        }
    }

    pub fn parse(s: &str) -> Option<SentimentLabel> {
        match s {
            "positive" => Some(SentimentLabel::Positive),
            "neutral" => Some(SentimentLabel::Neutral),
            "negative" => Some(SentimentLabel::Negative),
            _ => None,
        }
    }

    /// Signed value used for centroid math: +1 / 0 / -1.
    pub fn signum(&self) -> f64 {
        match self {
            SentimentLabel::Positive => 1.0,
            SentimentLabel::Neutral => 0.0,
            SentimentLabel::Negative => -1.0,
        }
    }
}

impl std::fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed emotion vocabulary (Plutchik's eight basic emotions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Emotion {
    Joy,
    Trust,
    Anticipation,
    Surprise,
    Fear,
    Sadness,
    Anger,
    Disgust,
}

impl Emotion {
    pub const ALL: [Emotion; 8] = [
        Emotion::Joy,
        Emotion::Trust,
        Emotion::Anticipation,
        Emotion::Surprise,
        Emotion::Fear,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Disgust,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Trust => "trust",
            Emotion::Anticipation => "anticipation",
            Emotion::Surprise => "surprise",
            Emotion::Fear => "fear",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Disgust => "disgust",
        }
    }

    pub fn parse(s: &str) -> Option<Emotion> {
        Emotion::ALL.iter().copied().find(|e| e.as_str() == s)
    }

    /// Emotions that signal distress or hostility. A rise in one of these is
    /// an actionable driver for recommendation insights.
    pub fn is_negative(&self) -> bool {
        matches!(
            self,
            Emotion::Fear | Emotion::Sadness | Emotion::Anger | Emotion::Disgust
        )
    }
}

impl std::fmt::Display for Emotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Engagement counts attached to a mention. All non-negative by the time
/// they pass normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub likes: u64,
    pub shares: u64,
    pub comments: u64,
    pub views: u64,
}

impl Engagement {
    /// Active interactions. Views are passive reach and excluded so a single
    /// widely-served post doesn't dominate engagement statistics.
    pub fn total(&self) -> u64 {
        self.likes + self.shares + self.comments
    }
}

/// Sentiment label with the classifier's confidence in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sentiment {
    pub label: SentimentLabel,
    pub confidence: f64,
}

/// One normalized social-media/news post. Immutable once produced by the
/// normalizer; downstream components reference it by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mention {
    pub id: String,
    pub platform: Platform,
    pub author_id: String,
    pub text: String,
    pub published_at: DateTime<Utc>,
    pub engagement: Engagement,
    pub sentiment: Sentiment,
    /// Emotion shares summing to exactly 1.0 (normalizer clamps rounding
    /// drift). Empty when the ingestion layer supplied no distribution.
    pub emotions: BTreeMap<Emotion, f64>,
    /// Optional province/region tag.
    pub geo: Option<String>,
}

/// What kind of activity a cluster represents. Assigned by a majority
/// heuristic over member signals; ties resolve in this declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterType {
    ViralSpike,
    CoordinatedCampaign,
    ComplaintThread,
    RoutineDiscussion,
}

impl ClusterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClusterType::ViralSpike => "viral-spike",
            ClusterType::CoordinatedCampaign => "coordinated-campaign",
            ClusterType::ComplaintThread => "complaint-thread",
            ClusterType::RoutineDiscussion => "routine-discussion",
        }
    }
}

impl std::fmt::Display for ClusterType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Review priority for the triage workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TriagePriority {
    Urgent,
    High,
    Normal,
    Low,
}

impl TriagePriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriagePriority::Urgent => "urgent",
            TriagePriority::High => "high",
            TriagePriority::Normal => "normal",
            TriagePriority::Low => "low",
        }
    }
}

impl std::fmt::Display for TriagePriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Centroid sentiment below this magnitude reads as neutral.
const CENTROID_NEUTRAL_BAND: f64 = 0.15;

/// A set of mentions judged topically and temporally related. Membership is
/// recomputed per clustering run, never incrementally mutated across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentionCluster {
    pub id: Uuid,
    pub cluster_type: ClusterType,
    /// Representative text: the highest-engagement member, truncated.
    pub summary: String,
    /// Member mention ids, sorted ascending. Never empty.
    pub member_ids: Vec<String>,
    /// Confidence-weighted mean of member sentiment in [-1, 1].
    pub centroid_sentiment: f64,
    pub priority: TriagePriority,
    /// Earliest member timestamp.
    pub created_at: DateTime<Utc>,
    /// Latest member timestamp.
    pub last_updated_at: DateTime<Utc>,
}

impl MentionCluster {
    pub fn size(&self) -> usize {
        self.member_ids.len()
    }

    /// Collapse the centroid back to a three-way label for display.
    pub fn centroid_label(&self) -> SentimentLabel {
        if self.centroid_sentiment > CENTROID_NEUTRAL_BAND {
            SentimentLabel::Positive
        } else if self.centroid_sentiment < -CENTROID_NEUTRAL_BAND {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }
}

/// A half-open time interval [start, end).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        t >= self.start && t < self.end
    }
}
