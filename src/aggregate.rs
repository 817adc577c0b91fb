// Aggregation engine — sentiment/emotion/platform/engagement statistics
// over a mention set and a closed time interval.
//
// `aggregate` is a pure function of its inputs: the same mentions and
// interval always yield a bit-identical snapshot. Shares are percentages
// kept at full precision internally; `rounded()` produces the one-decimal
// view for external reporting.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{Emotion, Mention, Platform, SentimentLabel, TimeInterval};

/// Sentiment shares as percentages of the mention count. All zero for an
/// empty snapshot — never NaN.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive: f64,
    pub neutral: f64,
    pub negative: f64,
}

/// The metrics the anomaly detector can track across a snapshot series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Metric {
    MentionVolume,
    PositiveShare,
    NegativeShare,
    AvgEngagement,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::MentionVolume,
        Metric::PositiveShare,
        Metric::NegativeShare,
        Metric::AvgEngagement,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Metric::MentionVolume => "mention-volume",
            Metric::PositiveShare => "positive-share",
            Metric::NegativeShare => "negative-share",
            Metric::AvgEngagement => "avg-engagement",
        }
    }

    pub fn parse(s: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.as_str() == s)
    }
}

impl std::fmt::Display for Metric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable aggregate statistics over one mention set and interval.
/// Produced fresh per query, never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateSnapshot {
    pub interval: TimeInterval,
    pub mention_count: u64,
    pub sentiment: SentimentBreakdown,
    /// Emotion → percentage share. Empty when no mention carried a
    /// distribution; absent keys read as 0.
    pub emotions: BTreeMap<Emotion, f64>,
    pub platform_counts: BTreeMap<Platform, u64>,
    pub total_engagement: u64,
    pub avg_engagement: f64,
}

impl AggregateSnapshot {
    /// The zero-count snapshot: all shares 0, no division anywhere.
    pub fn empty(interval: TimeInterval) -> Self {
        Self {
            interval,
            mention_count: 0,
            sentiment: SentimentBreakdown::default(),
            emotions: BTreeMap::new(),
            platform_counts: BTreeMap::new(),
            total_engagement: 0,
            avg_engagement: 0.0,
        }
    }

    /// One-decimal view for external reporting. Internal callers (anomaly
    /// detection, comparison) keep the full-precision original.
    pub fn rounded(&self) -> Self {
        let mut out = self.clone();
        out.sentiment.positive = round1(out.sentiment.positive);
        out.sentiment.neutral = round1(out.sentiment.neutral);
        out.sentiment.negative = round1(out.sentiment.negative);
        for share in out.emotions.values_mut() {
            *share = round1(*share);
        }
        out.avg_engagement = round1(out.avg_engagement);
        out
    }

    /// Extract the value of a tracked metric from this snapshot.
    pub fn metric(&self, metric: Metric) -> f64 {
        match metric {
            Metric::MentionVolume => self.mention_count as f64,
            Metric::PositiveShare => self.sentiment.positive,
            Metric::NegativeShare => self.sentiment.negative,
            Metric::AvgEngagement => self.avg_engagement,
        }
    }

    /// The platform with the most mentions and its share of the total.
    pub fn dominant_platform(&self) -> Option<(Platform, f64)> {
        if self.mention_count == 0 {
            return None;
        }
        self.platform_counts
            .iter()
            .max_by(|(pa, ca), (pb, cb)| ca.cmp(cb).then_with(|| pb.cmp(pa)))
            .map(|(&p, &c)| (p, c as f64 / self.mention_count as f64))
    }

    /// Share of mentions from news platforms (news-portal, google-news).
    pub fn news_share(&self) -> f64 {
        if self.mention_count == 0 {
            return 0.0;
        }
        let news: u64 = self
            .platform_counts
            .iter()
            .filter(|(p, _)| p.is_news())
            .map(|(_, &c)| c)
            .sum();
        news as f64 / self.mention_count as f64
    }

    /// Number of distinct platforms with at least one mention.
    pub fn platform_diversity(&self) -> usize {
        self.platform_counts.values().filter(|&&c| c > 0).count()
    }
}

/// Round to one decimal place for external reporting.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Compute the snapshot for the mentions inside `interval`. Mentions outside
/// the interval are ignored; an empty selection yields the zero snapshot.
pub fn aggregate(mentions: &[Mention], interval: TimeInterval) -> AggregateSnapshot {
    let selected: Vec<&Mention> = mentions
        .iter()
        .filter(|m| interval.contains(m.published_at))
        .collect();

    let count = selected.len() as u64;
    if count == 0 {
        return AggregateSnapshot::empty(interval);
    }

    let mut positive = 0u64;
    let mut neutral = 0u64;
    let mut negative = 0u64;
    let mut platform_counts: BTreeMap<Platform, u64> = BTreeMap::new();
    let mut total_engagement = 0u64;

    // Emotion shares are averaged over mentions that carry a distribution,
    // so the output still sums to 100 when some mentions have none.
    let mut emotion_sums: BTreeMap<Emotion, f64> = BTreeMap::new();
    let mut emotion_contributors = 0u64;

    for m in &selected {
        match m.sentiment.label {
            SentimentLabel::Positive => positive += 1,
            SentimentLabel::Neutral => neutral += 1,
            SentimentLabel::Negative => negative += 1,
        }
        *platform_counts.entry(m.platform).or_insert(0) += 1;
        total_engagement += m.engagement.total();

        if !m.emotions.is_empty() {
            emotion_contributors += 1;
            for (&emotion, &share) in &m.emotions {
                *emotion_sums.entry(emotion).or_insert(0.0) += share;
            }
        }
    }

    let share = |n: u64| n as f64 / count as f64 * 100.0;

    let emotions = if emotion_contributors == 0 {
        BTreeMap::new()
    } else {
        emotion_sums
            .into_iter()
            .map(|(e, sum)| (e, sum / emotion_contributors as f64 * 100.0))
            .collect()
    };

    AggregateSnapshot {
        interval,
        mention_count: count,
        sentiment: SentimentBreakdown {
            positive: share(positive),
            neutral: share(neutral),
            negative: share(negative),
        },
        emotions,
        platform_counts,
        total_engagement,
        avg_engagement: total_engagement as f64 / count as f64,
    }
}
