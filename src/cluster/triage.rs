// Cluster classification and triage priority.
//
// Both assignments work from the same per-cluster signals (size, author
// diversity, negative-sentiment share, engagement velocity, campaign keyword
// share). The thresholds are fixed constants rather than per-call knobs so
// two runs over the same mentions always triage identically.

use crate::model::{ClusterType, Mention, SentimentLabel, TriagePriority};
use crate::output::truncate_chars;

/// Engagement per hour at which a cluster reads as a viral spike.
const VIRAL_VELOCITY_PER_HOUR: f64 = 500.0;

/// Velocity at which a viral cluster escalates straight to urgent.
const URGENT_VELOCITY_PER_HOUR: f64 = 2000.0;

/// Minimum members before the coordinated-campaign heuristic applies —
/// below this, low author diversity is just one person posting twice.
const CAMPAIGN_MIN_SIZE: usize = 5;

/// Unique-author ratio at or below which a cluster looks coordinated.
const CAMPAIGN_AUTHOR_DIVERSITY_MAX: f64 = 0.5;

/// Share of members matching configured campaign terms that marks a
/// campaign regardless of author diversity.
const CAMPAIGN_KEYWORD_SHARE: f64 = 0.5;

/// Negative-sentiment share at or above which a cluster is a complaint
/// thread (and escalates triage).
const COMPLAINT_NEGATIVE_SHARE: f64 = 0.6;

/// Size thresholds for triage priority.
const URGENT_SIZE: usize = 50;
const HIGH_SIZE: usize = 20;
const ESCALATED_COMPLAINT_SIZE: usize = 5;

/// Character budget for the representative summary text.
const SUMMARY_MAX_CHARS: usize = 140;

/// Signals computed once per cluster and shared by type classification and
/// triage priority.
#[derive(Debug, Clone, Copy)]
pub struct ClusterSignals {
    pub size: usize,
    /// Unique authors / size, in (0, 1].
    pub author_diversity: f64,
    /// Share of members labeled negative.
    pub negative_share: f64,
    /// Total member engagement divided by the cluster's time span (floored
    /// at one hour so instantaneous bursts don't divide by zero).
    pub engagement_velocity: f64,
    /// Share of members whose text matches a configured campaign term.
    pub campaign_keyword_share: f64,
}

pub fn compute_signals(members: &[&Mention], campaign_keywords: &[String]) -> ClusterSignals {
    let size = members.len();

    let unique_authors = members
        .iter()
        .map(|m| m.author_id.as_str())
        .collect::<std::collections::HashSet<_>>()
        .len();

    let negative = members
        .iter()
        .filter(|m| m.sentiment.label == SentimentLabel::Negative)
        .count();

    let total_engagement: u64 = members.iter().map(|m| m.engagement.total()).sum();
    let span_hours = match (
        members.iter().map(|m| m.published_at).min(),
        members.iter().map(|m| m.published_at).max(),
    ) {
        (Some(first), Some(last)) => ((last - first).num_seconds() as f64 / 3600.0).max(1.0),
        _ => 1.0,
    };

    let keyword_hits = if campaign_keywords.is_empty() {
        0
    } else {
        members
            .iter()
            .filter(|m| {
                let lower = m.text.to_lowercase();
                campaign_keywords.iter().any(|k| lower.contains(k.as_str()))
            })
            .count()
    };

    ClusterSignals {
        size,
        author_diversity: if size == 0 {
            1.0
        } else {
            unique_authors as f64 / size as f64
        },
        negative_share: if size == 0 {
            0.0
        } else {
            negative as f64 / size as f64
        },
        engagement_velocity: total_engagement as f64 / span_hours,
        campaign_keyword_share: if size == 0 {
            0.0
        } else {
            keyword_hits as f64 / size as f64
        },
    }
}

/// Assign the cluster type. Rules are checked in fixed priority order
/// (viral-spike > coordinated-campaign > complaint-thread >
/// routine-discussion) so a cluster matching several reads as the most
/// actionable one.
pub fn classify(signals: &ClusterSignals) -> ClusterType {
    if signals.engagement_velocity >= VIRAL_VELOCITY_PER_HOUR {
        return ClusterType::ViralSpike;
    }
    if signals.size >= CAMPAIGN_MIN_SIZE
        && (signals.author_diversity <= CAMPAIGN_AUTHOR_DIVERSITY_MAX
            || signals.campaign_keyword_share >= CAMPAIGN_KEYWORD_SHARE)
    {
        return ClusterType::CoordinatedCampaign;
    }
    if signals.negative_share >= COMPLAINT_NEGATIVE_SHARE {
        return ClusterType::ComplaintThread;
    }
    ClusterType::RoutineDiscussion
}

/// Assign triage priority from size, negative share, and velocity.
pub fn triage(signals: &ClusterSignals) -> TriagePriority {
    let hot = signals.negative_share >= COMPLAINT_NEGATIVE_SHARE;

    if signals.engagement_velocity >= URGENT_VELOCITY_PER_HOUR
        || (signals.size >= URGENT_SIZE && hot)
    {
        return TriagePriority::Urgent;
    }
    if signals.size >= HIGH_SIZE
        || signals.engagement_velocity >= VIRAL_VELOCITY_PER_HOUR
        || (hot && signals.size >= ESCALATED_COMPLAINT_SIZE)
    {
        return TriagePriority::High;
    }
    if signals.size >= 2 {
        return TriagePriority::Normal;
    }
    TriagePriority::Low
}

/// Confidence-weighted mean of member sentiment in [-1, 1]. Zero-confidence
/// members contribute nothing; an all-zero-confidence cluster is neutral.
pub fn centroid_sentiment(members: &[&Mention]) -> f64 {
    let weight: f64 = members.iter().map(|m| m.sentiment.confidence).sum();
    if weight <= 0.0 {
        return 0.0;
    }
    let weighted: f64 = members
        .iter()
        .map(|m| m.sentiment.label.signum() * m.sentiment.confidence)
        .sum();
    weighted / weight
}

/// The representative summary: text of the highest-engagement member,
/// ties broken by ascending mention id for determinism.
pub fn representative_summary(members: &[&Mention]) -> String {
    let representative = members
        .iter()
        .max_by(|a, b| {
            a.engagement
                .total()
                .cmp(&b.engagement.total())
                // max_by keeps the later of equals, so compare ids reversed
                // to make the smallest id win ties.
                .then_with(|| b.id.cmp(&a.id))
        })
        .map(|m| m.text.as_str())
        .unwrap_or_default();
    truncate_chars(representative, SUMMARY_MAX_CHARS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Engagement, Platform, Sentiment};
    use chrono::{DateTime, Duration, Utc};
    use std::collections::BTreeMap;

    fn t0() -> DateTime<Utc> {
        "2026-08-01T00:00:00Z".parse().unwrap()
    }

    fn mention(id: &str, author: &str, label: SentimentLabel, likes: u64) -> Mention {
        Mention {
            id: id.to_string(),
            platform: Platform::Twitter,
            author_id: author.to_string(),
            text: format!("mention text {id}"),
            published_at: t0(),
            engagement: Engagement {
                likes,
                ..Engagement::default()
            },
            sentiment: Sentiment {
                label,
                confidence: 0.9,
            },
            emotions: BTreeMap::new(),
            geo: None,
        }
    }

    #[test]
    fn high_velocity_is_viral_spike() {
        let members: Vec<Mention> = (0..3)
            .map(|i| {
                mention(
                    &format!("m{i}"),
                    &format!("a{i}"),
                    SentimentLabel::Positive,
                    400,
                )
            })
            .collect();
        let refs: Vec<&Mention> = members.iter().collect();
        let signals = compute_signals(&refs, &[]);
        assert!(signals.engagement_velocity >= 500.0);
        assert_eq!(classify(&signals), ClusterType::ViralSpike);
    }

    #[test]
    fn low_author_diversity_is_campaign() {
        // Six mentions from two authors, modest engagement.
        let members: Vec<Mention> = (0..6)
            .map(|i| {
                mention(
                    &format!("m{i}"),
                    if i % 2 == 0 { "a0" } else { "a1" },
                    SentimentLabel::Neutral,
                    2,
                )
            })
            .collect();
        let refs: Vec<&Mention> = members.iter().collect();
        let signals = compute_signals(&refs, &[]);
        assert_eq!(classify(&signals), ClusterType::CoordinatedCampaign);
    }

    #[test]
    fn campaign_keywords_mark_campaign() {
        let mut members: Vec<Mention> = (0..6)
            .map(|i| {
                mention(
                    &format!("m{i}"),
                    &format!("a{i}"),
                    SentimentLabel::Neutral,
                    2,
                )
            })
            .collect();
        for m in members.iter_mut().take(4) {
            m.text = "boycott the brand now".to_string();
        }
        let refs: Vec<&Mention> = members.iter().collect();
        let signals = compute_signals(&refs, &["boycott".to_string()]);
        assert!(signals.campaign_keyword_share >= 0.5);
        assert_eq!(classify(&signals), ClusterType::CoordinatedCampaign);
    }

    #[test]
    fn negative_majority_is_complaint_thread() {
        let members: Vec<Mention> = (0..4)
            .map(|i| {
                mention(
                    &format!("m{i}"),
                    &format!("a{i}"),
                    if i < 3 {
                        SentimentLabel::Negative
                    } else {
                        SentimentLabel::Neutral
                    },
                    3,
                )
            })
            .collect();
        let refs: Vec<&Mention> = members.iter().collect();
        let signals = compute_signals(&refs, &[]);
        assert_eq!(classify(&signals), ClusterType::ComplaintThread);
    }

    #[test]
    fn quiet_diverse_cluster_is_routine() {
        let members: Vec<Mention> = (0..3)
            .map(|i| {
                mention(
                    &format!("m{i}"),
                    &format!("a{i}"),
                    SentimentLabel::Positive,
                    5,
                )
            })
            .collect();
        let refs: Vec<&Mention> = members.iter().collect();
        let signals = compute_signals(&refs, &[]);
        assert_eq!(classify(&signals), ClusterType::RoutineDiscussion);
        assert_eq!(triage(&signals), TriagePriority::Normal);
    }

    #[test]
    fn singleton_is_low_priority() {
        let m = mention("m0", "a0", SentimentLabel::Neutral, 1);
        let refs = vec![&m];
        let signals = compute_signals(&refs, &[]);
        assert_eq!(triage(&signals), TriagePriority::Low);
    }

    #[test]
    fn hot_complaint_cluster_escalates_to_high() {
        let members: Vec<Mention> = (0..8)
            .map(|i| {
                mention(
                    &format!("m{i}"),
                    &format!("a{i}"),
                    SentimentLabel::Negative,
                    3,
                )
            })
            .collect();
        let refs: Vec<&Mention> = members.iter().collect();
        let signals = compute_signals(&refs, &[]);
        assert_eq!(triage(&signals), TriagePriority::High);
    }

    #[test]
    fn extreme_velocity_is_urgent() {
        let members: Vec<Mention> = (0..3)
            .map(|i| {
                mention(
                    &format!("m{i}"),
                    &format!("a{i}"),
                    SentimentLabel::Negative,
                    1000,
                )
            })
            .collect();
        let refs: Vec<&Mention> = members.iter().collect();
        let signals = compute_signals(&refs, &[]);
        assert_eq!(triage(&signals), TriagePriority::Urgent);
    }

    #[test]
    fn centroid_weighted_by_confidence() {
        let mut pos = mention("m0", "a0", SentimentLabel::Positive, 0);
        pos.sentiment.confidence = 0.9;
        let mut neg = mention("m1", "a1", SentimentLabel::Negative, 0);
        neg.sentiment.confidence = 0.1;
        let refs = vec![&pos, &neg];
        let centroid = centroid_sentiment(&refs);
        // (0.9 - 0.1) / 1.0 = 0.8
        assert!((centroid - 0.8).abs() < 1e-12);
    }

    #[test]
    fn summary_picks_highest_engagement_with_id_tiebreak() {
        let mut a = mention("m-b", "a0", SentimentLabel::Neutral, 10);
        a.text = "loser by id".to_string();
        let mut b = mention("m-a", "a1", SentimentLabel::Neutral, 10);
        b.text = "winner by id".to_string();
        let mut c = mention("m-c", "a2", SentimentLabel::Neutral, 2);
        c.text = "low engagement".to_string();

        let refs = vec![&a, &b, &c];
        assert_eq!(representative_summary(&refs), "winner by id");
    }

    #[test]
    fn span_floor_prevents_velocity_blowup() {
        let mut members: Vec<Mention> = (0..2)
            .map(|i| {
                mention(
                    &format!("m{i}"),
                    &format!("a{i}"),
                    SentimentLabel::Neutral,
                    10,
                )
            })
            .collect();
        members[1].published_at = t0() + Duration::seconds(30);
        let refs: Vec<&Mention> = members.iter().collect();
        let signals = compute_signals(&refs, &[]);
        // 20 engagement over a floored 1-hour span, not 30 seconds.
        assert!((signals.engagement_velocity - 20.0).abs() < 1e-12);
    }
}
