// Mention normalization — the validation boundary for raw ingestion records.
//
// A raw payload is loosely typed (string platform, string timestamp, signed
// counts). Normalization either produces a validated `Mention` or a
// `ValidationError` naming what was wrong. Batch normalization collects
// rejections alongside the successful output so a batch of mostly-valid
// records still yields analytics.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::TopicScope;
use crate::error::ValidationError;
use crate::model::{Emotion, Engagement, Mention, Platform, Sentiment, SentimentLabel};

/// Emotion shares may drift from 1.0 by rounding in the ingestion layer;
/// anything within this band is renormalized, not rejected.
const EMOTION_SUM_EPSILON: f64 = 0.05;

/// A raw mention record as handed over by the ingestion collaborator.
/// Deliberately loose: every field is validated in `normalize`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawMention {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub platform: String,
    #[serde(default)]
    pub author_id: String,
    #[serde(default)]
    pub text: String,
    /// RFC 3339 timestamp, UTC.
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub likes: i64,
    #[serde(default)]
    pub shares: i64,
    #[serde(default)]
    pub comments: i64,
    #[serde(default)]
    pub views: i64,
    /// Sentiment label; missing means neutral.
    #[serde(default)]
    pub sentiment: Option<String>,
    #[serde(default = "default_confidence")]
    pub sentiment_confidence: f64,
    /// Emotion name → share. May be empty.
    #[serde(default)]
    pub emotions: BTreeMap<String, f64>,
    #[serde(default)]
    pub geo: Option<String>,
}

fn default_confidence() -> f64 {
    1.0
}

/// A record that failed validation, reported alongside the batch output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedMention {
    /// Index of the record in the input batch.
    pub index: usize,
    /// The raw id, which may itself be empty or malformed.
    pub id: String,
    pub error: ValidationError,
}

/// Result of normalizing a batch: the valid mentions, the rejections, and
/// the count of records skipped for being outside the topic's platform scope
/// (out-of-scope is not invalid, so those are neither output nor rejected).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NormalizedBatch {
    pub mentions: Vec<Mention>,
    pub rejected: Vec<RejectedMention>,
    pub out_of_scope: usize,
}

/// Validate and canonicalize one raw record. Pure — no side effects beyond
/// producing the value.
pub fn normalize(raw: &RawMention) -> Result<Mention, ValidationError> {
    if raw.id.trim().is_empty() {
        return Err(ValidationError::MissingId);
    }

    let published_at = parse_timestamp(raw.published_at.as_deref())?;

    let platform = Platform::parse(raw.platform.trim())
        .ok_or_else(|| ValidationError::UnknownPlatform(raw.platform.clone()))?;

    let engagement = Engagement {
        likes: non_negative("likes", raw.likes)?,
        shares: non_negative("shares", raw.shares)?,
        comments: non_negative("comments", raw.comments)?,
        views: non_negative("views", raw.views)?,
    };

    if !(0.0..=1.0).contains(&raw.sentiment_confidence) {
        return Err(ValidationError::ConfidenceOutOfRange(
            raw.sentiment_confidence,
        ));
    }
    let label = match raw.sentiment.as_deref() {
        Some(s) => SentimentLabel::parse(s)
            .ok_or_else(|| ValidationError::UnknownSentiment(s.to_string()))?,
        None => SentimentLabel::Neutral,
    };

    let emotions = normalize_emotions(&raw.emotions)?;

    Ok(Mention {
        id: raw.id.trim().to_string(),
        platform,
        author_id: raw.author_id.trim().to_string(),
        text: canonicalize_text(&raw.text),
        published_at,
        engagement,
        sentiment: Sentiment {
            label,
            confidence: raw.sentiment_confidence,
        },
        emotions,
        geo: raw.geo.clone().filter(|g| !g.trim().is_empty()),
    })
}

/// Normalize a batch with partial-failure semantics. Records failing
/// validation are collected in `rejected`; records outside the scope's
/// platform list or keyword rules are counted and skipped.
pub fn normalize_batch(raws: &[RawMention], scope: &TopicScope) -> NormalizedBatch {
    let mut batch = NormalizedBatch::default();

    for (index, raw) in raws.iter().enumerate() {
        match normalize(raw) {
            Ok(mention) => {
                if scope.includes(mention.platform) && scope.matches_text(&mention.text) {
                    batch.mentions.push(mention);
                } else {
                    batch.out_of_scope += 1;
                }
            }
            Err(error) => {
                debug!(index, id = raw.id, %error, "rejected raw mention");
                batch.rejected.push(RejectedMention {
                    index,
                    id: raw.id.clone(),
                    error,
                });
            }
        }
    }

    batch
}

fn parse_timestamp(raw: Option<&str>) -> Result<DateTime<Utc>, ValidationError> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty());
    let raw = raw.ok_or(ValidationError::MissingTimestamp)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ValidationError::UnparsableTimestamp(raw.to_string()))
}

fn non_negative(field: &'static str, value: i64) -> Result<u64, ValidationError> {
    u64::try_from(value).map_err(|_| ValidationError::NegativeEngagement {
        field: field.to_string(),
        value,
    })
}

/// Parse the string-keyed emotion map and clamp rounding drift so the
/// shares sum to exactly 1.0. An empty map stays empty.
fn normalize_emotions(
    raw: &BTreeMap<String, f64>,
) -> Result<BTreeMap<Emotion, f64>, ValidationError> {
    if raw.is_empty() {
        return Ok(BTreeMap::new());
    }

    let mut emotions = BTreeMap::new();
    let mut sum = 0.0;
    for (name, &share) in raw {
        let emotion =
            Emotion::parse(name).ok_or_else(|| ValidationError::UnknownEmotion(name.clone()))?;
        if !(0.0..=1.0).contains(&share) {
            return Err(ValidationError::EmotionShareOutOfRange(share));
        }
        emotions.insert(emotion, share);
        sum += share;
    }

    // All-zero distributions carry no signal; treat as absent.
    if sum <= 0.0 {
        return Ok(BTreeMap::new());
    }

    if (sum - 1.0).abs() > EMOTION_SUM_EPSILON {
        // More than rounding drift — still renormalize rather than reject,
        // since the shape of the distribution is what downstream uses.
        debug!(sum, "emotion shares far from 1.0, renormalizing");
    }
    for share in emotions.values_mut() {
        *share /= sum;
    }

    Ok(emotions)
}

/// Collapse runs of whitespace and trim. Keeps similarity tokenization from
/// seeing formatting artifacts as signal.
fn canonicalize_text(text: &str) -> String {
    static WHITESPACE: OnceLock<Regex> = OnceLock::new();
    let re = WHITESPACE.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    re.replace_all(text.trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_raw() -> RawMention {
        RawMention {
            id: "m-1".to_string(),
            platform: "twitter".to_string(),
            author_id: "a-1".to_string(),
            text: "Great  launch\n\neveryone loves it".to_string(),
            published_at: Some("2026-08-01T12:00:00Z".to_string()),
            likes: 10,
            shares: 2,
            comments: 1,
            views: 500,
            sentiment: Some("positive".to_string()),
            sentiment_confidence: 0.9,
            emotions: BTreeMap::from([("joy".to_string(), 0.7), ("trust".to_string(), 0.3)]),
            geo: Some("Jawa Barat".to_string()),
        }
    }

    #[test]
    fn valid_record_normalizes() {
        let mention = normalize(&valid_raw()).unwrap();
        assert_eq!(mention.platform, Platform::Twitter);
        assert_eq!(mention.sentiment.label, SentimentLabel::Positive);
        assert_eq!(mention.text, "Great launch everyone loves it");
        assert_eq!(mention.engagement.total(), 13);
    }

    #[test]
    fn missing_timestamp_rejected() {
        let mut raw = valid_raw();
        raw.published_at = None;
        assert_eq!(normalize(&raw), Err(ValidationError::MissingTimestamp));

        raw.published_at = Some("  ".to_string());
        assert_eq!(normalize(&raw), Err(ValidationError::MissingTimestamp));
    }

    #[test]
    fn unparsable_timestamp_rejected() {
        let mut raw = valid_raw();
        raw.published_at = Some("last tuesday".to_string());
        assert!(matches!(
            normalize(&raw),
            Err(ValidationError::UnparsableTimestamp(_))
        ));
    }

    #[test]
    fn unknown_platform_rejected() {
        let mut raw = valid_raw();
        raw.platform = "myspace".to_string();
        assert!(matches!(
            normalize(&raw),
            Err(ValidationError::UnknownPlatform(_))
        ));
    }

    #[test]
    fn negative_engagement_rejected() {
        let mut raw = valid_raw();
        raw.shares = -1;
        assert!(matches!(
            normalize(&raw),
            Err(ValidationError::NegativeEngagement { .. })
        ));
    }

    #[test]
    fn confidence_out_of_range_rejected() {
        let mut raw = valid_raw();
        raw.sentiment_confidence = 1.5;
        assert_eq!(
            normalize(&raw),
            Err(ValidationError::ConfidenceOutOfRange(1.5))
        );
    }

    #[test]
    fn emotion_drift_clamped_to_one() {
        let mut raw = valid_raw();
        // Sums to 0.99 — typical rounding drift from the ingestion layer.
        raw.emotions = BTreeMap::from([
            ("joy".to_string(), 0.33),
            ("trust".to_string(), 0.33),
            ("surprise".to_string(), 0.33),
        ]);
        let mention = normalize(&raw).unwrap();
        let sum: f64 = mention.emotions.values().sum();
        assert!((sum - 1.0).abs() < 1e-12, "sum was {sum}");
    }

    #[test]
    fn missing_sentiment_defaults_to_neutral() {
        let mut raw = valid_raw();
        raw.sentiment = None;
        let mention = normalize(&raw).unwrap();
        assert_eq!(mention.sentiment.label, SentimentLabel::Neutral);
    }

    #[test]
    fn batch_collects_rejections_without_aborting() {
        let mut bad = valid_raw();
        bad.id = "m-2".to_string();
        bad.platform = "myspace".to_string();

        let scope = TopicScope::new("brand-a");
        let batch = normalize_batch(&[valid_raw(), bad], &scope);
        assert_eq!(batch.mentions.len(), 1);
        assert_eq!(batch.rejected.len(), 1);
        assert_eq!(batch.rejected[0].index, 1);
        assert_eq!(batch.rejected[0].id, "m-2");
    }

    #[test]
    fn batch_skips_keyword_misses() {
        let mut scope = TopicScope::new("brand-a");
        scope.keywords = vec!["refund".to_string()];

        let batch = normalize_batch(&[valid_raw()], &scope);
        assert!(batch.mentions.is_empty());
        assert_eq!(batch.out_of_scope, 1);
    }

    #[test]
    fn batch_skips_out_of_scope_platforms() {
        let mut scope = TopicScope::new("brand-a");
        scope.platforms = Some(vec![Platform::Instagram]);

        let batch = normalize_batch(&[valid_raw()], &scope);
        assert!(batch.mentions.is_empty());
        assert!(batch.rejected.is_empty());
        assert_eq!(batch.out_of_scope, 1);
    }
}
