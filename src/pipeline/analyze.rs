// Full analysis run over one raw mention batch.
//
// Stage order: validate config, normalize, cluster, aggregate, then score
// author risk when profiles were supplied. Per-record validation failures
// are carried in the report rather than aborting the run; only bad
// configuration or cancellation fails the whole call.

use chrono::Duration;
use tracing::info;

use crate::aggregate::{aggregate, AggregateSnapshot};
use crate::cluster::{cluster, CancelToken};
use crate::config::EngineConfig;
use crate::error::ClusterError;
use crate::model::{MentionCluster, TimeInterval};
use crate::normalize::{normalize_batch, RawMention, RejectedMention};
use crate::risk::{score, AuthorProfile, BotRiskSummary};

/// Everything one analysis run produced, including the records it had to
/// reject.
#[derive(Debug, Clone, serde::Serialize)]
pub struct AnalysisReport {
    pub topic_id: String,
    pub clusters: Vec<MentionCluster>,
    pub snapshot: AggregateSnapshot,
    pub risk: Option<BotRiskSummary>,
    pub rejected: Vec<RejectedMention>,
    pub out_of_scope: usize,
}

/// Run the full pipeline for one topic.
///
/// The aggregate snapshot covers the span of the accepted mentions; an
/// empty batch (nothing valid, nothing in scope) still succeeds with an
/// empty report.
pub fn run(
    raws: &[RawMention],
    authors: &[AuthorProfile],
    config: &EngineConfig,
    cancel: &CancelToken,
) -> Result<AnalysisReport, ClusterError> {
    config.validate()?;

    let batch = normalize_batch(raws, &config.scope);
    info!(
        topic = %config.scope.topic_id,
        accepted = batch.mentions.len(),
        rejected = batch.rejected.len(),
        out_of_scope = batch.out_of_scope,
        "batch normalized"
    );

    let clusters = cluster(&batch.mentions, &config.cluster, cancel)?;

    let snapshot = aggregate(&batch.mentions, batch_interval(&batch.mentions));

    let risk = if authors.is_empty() {
        None
    } else {
        Some(score(authors))
    };

    Ok(AnalysisReport {
        topic_id: config.scope.topic_id.clone(),
        clusters,
        snapshot,
        risk,
        rejected: batch.rejected,
        out_of_scope: batch.out_of_scope,
    })
}

/// Half-open interval spanning the accepted mentions. The end is nudged one
/// second past the latest timestamp so that mention is included.
fn batch_interval(mentions: &[crate::model::Mention]) -> TimeInterval {
    let Some(start) = mentions.iter().map(|m| m.published_at).min() else {
        let epoch = chrono::DateTime::<chrono::Utc>::UNIX_EPOCH;
        return TimeInterval::new(epoch, epoch);
    };
    let end = mentions
        .iter()
        .map(|m| m.published_at)
        .max()
        .unwrap_or(start)
        + Duration::seconds(1);
    TimeInterval::new(start, end)
}
