// Similarity clustering — groups normalized mentions into review-ready
// clusters by textual overlap and temporal proximity.
//
// Pipeline per run:
//   1. Bucket mentions into fixed time windows to bound comparison cost.
//   2. Compare pairs within the same or adjacent bucket; pairs at or above
//      the similarity threshold merge via union-find (single linkage).
//   3. Materialize each group into a MentionCluster with type, triage
//      priority, centroid sentiment, and a representative summary.
//
// The partition covers every input mention exactly once and does not depend
// on input ordering. Cooperative cancellation is checked between buckets,
// never mid-bucket, and a cancelled call returns no partial result.

pub mod linkage;
pub mod similarity;
pub mod triage;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use crate::config::ClusterConfig;
use crate::error::ClusterError;
use crate::model::{Mention, MentionCluster};
use linkage::UnionFind;

/// Cooperative cancellation handle. Cloned into whatever task owns the
/// clustering call; checked at bucket boundaries only, so partial work is
/// never observable.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Group mentions into clusters. Every input mention appears in exactly one
/// output cluster; mentions with no sufficiently similar peer become
/// singletons. Fails only on malformed configuration or cancellation, never
/// on valid mention data.
pub fn cluster(
    mentions: &[Mention],
    config: &ClusterConfig,
    cancel: &CancelToken,
) -> Result<Vec<MentionCluster>, ClusterError> {
    config.validate()?;

    if mentions.is_empty() {
        return Ok(Vec::new());
    }

    // Process in ascending id order so merge evaluation order — and with it
    // any floating-point accumulation — is identical however the caller
    // ordered the input slice.
    let mut order: Vec<usize> = (0..mentions.len()).collect();
    order.sort_by(|&a, &b| mentions[a].id.cmp(&mentions[b].id));

    let stops = similarity::english_stop_words();
    let tokens: Vec<_> = mentions
        .iter()
        .map(|m| similarity::tokenize(&m.text, &stops))
        .collect();

    // Bucket index → mention indices (in id order), keyed by floored epoch
    // window so bucketing doesn't depend on the input's time range.
    let window_secs = config.window_hours * 3600;
    let mut buckets: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
    for &idx in &order {
        let bucket = mentions[idx].published_at.timestamp().div_euclid(window_secs);
        buckets.entry(bucket).or_default().push(idx);
    }

    let mut uf = UnionFind::new(mentions.len());
    let bucket_keys: Vec<i64> = buckets.keys().copied().collect();

    for &key in &bucket_keys {
        if cancel.is_cancelled() {
            info!(bucket = key, "clustering cancelled at bucket boundary");
            return Err(ClusterError::Cancelled);
        }

        let current = &buckets[&key];

        // Pairs within the bucket.
        for (pos, &i) in current.iter().enumerate() {
            for &j in &current[pos + 1..] {
                merge_if_similar(&mut uf, mentions, &tokens, i, j, config);
            }
        }

        // Pairs spanning into the next adjacent bucket.
        if let Some(next) = buckets.get(&(key + 1)) {
            for &i in current {
                for &j in next {
                    merge_if_similar(&mut uf, mentions, &tokens, i, j, config);
                }
            }
        }
    }

    let groups = uf.groups();
    let mut clusters: Vec<MentionCluster> = groups
        .into_iter()
        .map(|group| materialize(&group, mentions, config))
        .collect();

    // Largest first, then by leading member id: a stable order that does not
    // leak the caller's input ordering.
    clusters.sort_by(|a, b| {
        b.size()
            .cmp(&a.size())
            .then_with(|| a.member_ids[0].cmp(&b.member_ids[0]))
    });

    info!(
        mentions = mentions.len(),
        clusters = clusters.len(),
        "clustering complete"
    );
    Ok(clusters)
}

fn merge_if_similar(
    uf: &mut UnionFind,
    mentions: &[Mention],
    tokens: &[std::collections::BTreeSet<String>],
    i: usize,
    j: usize,
    config: &ClusterConfig,
) {
    let sim = similarity::pair_similarity(
        &tokens[i],
        &tokens[j],
        mentions[i].published_at,
        mentions[j].published_at,
        config.window_hours,
    );
    if sim >= config.similarity_threshold {
        uf.union(i, j);
    }
}

fn materialize(group: &[usize], mentions: &[Mention], config: &ClusterConfig) -> MentionCluster {
    let members: Vec<&Mention> = group.iter().map(|&i| &mentions[i]).collect();

    let signals = triage::compute_signals(&members, &config.campaign_keywords);
    let cluster_type = triage::classify(&signals);
    let priority = triage::triage(&signals);

    let mut member_ids: Vec<String> = members.iter().map(|m| m.id.clone()).collect();
    member_ids.sort();

    // Member timestamps, not wall-clock now(): reruns over the same data
    // produce the same cluster timestamps.
    let created_at = members.iter().map(|m| m.published_at).min().expect("non-empty group");
    let last_updated_at = members.iter().map(|m| m.published_at).max().expect("non-empty group");

    MentionCluster {
        id: Uuid::new_v4(),
        cluster_type,
        summary: triage::representative_summary(&members),
        member_ids,
        centroid_sentiment: triage::centroid_sentiment(&members),
        priority,
        created_at,
        last_updated_at,
    }
}
