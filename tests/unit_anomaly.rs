// Unit tests for trend anomaly detection over snapshot series.
//
// Covers warm-up suppression, z-score severity classification, flat-baseline
// handling, and each branch of the root-cause attribution cascade.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use groundswell::aggregate::{AggregateSnapshot, Metric};
use groundswell::anomaly::{detect, RootCause, Severity};
use groundswell::config::AnomalyConfig;
use groundswell::model::{Platform, TimeInterval};
use groundswell::risk::BotRiskSummary;

fn t0() -> DateTime<Utc> {
    "2026-08-01T00:00:00Z".parse().unwrap()
}

/// A snapshot with the given mention volume in the i-th daily bucket.
fn volume_snapshot(i: usize, count: u64) -> AggregateSnapshot {
    let start = t0() + Duration::days(i as i64);
    let mut s = AggregateSnapshot::empty(TimeInterval::new(start, start + Duration::days(1)));
    s.mention_count = count;
    s
}

/// Seven-bucket baseline with mean 100 and sample stddev exactly 10.
fn steady_baseline() -> Vec<AggregateSnapshot> {
    [90, 110, 90, 110, 90, 110, 100]
        .iter()
        .enumerate()
        .map(|(i, &v)| volume_snapshot(i, v))
        .collect()
}

fn flagged_risk() -> BotRiskSummary {
    BotRiskSummary {
        low: 5,
        medium: 2,
        high: 1,
        critical: 1,
        flagged: 2,
    }
}

// ============================================================
// Warm-up and baseline behavior
// ============================================================

#[test]
fn warm_up_buckets_never_emit() {
    // Wild swings, but the series never exceeds the baseline window.
    let series: Vec<AggregateSnapshot> = [5u64, 900, 3, 700, 10, 800, 2]
        .iter()
        .enumerate()
        .map(|(i, &v)| volume_snapshot(i, v))
        .collect();

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        None,
    )
    .unwrap();
    assert!(anomalies.is_empty());
}

#[test]
fn flat_baseline_emits_nothing() {
    let mut series: Vec<AggregateSnapshot> =
        (0..7).map(|i| volume_snapshot(i, 100)).collect();
    series.push(volume_snapshot(7, 100_000));

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        None,
    )
    .unwrap();
    assert!(anomalies.is_empty());
}

#[test]
fn normal_variation_stays_quiet() {
    let mut series = steady_baseline();
    series.push(volume_snapshot(7, 105)); // z = 0.5

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        None,
    )
    .unwrap();
    assert!(anomalies.is_empty());
}

// ============================================================
// Severity
// ============================================================

#[test]
fn four_sigma_spike_is_severe() {
    let mut series = steady_baseline();
    series.push(volume_snapshot(7, 140)); // z = (140 - 100) / 10 = 4.0

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        None,
    )
    .unwrap();

    assert_eq!(anomalies.len(), 1);
    let a = &anomalies[0];
    assert!((a.z_score - 4.0).abs() < 1e-9, "z was {}", a.z_score);
    assert!((a.expected - 100.0).abs() < 1e-9);
    assert_eq!(a.observed, 140.0);
    assert_eq!(a.severity, Severity::Severe);
    assert!(a.is_alertable());
    // No platform data in the series, so no rule matches.
    assert_eq!(a.root_cause, RootCause::Unknown);
}

#[test]
fn moderate_deviation_is_not_alertable() {
    let mut series = steady_baseline();
    series.push(volume_snapshot(7, 125)); // z = 2.5

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        None,
    )
    .unwrap();

    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].severity, Severity::Moderate);
    assert!(!anomalies[0].is_alertable());
}

#[test]
fn negative_deviation_is_detected() {
    let mut series = steady_baseline();
    series.push(volume_snapshot(7, 60)); // z = -4.0

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        None,
    )
    .unwrap();

    assert_eq!(anomalies.len(), 1);
    assert!(anomalies[0].z_score < 0.0);
}

// ============================================================
// Root-cause attribution
// ============================================================

#[test]
fn concentrated_spike_with_flagged_authors_is_bot_amplification() {
    let mut series = steady_baseline();
    let mut spike = volume_snapshot(7, 140);
    spike.platform_counts =
        BTreeMap::from([(Platform::Twitter, 135), (Platform::Instagram, 5)]);
    series.push(spike);

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        Some(&flagged_risk()),
    )
    .unwrap();

    assert_eq!(anomalies[0].root_cause, RootCause::BotAmplification);
}

#[test]
fn concentrated_spike_without_risk_signal_is_not_bot_amplification() {
    let mut series = steady_baseline();
    let mut spike = volume_snapshot(7, 140);
    spike.platform_counts = BTreeMap::from([(Platform::Twitter, 140)]);
    series.push(spike);

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        None,
    )
    .unwrap();

    assert_ne!(anomalies[0].root_cause, RootCause::BotAmplification);
}

#[test]
fn news_led_spike_is_news_cycle() {
    let mut series = steady_baseline();
    let mut spike = volume_snapshot(7, 140);
    spike.platform_counts = BTreeMap::from([
        (Platform::NewsPortal, 50),
        (Platform::GoogleNews, 20),
        (Platform::Twitter, 70),
    ]);
    series.push(spike);

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        None,
    )
    .unwrap();

    assert_eq!(anomalies[0].root_cause, RootCause::NewsCycle);
}

#[test]
fn broad_spike_is_viral_event() {
    let mut series = steady_baseline();
    let mut spike = volume_snapshot(7, 140);
    spike.platform_counts = BTreeMap::from([
        (Platform::Twitter, 50),
        (Platform::Instagram, 45),
        (Platform::Tiktok, 45),
    ]);
    series.push(spike);

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        None,
    )
    .unwrap();

    assert_eq!(anomalies[0].root_cause, RootCause::ViralEvent);
}

#[test]
fn near_silence_against_active_baseline_is_data_gap() {
    let mut series = steady_baseline();
    series.push(volume_snapshot(7, 5)); // z = -9.5, volume ratio 0.05

    let anomalies = detect(
        &series,
        Metric::MentionVolume,
        &AnomalyConfig::default(),
        None,
    )
    .unwrap();

    assert_eq!(anomalies.len(), 1);
    assert_eq!(anomalies[0].root_cause, RootCause::DataGap);
    assert_eq!(anomalies[0].severity, Severity::Severe);
}

// ============================================================
// Configuration
// ============================================================

#[test]
fn too_small_baseline_window_is_rejected() {
    let config = AnomalyConfig {
        baseline_window: 1,
        ..AnomalyConfig::default()
    };
    assert!(detect(&[], Metric::MentionVolume, &config, None).is_err());
}

#[test]
fn inverted_severity_thresholds_are_rejected() {
    let config = AnomalyConfig {
        moderate_z: 3.0,
        severe_z: 2.0,
        ..AnomalyConfig::default()
    };
    assert!(detect(&[], Metric::MentionVolume, &config, None).is_err());
}
