// Colored terminal output for clusters, anomalies, insights, and bot risk.
//
// This module handles all terminal-specific formatting: colors, tables,
// summary footers. The main.rs display paths delegate here.

use colored::Colorize;

use crate::aggregate::AggregateSnapshot;
use crate::anomaly::TrendAnomaly;
use crate::insight::{ComparisonInsight, InsightType};
use crate::model::{MentionCluster, SentimentLabel, TriagePriority};
use crate::risk::BotRiskSummary;

/// Display clusters ranked as the engine emitted them (largest first).
pub fn display_cluster_list(clusters: &[MentionCluster]) {
    if clusters.is_empty() {
        println!("No clusters produced. The input batch may be empty or out of scope.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Cluster Report ({} clusters) ===", clusters.len()).bold()
    );
    println!();

    // Header
    println!(
        "  {:>4}  {:<22} {:<8}  {:>5}  {:>9}  {}",
        "Rank".dimmed(),
        "Type".dimmed(),
        "Priority".dimmed(),
        "Size".dimmed(),
        "Sentiment".dimmed(),
        "Summary".dimmed(),
    );
    println!("  {}", "-".repeat(96).dimmed());

    for (i, cluster) in clusters.iter().enumerate() {
        println!(
            "  {:>4}. {:<22} {:<8}  {:>5}  {:>9}  {}",
            i + 1,
            cluster.cluster_type.as_str(),
            colorize_priority(cluster.priority),
            cluster.size(),
            colorize_sentiment(cluster.centroid_label()),
            super::truncate_chars(&cluster.summary, 60).dimmed(),
        );
    }

    println!();

    // Summary footer
    let urgent = clusters
        .iter()
        .filter(|c| c.priority == TriagePriority::Urgent)
        .count();
    let high = clusters
        .iter()
        .filter(|c| c.priority == TriagePriority::High)
        .count();

    if urgent > 0 {
        println!("  {} {} urgent clusters", "!!".red().bold(), urgent);
    }
    if high > 0 {
        println!("  {} {} high-priority clusters", "!".bright_red(), high);
    }
}

/// Display the aggregate snapshot for a run, one-decimal shares.
pub fn display_snapshot(snapshot: &AggregateSnapshot) {
    if snapshot.mention_count == 0 {
        println!("No mentions in the analyzed interval.");
        return;
    }
    let s = snapshot.rounded();

    println!("\n{}", format!("=== Aggregates ({} mentions) ===", s.mention_count).bold());
    println!();
    println!(
        "  Sentiment: {} {:.1}%  {} {:.1}%  {} {:.1}%",
        "positive".green(),
        s.sentiment.positive,
        "neutral".dimmed(),
        s.sentiment.neutral,
        "negative".red(),
        s.sentiment.negative,
    );
    println!(
        "  Engagement: {} total, {:.1} per mention",
        s.total_engagement, s.avg_engagement
    );
    if let Some((platform, share)) = s.dominant_platform() {
        println!("  Leading platform: {} ({:.0}%)", platform, share * 100.0);
    }
    if !s.emotions.is_empty() {
        let shares: Vec<String> = s
            .emotions
            .iter()
            .map(|(e, share)| format!("{e} {share:.1}%"))
            .collect();
        println!("  Emotions: {}", shares.join("  "));
    }
    println!();
}

/// Display detected anomalies with their attributed root cause.
pub fn display_anomalies(anomalies: &[TrendAnomaly]) {
    if anomalies.is_empty() {
        println!("No anomalies detected in this series.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Anomaly Report ({} anomalies) ===", anomalies.len()).bold()
    );
    println!();

    for anomaly in anomalies {
        let severity = if anomaly.is_alertable() {
            anomaly.severity.as_str().red().bold()
        } else {
            anomaly.severity.as_str().yellow()
        };
        println!(
            "  [{}] {}  z={:+.2}  observed {:.1} vs expected {:.1}  cause: {}",
            severity,
            anomaly.bucket.start.format("%Y-%m-%d %H:%M"),
            anomaly.z_score,
            anomaly.observed,
            anomaly.expected,
            anomaly.root_cause.as_str().cyan(),
        );
    }
    println!();
}

/// Display comparison insights in their ranked order.
pub fn display_insights(insights: &[ComparisonInsight]) {
    if insights.is_empty() {
        println!("No significant differences between the two snapshots.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Comparison ({} insights) ===", insights.len()).bold()
    );
    println!();

    for insight in insights {
        let marker = match insight.insight_type {
            InsightType::Improvement => "+".green().bold(),
            InsightType::Decline => "-".red().bold(),
            InsightType::Observation => "~".yellow(),
            InsightType::Recommendation => ">".cyan().bold(),
        };
        println!("  {} {}", marker, insight.message);
    }
    println!();
}

/// Display the bot risk tier distribution for a scored author set.
pub fn display_risk_summary(summary: &BotRiskSummary) {
    if summary.total() == 0 {
        println!("No authors scored.");
        return;
    }

    println!(
        "\n{}",
        format!("=== Bot Risk ({} authors) ===", summary.total()).bold()
    );
    println!();
    println!("  {:<10} {}", "critical".red().bold(), summary.critical);
    println!("  {:<10} {}", "high".bright_red(), summary.high);
    println!("  {:<10} {}", "medium".yellow(), summary.medium);
    println!("  {:<10} {}", "low".green(), summary.low);
    println!();

    if summary.has_elevated_tiers() {
        println!(
            "  {} {} flagged accounts (high or critical)",
            "!!".red().bold(),
            summary.flagged
        );
    }
}

/// Colorize a triage priority for table display.
fn colorize_priority(priority: TriagePriority) -> colored::ColoredString {
    match priority {
        TriagePriority::Urgent => priority.as_str().red().bold(),
        TriagePriority::High => priority.as_str().bright_red(),
        TriagePriority::Normal => priority.as_str().yellow(),
        TriagePriority::Low => priority.as_str().green(),
    }
}

fn colorize_sentiment(label: SentimentLabel) -> colored::ColoredString {
    match label {
        SentimentLabel::Positive => label.as_str().green(),
        SentimentLabel::Neutral => label.as_str().dimmed(),
        SentimentLabel::Negative => label.as_str().red(),
    }
}
