// Pairwise mention similarity: token Jaccard overlap combined with a
// temporal proximity decay.
//
// The similarity function is symmetric, bounded in [0, 1], and depends only
// on its inputs, so clustering runs are reproducible. Token sets are
// computed once per mention and reused across all pair comparisons.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};

/// Tokens shorter than this carry no topical signal.
const MIN_TOKEN_LEN: usize = 3;

/// English stop words from the stop-words crate, collected once per
/// clustering call and shared across tokenizations.
pub fn english_stop_words() -> HashSet<String> {
    stop_words::get(stop_words::LANGUAGE::English)
        .into_iter()
        .collect()
}

/// Lowercase, strip punctuation from token edges, drop short tokens and
/// stop words. Returns an ordered set so downstream iteration is stable.
pub fn tokenize(text: &str, stops: &HashSet<String>) -> BTreeSet<String> {
    text.split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|token| token.chars().count() >= MIN_TOKEN_LEN && !stops.contains(token))
        .collect()
}

/// Plain Jaccard overlap of two token sets: |a ∩ b| / |a ∪ b|.
/// Returns 0.0 when either side is empty.
pub fn token_jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Temporal proximity decay: 1.0 for simultaneous posts, falling
/// exponentially with the gap. At one full bucket window apart the decay is
/// e^(-0.5) ≈ 0.61, so near-identical text still clusters within a window
/// but drifts apart beyond it.
pub fn temporal_decay(a: DateTime<Utc>, b: DateTime<Utc>, window_hours: i64) -> f64 {
    let gap_hours = (a - b).num_seconds().abs() as f64 / 3600.0;
    (-gap_hours / (2.0 * window_hours as f64)).exp()
}

/// Combined pair similarity: textual overlap attenuated by temporal
/// distance. Bounded in [0, 1] and symmetric in its arguments.
pub fn pair_similarity(
    tokens_a: &BTreeSet<String>,
    tokens_b: &BTreeSet<String>,
    at_a: DateTime<Utc>,
    at_b: DateTime<Utc>,
    window_hours: i64,
) -> f64 {
    let textual = token_jaccard(tokens_a, tokens_b);
    if textual == 0.0 {
        return 0.0;
    }
    (textual * temporal_decay(at_a, at_b, window_hours)).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn t0() -> DateTime<Utc> {
        "2026-08-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn tokenize_strips_stops_and_punctuation() {
        let stops = english_stop_words();
        let tokens = tokenize("The product launch was AMAZING!!", &stops);
        assert!(tokens.contains("product"));
        assert!(tokens.contains("launch"));
        assert!(tokens.contains("amazing"));
        assert!(!tokens.contains("the"));
        assert!(!tokens.contains("was"));
    }

    #[test]
    fn identical_sets_score_one() {
        let stops = english_stop_words();
        let a = tokenize("battery overheating complaint support ticket", &stops);
        let b = tokenize("battery overheating complaint support ticket", &stops);
        assert!((token_jaccard(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn disjoint_sets_score_zero() {
        let stops = english_stop_words();
        let a = tokenize("battery overheating complaint", &stops);
        let b = tokenize("delicious ramen restaurant", &stops);
        assert_eq!(token_jaccard(&a, &b), 0.0);
    }

    #[test]
    fn empty_side_scores_zero() {
        let a = BTreeSet::new();
        let b: BTreeSet<String> = ["battery".to_string()].into();
        assert_eq!(token_jaccard(&a, &b), 0.0);
    }

    #[test]
    fn jaccard_is_symmetric() {
        let stops = english_stop_words();
        let a = tokenize("battery overheating complaint support", &stops);
        let b = tokenize("battery overheating praise support", &stops);
        assert_eq!(token_jaccard(&a, &b), token_jaccard(&b, &a));
    }

    #[test]
    fn decay_is_one_at_zero_gap() {
        assert!((temporal_decay(t0(), t0(), 6) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn decay_falls_with_gap() {
        let near = temporal_decay(t0(), t0() + Duration::hours(1), 6);
        let far = temporal_decay(t0(), t0() + Duration::hours(6), 6);
        assert!(near > far);
        assert!(far > 0.0);
        // One full window apart: e^(-0.5)
        assert!((far - (-0.5f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn pair_similarity_combines_both_signals() {
        let stops = english_stop_words();
        let a = tokenize("battery overheating complaint support ticket filed", &stops);
        let b = tokenize("battery overheating complaint support ticket filed", &stops);

        let same_time = pair_similarity(&a, &b, t0(), t0(), 6);
        assert!((same_time - 1.0).abs() < 1e-12);

        let hour_apart = pair_similarity(&a, &b, t0(), t0() + Duration::hours(1), 6);
        assert!(hour_apart < same_time);
        assert!(hour_apart > 0.9);
    }
}
