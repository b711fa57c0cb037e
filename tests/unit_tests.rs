// Unit tests for the reconciler and ranking stages

mod common;

use buddy_match::core::{
    fallback_starters, rank_matches, reconcile_matches, reconcile_starters, RawReply,
    RecordingObserver, ReconcileEvent, TracingObserver,
};
use buddy_match::models::{EnrichedMatch, MatchingRules};
use common::{pool, profile};
use serde_json::json;

fn reconcile_and_rank(raw: &str, pool_size: usize) -> Vec<EnrichedMatch> {
    let rules = MatchingRules::default();
    let matches = reconcile_matches(&RawReply::new(raw), &pool(pool_size), &rules, &TracingObserver)
        .expect("reply should parse");
    rank_matches(matches, rules.max_results)
}

#[test]
fn test_scenario_threshold_drops_low_scores() {
    let raw = r#"{"matches": [
        {"candidateIndex": 0, "score": 90, "reason": "Both into math"},
        {"candidateIndex": 2, "score": 40, "reason": "Weak overlap"}
    ]}"#;

    let matches = reconcile_and_rank(raw, 3);

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].user_id, "user-0");
    assert_eq!(matches[0].match_score, 90);
    assert_eq!(matches[0].match_reason, "Both into math");
}

#[test]
fn test_scenario_score_above_range_clamped() {
    let observer = RecordingObserver::new();
    let raw = RawReply::new(r#"{"matches": [{"candidateIndex": 1, "score": 137, "reason": "Perfect"}]}"#);

    let matches = reconcile_matches(&raw, &pool(2), &MatchingRules::default(), &observer).unwrap();

    assert_eq!(matches[0].match_score, 100);
    assert!(observer.events().contains(&ReconcileEvent::ScoreClamped { index: 1, from: 137.0, to: 100 }));
}

#[test]
fn test_scores_always_in_range_and_above_threshold() {
    let scores = [-1000.0, -1.0, 0.0, 49.0, 49.99, 50.0, 50.4, 77.7, 100.0, 100.5, 250.0, 1e12];
    let entries: Vec<_> = scores
        .iter()
        .enumerate()
        .map(|(i, s)| json!({ "candidateIndex": i, "score": s, "reason": "r" }))
        .collect();
    let raw = json!({ "matches": entries }).to_string();

    let matches = reconcile_and_rank(&raw, scores.len());

    assert_eq!(matches.len(), 7);
    for m in &matches {
        assert!(m.match_score >= 50 && m.match_score <= 100, "score {} out of range", m.match_score);
    }
}

#[test]
fn test_output_sorted_and_truncated() {
    let entries: Vec<_> = (0..40)
        .map(|i| json!({ "candidateIndex": i, "score": 50 + (i * 7) % 51, "reason": "r" }))
        .collect();
    let raw = json!({ "matches": entries }).to_string();

    let matches = reconcile_and_rank(&raw, 40);

    assert_eq!(matches.len(), 20);
    for pair in matches.windows(2) {
        assert!(pair[0].match_score >= pair[1].match_score, "matches not sorted by score");
    }
}

#[test]
fn test_ties_keep_pool_order() {
    let raw = r#"{"matches": [
        {"candidateIndex": 3, "score": 70},
        {"candidateIndex": 1, "score": 70},
        {"candidateIndex": 2, "score": 95}
    ]}"#;

    let matches = reconcile_and_rank(raw, 4);
    let ids: Vec<_> = matches.iter().map(|m| m.user_id.as_str()).collect();

    assert_eq!(ids, vec!["user-2", "user-1", "user-3"]);
}

#[test]
fn test_out_of_range_indices_never_appear() {
    let raw = r#"{"matches": [
        {"candidateIndex": 3, "score": 99},
        {"candidateIndex": 100, "score": 99},
        {"candidateIndex": -2, "score": 99},
        {"candidateIndex": null, "score": 99},
        {"candidateIndex": 1, "score": 80}
    ]}"#;

    let matches = reconcile_and_rank(raw, 3);

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].user_id, "user-1");
}

#[test]
fn test_no_duplicate_user_ids() {
    let raw = r#"{"matches": [
        {"candidateIndex": 0, "score": 60},
        {"candidateIndex": 0, "score": 85},
        {"candidateIndex": 1, "score": 70},
        {"candidateIndex": 0, "score": 75}
    ]}"#;

    let matches = reconcile_and_rank(raw, 2);

    assert_eq!(matches.len(), 2);
    assert_eq!(matches[0].user_id, "user-0");
    assert_eq!(matches[0].match_score, 75);
    assert_eq!(matches[1].user_id, "user-1");
}

#[test]
fn test_reconcile_is_idempotent() {
    let raw = "```json\n{\"matches\": [{\"candidateIndex\": 1, \"score\": 66.6}, {\"candidateIndex\": 0, \"score\": 91, \"reason\": \"Great fit\"}]}\n```";

    let first = reconcile_and_rank(raw, 2);
    let second = reconcile_and_rank(raw, 2);

    assert_eq!(first, second);
    assert_eq!(first[0].match_score, 91);
    assert_eq!(first[1].match_score, 67);
}

#[test]
fn test_garbled_match_reply_is_an_error() {
    let result = reconcile_matches(
        &RawReply::new("I think User 0 is a great match!"),
        &pool(3),
        &MatchingRules::default(),
        &TracingObserver,
    );

    let failure = result.unwrap_err();
    assert_eq!(failure.raw, "I think User 0 is a great match!");
}

#[test]
fn test_garbled_starter_reply_falls_back() {
    let target = profile("t", "Grace", &["compilers"]);
    let observer = RecordingObserver::new();

    let starters = reconcile_starters(
        &RawReply::new("I think User 0 is a great match!"),
        &target,
        &MatchingRules::default(),
        &observer,
    );

    assert_eq!(starters.len(), 4);
    assert_eq!(starters, fallback_starters("Grace"));
    assert!(starters[0].contains("Grace"));
    assert!(observer
        .events()
        .iter()
        .any(|e| matches!(e, ReconcileEvent::StarterFallback { .. })));
}
