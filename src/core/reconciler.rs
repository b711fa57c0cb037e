//! Turns untrusted model text into validated, store-backed results.
//!
//! The model reply is only ever handled as a [`RawReply`] until it has been
//! parsed into a [`MatchReply`] or [`StarterReply`]. Anything that references
//! a candidate goes through the [`CandidatePool`]; identity and profile
//! content always come from the store, the model only contributes score and
//! reason.

use crate::core::observer::{Pipeline, ReconcileEvent, ReconcileObserver};
use crate::core::ranking::clamp_score;
use crate::models::{CandidatePool, EnrichedMatch, MatchingRules, UserProfile};
use serde::de::IgnoredAny;
use serde_json::Value;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use thiserror::Error;

pub const DEFAULT_REASON: &str = "Similar interests and study goals";

const FENCE: &str = "```";

/// Model output exactly as received
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReply(String);

impl RawReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reply text with any surrounding code fence removed
    pub fn normalized(&self) -> &str {
        normalize(&self.0)
    }

    fn parse_json(&self) -> Result<Value, ParseFailure> {
        serde_json::from_str(self.normalized()).map_err(|e| self.failure(e.to_string()))
    }

    fn failure(&self, detail: impl Into<String>) -> ParseFailure {
        ParseFailure {
            detail: detail.into(),
            raw: self.0.clone(),
        }
    }
}

/// The reply could not be read as the expected structure
#[derive(Debug, Clone, PartialEq, Error)]
#[error("unparseable model reply: {detail}")]
pub struct ParseFailure {
    pub detail: String,
    pub raw: String,
}

/// Strip a markdown code fence (with optional language tag) and trim.
///
/// Text that is already valid JSON is returned as is, so backticks inside
/// string values never count as a fence. Otherwise the body runs from the
/// first fence to the last one.
pub fn normalize(text: &str) -> &str {
    let trimmed = text.trim();
    if serde_json::from_str::<IgnoredAny>(trimmed).is_ok() {
        return trimmed;
    }
    let Some(open) = trimmed.find(FENCE) else {
        return trimmed;
    };

    let after_open = &trimmed[open + FENCE.len()..];
    let body = after_open.trim_start_matches(|c: char| c.is_ascii_alphanumeric());
    match body.rfind(FENCE) {
        Some(close) => body[..close].trim(),
        None => body.trim(),
    }
}

/// One entry of the model's match list, not yet checked against the pool
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchCandidate {
    pub candidate_index: Option<i64>,
    pub score: Option<f64>,
    pub reason: Option<String>,
}

impl MatchCandidate {
    fn from_value(value: &Value) -> Self {
        Self {
            candidate_index: value.get("candidateIndex").and_then(as_index),
            score: value.get("score").and_then(as_score),
            reason: value
                .get("reason")
                .and_then(|r| r.as_str())
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
        }
    }
}

fn as_index(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn as_score(value: &Value) -> Option<f64> {
    let score = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }?;
    score.is_finite().then_some(score)
}

/// Structurally valid matchmaking reply
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchReply {
    pub candidates: Vec<MatchCandidate>,
}

impl MatchReply {
    /// Accepts `{"matches": [...]}` or a bare array of match objects.
    pub fn parse(raw: &RawReply) -> Result<Self, ParseFailure> {
        let value = raw.parse_json()?;
        let entries = match &value {
            Value::Object(map) => map
                .get("matches")
                .and_then(|m| m.as_array())
                .ok_or_else(|| raw.failure("expected a \"matches\" array"))?,
            Value::Array(entries) => entries,
            _ => return Err(raw.failure("expected a JSON object")),
        };

        Ok(Self {
            candidates: entries.iter().map(MatchCandidate::from_value).collect(),
        })
    }
}

/// Structurally valid starter reply
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StarterReply {
    pub starters: Vec<String>,
}

impl StarterReply {
    /// Accepts `{"starters": [...]}` or a bare array; non-string and blank
    /// entries are dropped.
    pub fn parse(raw: &RawReply) -> Result<Self, ParseFailure> {
        let value = raw.parse_json()?;
        let entries = match &value {
            Value::Object(map) => map
                .get("starters")
                .and_then(|s| s.as_array())
                .ok_or_else(|| raw.failure("expected a \"starters\" array"))?,
            Value::Array(entries) => entries,
            _ => return Err(raw.failure("expected a JSON object")),
        };

        let starters = entries
            .iter()
            .filter_map(|s| s.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self { starters })
    }
}

/// Generic starters used whenever the model reply is unusable
pub fn fallback_starters(target_name: &str) -> Vec<String> {
    vec![
        format!("Hey {}! Want to study together?", target_name),
        "I saw we share some interests. Want to collaborate?".to_string(),
        "Looking for a study buddy - interested?".to_string(),
        "Would love to learn from you!".to_string(),
    ]
}

/// Validate a matchmaking reply against the pool.
///
/// Returns the surviving matches in pool order; ranking happens afterwards.
/// Bad entries are skipped one by one, only a structurally unreadable reply
/// fails as a whole. When the model repeats a candidate the last entry wins.
///
/// Because survivors come out in pool order, the stable sort in ranking
/// breaks score ties by candidate position, not by the order in which the
/// model listed its entries.
pub fn reconcile_matches(
    raw: &RawReply,
    pool: &CandidatePool,
    rules: &MatchingRules,
    observer: &dyn ReconcileObserver,
) -> Result<Vec<EnrichedMatch>, ParseFailure> {
    let reply = MatchReply::parse(raw).map_err(|failure| {
        observer.observe(ReconcileEvent::UnparseableReply {
            pipeline: Pipeline::Matchmaking,
            detail: failure.detail.clone(),
            raw: failure.raw.clone(),
        });
        failure
    })?;

    let mut resolved: BTreeMap<usize, MatchCandidate> = BTreeMap::new();
    for (entry, candidate) in reply.candidates.into_iter().enumerate() {
        let Some(index) = candidate.candidate_index else {
            observer.observe(ReconcileEvent::MissingIndex { entry });
            continue;
        };
        let position = match usize::try_from(index) {
            Ok(position) if position < pool.len() => position,
            _ => {
                observer.observe(ReconcileEvent::IndexOutOfRange {
                    entry,
                    index,
                    pool_size: pool.len(),
                });
                continue;
            }
        };
        match resolved.entry(position) {
            Entry::Occupied(mut slot) => {
                observer.observe(ReconcileEvent::DuplicateIndex { index: position });
                slot.insert(candidate);
            }
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            }
        }
    }

    let mut matches = Vec::with_capacity(resolved.len());
    for (index, candidate) in resolved {
        let Some(profile) = pool.get(index) else {
            continue;
        };
        let Some(score) = candidate.score else {
            observer.observe(ReconcileEvent::MissingScore { index });
            continue;
        };
        if score < rules.min_score {
            observer.observe(ReconcileEvent::BelowThreshold { index, score });
            continue;
        }

        let match_score = clamp_score(score);
        if score > 100.0 {
            observer.observe(ReconcileEvent::ScoreClamped {
                index,
                from: score,
                to: match_score,
            });
        }

        let reason = candidate.reason.unwrap_or_else(|| {
            observer.observe(ReconcileEvent::ReasonDefaulted { index });
            DEFAULT_REASON.to_string()
        });

        matches.push(EnrichedMatch::from_profile(profile, match_score, reason));
    }

    Ok(matches)
}

/// Read starters from a reply, falling back to generic ones addressed to
/// `target` when the reply is unusable. Never fails.
pub fn reconcile_starters(
    raw: &RawReply,
    target: &UserProfile,
    rules: &MatchingRules,
    observer: &dyn ReconcileObserver,
) -> Vec<String> {
    match StarterReply::parse(raw) {
        Ok(reply) if !reply.starters.is_empty() => {
            let mut starters = reply.starters;
            starters.truncate(rules.max_starters.max(1));
            starters
        }
        Ok(_) => {
            observer.observe(ReconcileEvent::StarterFallback {
                reason: "model returned no usable starters".to_string(),
            });
            fallback_starters(&target.name)
        }
        Err(failure) => {
            observer.observe(ReconcileEvent::UnparseableReply {
                pipeline: Pipeline::Starters,
                detail: failure.detail.clone(),
                raw: failure.raw,
            });
            observer.observe(ReconcileEvent::StarterFallback {
                reason: failure.detail,
            });
            fallback_starters(&target.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::observer::RecordingObserver;
    use serde_json::json;

    fn pool(size: usize) -> CandidatePool {
        CandidatePool::new(
            (0..size)
                .map(|i| {
                    UserProfile::from_document(
                        format!("user-{}", i),
                        &json!({ "name": format!("User {}", i), "interests": ["math"] }),
                    )
                })
                .collect(),
        )
    }

    #[test]
    fn test_normalize_fences() {
        assert_eq!(normalize("  {\"a\":1}  "), "{\"a\":1}");
        assert_eq!(normalize("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(normalize("```\n[1]\n```\n"), "[1]");
        assert_eq!(normalize("Here you go:\n```json\n{}\n```\nEnjoy!"), "{}");
        assert_eq!(normalize("```json\n{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn test_backticks_inside_reason_survive() {
        let bare = r#"{"matches":[{"candidateIndex":0,"score":80,"reason":"Both write ```rust``` daily"}]}"#;
        let fenced = format!("```json\n{}\n```", bare);

        for text in [bare.to_string(), fenced] {
            let observer = RecordingObserver::new();
            let matches =
                reconcile_matches(&RawReply::new(text), &pool(1), &MatchingRules::default(), &observer).unwrap();
            assert_eq!(matches.len(), 1);
            assert_eq!(matches[0].match_reason, "Both write ```rust``` daily");
        }
    }

    #[test]
    fn test_parse_accepts_bare_array() {
        let reply = MatchReply::parse(&RawReply::new(
            r#"[{"candidateIndex": 1, "score": 70, "reason": "x"}]"#,
        ))
        .unwrap();
        assert_eq!(reply.candidates.len(), 1);
        assert_eq!(reply.candidates[0].candidate_index, Some(1));
    }

    #[test]
    fn test_parse_rejects_wrong_shape() {
        assert!(MatchReply::parse(&RawReply::new(r#"{"results": []}"#)).is_err());
        assert!(MatchReply::parse(&RawReply::new("42")).is_err());
        let failure = MatchReply::parse(&RawReply::new("not json")).unwrap_err();
        assert_eq!(failure.raw, "not json");
    }

    #[test]
    fn test_lenient_field_types() {
        let candidate = MatchCandidate::from_value(&json!({
            "candidateIndex": "2",
            "score": 80.0,
            "reason": "   "
        }));
        assert_eq!(candidate.candidate_index, Some(2));
        assert_eq!(candidate.score, Some(80.0));
        assert_eq!(candidate.reason, None);

        let candidate = MatchCandidate::from_value(&json!({ "candidateIndex": 1.5, "score": "high" }));
        assert_eq!(candidate.candidate_index, None);
        assert_eq!(candidate.score, None);
    }

    #[test]
    fn test_entries_skipped_individually() {
        let observer = RecordingObserver::new();
        let raw = RawReply::new(
            r#"{"matches": [
                {"score": 90, "reason": "no index"},
                {"candidateIndex": -1, "score": 90},
                {"candidateIndex": 7, "score": 90},
                {"candidateIndex": 0, "reason": "no score"},
                {"candidateIndex": 1, "score": 65}
            ]}"#,
        );

        let matches = reconcile_matches(&raw, &pool(3), &MatchingRules::default(), &observer).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].user_id, "user-1");
        assert_eq!(matches[0].match_reason, DEFAULT_REASON);
        assert_eq!(
            observer.events(),
            vec![
                ReconcileEvent::MissingIndex { entry: 0 },
                ReconcileEvent::IndexOutOfRange { entry: 1, index: -1, pool_size: 3 },
                ReconcileEvent::IndexOutOfRange { entry: 2, index: 7, pool_size: 3 },
                ReconcileEvent::MissingScore { index: 0 },
                ReconcileEvent::ReasonDefaulted { index: 1 },
            ]
        );
    }

    #[test]
    fn test_duplicate_index_last_wins() {
        let observer = RecordingObserver::new();
        let raw = RawReply::new(
            r#"{"matches": [
                {"candidateIndex": 1, "score": 90, "reason": "first"},
                {"candidateIndex": 1, "score": 60, "reason": "second"}
            ]}"#,
        );

        let matches = reconcile_matches(&raw, &pool(2), &MatchingRules::default(), &observer).unwrap();

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].match_score, 60);
        assert_eq!(matches[0].match_reason, "second");
        assert!(observer.events().contains(&ReconcileEvent::DuplicateIndex { index: 1 }));
    }

    #[test]
    fn test_profile_fields_come_from_pool() {
        let observer = RecordingObserver::new();
        let raw = RawReply::new(
            r#"{"matches": [{"candidateIndex": 0, "score": 80, "reason": "ok",
                "name": "Mallory", "userId": "forged"}]}"#,
        );

        let matches = reconcile_matches(&raw, &pool(1), &MatchingRules::default(), &observer).unwrap();

        assert_eq!(matches[0].user_id, "user-0");
        assert_eq!(matches[0].name, "User 0");
        assert_eq!(matches[0].interests, vec!["math"]);
    }

    #[test]
    fn test_unparseable_match_reply_is_reported() {
        let observer = RecordingObserver::new();
        let raw = RawReply::new("Sorry, I can't help with that.");

        let result = reconcile_matches(&raw, &pool(2), &MatchingRules::default(), &observer);

        assert!(result.is_err());
        assert!(matches!(
            observer.events().as_slice(),
            [ReconcileEvent::UnparseableReply { pipeline: Pipeline::Matchmaking, raw, .. }]
                if raw == "Sorry, I can't help with that."
        ));
    }

    #[test]
    fn test_starters_parsed_and_capped() {
        let observer = RecordingObserver::new();
        let target = UserProfile::from_document("t", &json!({ "name": "Grace" }));
        let raw = RawReply::new(
            "```json\n{\"starters\": [\"a\", \" \", 3, \"b\", \"c\", \"d\", \"e\", \"f\"]}\n```",
        );

        let starters = reconcile_starters(&raw, &target, &MatchingRules::default(), &observer);

        assert_eq!(starters, vec!["a", "b", "c", "d", "e"]);
        assert!(observer.events().is_empty());
    }

    #[test]
    fn test_empty_starters_fall_back() {
        let observer = RecordingObserver::new();
        let target = UserProfile::from_document("t", &json!({ "name": "Grace" }));

        let starters = reconcile_starters(
            &RawReply::new(r#"{"starters": []}"#),
            &target,
            &MatchingRules::default(),
            &observer,
        );

        assert_eq!(starters, fallback_starters("Grace"));
        assert_eq!(starters[0], "Hey Grace! Want to study together?");
        assert_eq!(observer.events().len(), 1);
    }
}
