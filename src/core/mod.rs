// Core pipeline exports
pub mod gatherer;
pub mod matcher;
pub mod observer;
pub mod prompt;
pub mod ranking;
pub mod reconciler;

pub use gatherer::{gather_candidates, gather_pair};
pub use matcher::Matcher;
pub use observer::{Pipeline, ReconcileEvent, ReconcileObserver, RecordingObserver, TracingObserver};
pub use prompt::{build_match_prompt, build_starter_prompt};
pub use ranking::{clamp_score, rank_matches};
pub use reconciler::{
    fallback_starters, normalize, reconcile_matches, reconcile_starters, MatchCandidate, MatchReply,
    ParseFailure, RawReply, StarterReply, DEFAULT_REASON,
};
