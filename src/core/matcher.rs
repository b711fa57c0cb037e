use crate::core::{
    gatherer::{gather_candidates, gather_pair},
    observer::{ReconcileObserver, TracingObserver},
    prompt::{build_match_prompt, build_starter_prompt},
    ranking::rank_matches,
    reconciler::{reconcile_matches, reconcile_starters, RawReply},
};
use crate::error::PipelineError;
use crate::models::{EnrichedMatch, FindMatchesRequest, MatchingRules, SeekerProfile, StartersRequest};
use crate::services::{ProfileStore, TextModel};
use std::sync::Arc;

/// Main pipeline orchestrator
///
/// # Pipeline Stages
/// 1. Candidate gathering from the profile store
/// 2. Prompt building
/// 3. Model invocation
/// 4. Reconciliation of the model reply against the gathered profiles
/// 5. Ranking and truncation (matchmaking only)
///
/// Holds no per-request state, so one instance serves concurrent requests.
#[derive(Clone)]
pub struct Matcher {
    rules: MatchingRules,
    observer: Arc<dyn ReconcileObserver>,
}

impl Matcher {
    pub fn new(rules: MatchingRules, observer: Arc<dyn ReconcileObserver>) -> Self {
        Self { rules, observer }
    }

    pub fn with_default_rules() -> Self {
        Self::new(MatchingRules::default(), Arc::new(TracingObserver))
    }

    pub fn rules(&self) -> &MatchingRules {
        &self.rules
    }

    /// Recommend study buddies for `acting_user_id`.
    ///
    /// Rejects empty interests before touching the store. An empty candidate
    /// pool returns no matches without calling the model.
    pub async fn find_matches(
        &self,
        store: &dyn ProfileStore,
        model: &dyn TextModel,
        acting_user_id: &str,
        request: &FindMatchesRequest,
    ) -> Result<Vec<EnrichedMatch>, PipelineError> {
        if request.interests.is_empty() {
            return Err(PipelineError::InvalidArgument(
                "Interests array is required and must not be empty".to_string(),
            ));
        }

        let pool = gather_candidates(store, acting_user_id).await?;
        if pool.is_empty() {
            tracing::info!("No candidates for {}, skipping model call", acting_user_id);
            return Ok(Vec::new());
        }

        let seeker = SeekerProfile {
            interests: request.interests.clone(),
            bio: request.bio.clone().unwrap_or_default(),
        };
        let prompt = build_match_prompt(&seeker, &pool, &self.rules);
        tracing::debug!(model = model.name(), candidates = pool.len(), "Requesting match ranking");

        let reply = RawReply::new(model.generate(&prompt).await?);
        let matches = reconcile_matches(&reply, &pool, &self.rules, self.observer.as_ref())?;
        let ranked = rank_matches(matches, self.rules.max_results);

        tracing::info!(
            "Returning {} matches for user {} (from {} candidates)",
            ranked.len(),
            acting_user_id,
            pool.len()
        );

        Ok(ranked)
    }

    /// Suggest opening messages from `acting_user_id` to the request's target.
    ///
    /// An unusable model reply is replaced by generic starters; only caller
    /// errors, missing profiles and store/model failures are returned as errors.
    pub async fn conversation_starters(
        &self,
        store: &dyn ProfileStore,
        model: &dyn TextModel,
        acting_user_id: &str,
        request: &StartersRequest,
    ) -> Result<Vec<String>, PipelineError> {
        let target_user_id = request.target_user_id.trim();
        if target_user_id.is_empty() {
            return Err(PipelineError::InvalidArgument("Target user ID is required".to_string()));
        }

        let (me, them) = gather_pair(store, acting_user_id, target_user_id).await?;
        let prompt = build_starter_prompt(&me, &them);
        tracing::debug!(model = model.name(), "Requesting conversation starters");

        let reply = RawReply::new(model.generate(&prompt).await?);
        let starters = reconcile_starters(&reply, &them, &self.rules, self.observer.as_ref());

        tracing::debug!("Returning {} starters for {} -> {}", starters.len(), acting_user_id, target_user_id);

        Ok(starters)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::with_default_rules()
    }
}
