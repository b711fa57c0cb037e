use crate::error::PipelineError;
use crate::models::{CandidatePool, UserProfile};
use crate::services::ProfileStore;

/// Every profile except the acting user's, in store order.
///
/// An empty store (or one holding only the acting user) gives an empty pool.
pub async fn gather_candidates(
    store: &dyn ProfileStore,
    acting_user_id: &str,
) -> Result<CandidatePool, PipelineError> {
    let candidates: Vec<UserProfile> = store
        .list_profiles()
        .await?
        .into_iter()
        .filter(|p| p.id != acting_user_id)
        .collect();

    tracing::debug!("Gathered {} candidates for {}", candidates.len(), acting_user_id);

    Ok(CandidatePool::new(candidates))
}

/// Fetch the acting user's and the target's profiles concurrently.
pub async fn gather_pair(
    store: &dyn ProfileStore,
    acting_user_id: &str,
    target_user_id: &str,
) -> Result<(UserProfile, UserProfile), PipelineError> {
    let (me, them) = tokio::try_join!(
        store.get_profile(acting_user_id),
        store.get_profile(target_user_id),
    )?;

    match (me, them) {
        (Some(me), Some(them)) => Ok((me, them)),
        (me, _) => {
            tracing::info!(
                "Profile lookup failed: acting={} ({}), target={}",
                acting_user_id,
                if me.is_some() { "found" } else { "missing" },
                target_user_id
            );
            Err(PipelineError::NotFound("User profile not found".to_string()))
        }
    }
}
