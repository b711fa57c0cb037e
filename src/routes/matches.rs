use actix_web::{web, HttpResponse, Responder};
use validator::Validate;
use crate::core::Matcher;
use crate::error::ErrorKind;
use crate::models::{FindMatchesRequest, FindMatchesResponse, HealthResponse, StartersRequest, StartersResponse};
use crate::routes::{auth::AuthenticatedUser, errors::ApiError};
use crate::services::{ProfileStore, TextModel};
use std::sync::Arc;

const MATCH_FAILURE: &str = "An error occurred during matchmaking";
const STARTER_FAILURE: &str = "Failed to generate conversation starters";

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub model: Arc<dyn TextModel>,
    pub matcher: Matcher,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/starters", web::post().to(conversation_starters));
}

/// Health check endpoint
async fn health_check() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Find study buddy matches
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "interests": ["string"],
///   "bio": "string"
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<FindMatchesRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: {}", errors);
        return Err(ApiError::new(
            ErrorKind::InvalidArgument,
            "Interests array is required and must not be empty",
        ));
    }

    tracing::info!("Finding matches for user: {} ({} interests)", user.user_id(), req.interests.len());

    let matches = state
        .matcher
        .find_matches(state.store.as_ref(), state.model.as_ref(), user.user_id(), &req)
        .await
        .map_err(|e| ApiError::from_pipeline(&e, MATCH_FAILURE))?;

    Ok(HttpResponse::Ok().json(FindMatchesResponse { matches }))
}

/// Conversation starter suggestions
///
/// POST /api/v1/matches/starters
///
/// Request body:
/// ```json
/// {
///   "targetUserId": "string"
/// }
/// ```
async fn conversation_starters(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    req: web::Json<StartersRequest>,
) -> Result<HttpResponse, ApiError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for starters request: {}", errors);
        return Err(ApiError::new(ErrorKind::InvalidArgument, "Target user ID is required"));
    }

    let starters = state
        .matcher
        .conversation_starters(state.store.as_ref(), state.model.as_ref(), user.user_id(), &req)
        .await
        .map_err(|e| ApiError::from_pipeline(&e, STARTER_FAILURE))?;

    Ok(HttpResponse::Ok().json(StartersResponse { starters }))
}
