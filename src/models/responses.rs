use serde::{Deserialize, Serialize};
use crate::models::domain::EnrichedMatch;

/// Response for find matches endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<EnrichedMatch>,
}

/// Response for conversation starters endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartersResponse {
    pub starters: Vec<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
