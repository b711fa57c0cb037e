use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to find study buddy matches
///
/// Fields default to empty so a missing `interests` array is reported as a
/// validation failure rather than a JSON payload error.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    #[validate(length(min = 1, message = "Interests array is required and must not be empty"))]
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Request for conversation starters towards another user
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct StartersRequest {
    #[validate(length(min = 1, message = "Target user ID is required"))]
    #[serde(default, alias = "target_user_id", rename = "targetUserId")]
    pub target_user_id: String,
}
