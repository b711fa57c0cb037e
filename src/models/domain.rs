use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_NAME: &str = "Anonymous";

/// Profile snapshot read from the profile store
///
/// Built fresh for every pipeline run and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub bio: String,
    pub interests: Vec<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl UserProfile {
    /// Decode a raw store document, falling back to defaults for any
    /// missing or mistyped field.
    pub fn from_document(id: impl Into<String>, data: &Value) -> Self {
        let name = text_field(data, "name");
        let interests = data
            .get("interests")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .filter_map(|i| i.as_str())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            id: id.into(),
            name: if name.is_empty() { DEFAULT_NAME.to_string() } else { name },
            bio: text_field(data, "bio"),
            interests,
            image_url: text_field(data, "imageUrl"),
        }
    }
}

fn text_field(data: &Value, key: &str) -> String {
    data.get(key)
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string()
}

/// What the acting user tells us about themselves in a matchmaking request
#[derive(Debug, Clone, Default)]
pub struct SeekerProfile {
    pub interests: Vec<String>,
    pub bio: String,
}

/// Ordered candidates for one matchmaking run
///
/// The model only ever sees a candidate's position in this list, so the
/// order must not change between prompt building and reconciliation.
#[derive(Debug, Clone, Default)]
pub struct CandidatePool {
    candidates: Vec<UserProfile>,
}

impl CandidatePool {
    pub fn new(candidates: Vec<UserProfile>) -> Self {
        Self { candidates }
    }

    pub fn get(&self, index: usize) -> Option<&UserProfile> {
        self.candidates.get(index)
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &UserProfile)> {
        self.candidates.iter().enumerate()
    }
}

/// Final, store-backed match returned to the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedMatch {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub bio: String,
    pub interests: Vec<String>,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "matchScore")]
    pub match_score: u8,
    #[serde(rename = "matchReason")]
    pub match_reason: String,
}

impl EnrichedMatch {
    pub fn from_profile(profile: &UserProfile, match_score: u8, match_reason: String) -> Self {
        Self {
            user_id: profile.id.clone(),
            name: profile.name.clone(),
            bio: profile.bio.clone(),
            interests: profile.interests.clone(),
            image_url: profile.image_url.clone(),
            match_score,
            match_reason,
        }
    }
}

/// Tunables for the matchmaking and starter pipelines
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchingRules {
    pub min_score: f64,
    pub max_results: usize,
    pub max_starters: usize,
    pub reason_word_limit: usize,
}

impl Default for MatchingRules {
    fn default() -> Self {
        Self {
            min_score: 50.0,
            max_results: 20,
            max_starters: 5,
            reason_word_limit: 50,
        }
    }
}
