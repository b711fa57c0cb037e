//! Buddy Match - AI-assisted study buddy matchmaking service
//!
//! Gathers profiles from the profile store, asks a generative model to rank
//! them, and reconciles the model's free-text reply into validated,
//! store-backed results. A second pipeline drafts conversation starters.

pub mod config;
pub mod core;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Matcher, RawReply, ReconcileEvent, ReconcileObserver};
pub use crate::error::{ErrorKind, PipelineError};
pub use crate::models::{CandidatePool, EnrichedMatch, FindMatchesRequest, FindMatchesResponse, MatchingRules, StartersRequest, UserProfile};
