// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{CandidatePool, EnrichedMatch, MatchingRules, SeekerProfile, UserProfile};
pub use requests::{FindMatchesRequest, StartersRequest};
pub use responses::{ErrorResponse, FindMatchesResponse, HealthResponse, StartersResponse};
