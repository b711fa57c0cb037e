// Route exports
pub mod auth;
pub mod errors;
pub mod matches;

pub use auth::AuthenticatedUser;
pub use errors::{handle_json_payload_error, handle_query_payload_error, ApiError};
pub use matches::AppState;

use actix_web::web;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(matches::configure),
    );
}
