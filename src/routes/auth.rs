use crate::error::{ErrorKind, PipelineError};
use crate::routes::errors::ApiError;
use crate::services::TokenVerifier;
use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use std::future::{ready, Ready};

/// Caller identity taken from a verified bearer token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser(pub String);

impl AuthenticatedUser {
    pub fn user_id(&self) -> &str {
        &self.0
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = ApiError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(verifier) = req.app_data::<web::Data<TokenVerifier>>() else {
            tracing::error!("Token verifier missing from app data");
            return ready(Err(ApiError::new(ErrorKind::Internal, "Authentication unavailable")));
        };

        let header_value = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());

        let result = verifier
            .verify_header(header_value)
            .map(AuthenticatedUser)
            .map_err(|e| ApiError::from_pipeline(&PipelineError::from(e), "Authentication failed"));

        ready(result)
    }
}
