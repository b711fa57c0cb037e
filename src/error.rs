use crate::core::reconciler::ParseFailure;
use crate::services::{AuthError, ModelError, StoreError};
use thiserror::Error;

/// Stable error categories exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    InvalidArgument,
    NotFound,
    Internal,
}

/// Everything that can stop a pipeline run
///
/// Only the [`ErrorKind`] and the caller-facing message leave the service;
/// wrapped store, model and parse errors are for logs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] AuthError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Profile store unavailable: {0}")]
    Store(#[from] StoreError),

    #[error("Model unavailable: {0}")]
    ModelUnavailable(#[from] ModelError),

    #[error(transparent)]
    Parse(#[from] ParseFailure),
}

impl PipelineError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            PipelineError::Unauthenticated(_) => ErrorKind::Unauthenticated,
            PipelineError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            PipelineError::NotFound(_) => ErrorKind::NotFound,
            PipelineError::Store(_)
            | PipelineError::ModelUnavailable(_)
            | PipelineError::Parse(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to show the caller; `internal` replaces any downstream detail
    pub fn public_message(&self, internal: &str) -> String {
        match self {
            PipelineError::Unauthenticated(_) => "User must be authenticated".to_string(),
            PipelineError::InvalidArgument(msg) | PipelineError::NotFound(msg) => msg.clone(),
            _ => internal.to_string(),
        }
    }
}
