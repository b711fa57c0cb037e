// Service exports
pub mod appwrite;
pub mod auth;
pub mod gemini;

pub use appwrite::{AppwriteClient, ProfileStore, StoreError};
pub use auth::{AuthError, Claims, TokenVerifier};
pub use gemini::{GeminiClient, ModelError, TextModel};
