use crate::models::UserProfile;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when reading from the profile store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Read-only access to user profiles
///
/// Implementations must tolerate concurrent calls; the pipelines issue
/// independent reads in parallel.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch a single profile, `None` when no document has this id
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Enumerate every profile in the collection, in store order
    async fn list_profiles(&self) -> Result<Vec<UserProfile>, StoreError>;
}

/// Appwrite API client for the users collection
pub struct AppwriteClient {
    base_url: String,
    api_key: String,
    project_id: String,
    database_id: String,
    collection_id: String,
    page_size: usize,
    client: Client,
}

impl AppwriteClient {
    /// Create a new Appwrite client
    pub fn new(
        base_url: String,
        api_key: String,
        project_id: String,
        database_id: String,
        collection_id: String,
        page_size: usize,
    ) -> Result<Self, StoreError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            base_url,
            api_key,
            project_id,
            database_id,
            collection_id,
            page_size: page_size.max(1),
            client,
        })
    }

    fn documents_url(&self) -> String {
        format!(
            "{}/databases/{}/collections/{}/documents",
            self.base_url.trim_end_matches('/'),
            self.database_id,
            self.collection_id
        )
    }

    async fn fetch_json(&self, url: &str) -> Result<Option<Value>, StoreError> {
        let response = self
            .client
            .get(url)
            .header("X-Appwrite-Key", &self.api_key)
            .header("X-Appwrite-Project", &self.project_id)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Appwrite request to {} failed: {} - {}", url, status, body);
            return Err(StoreError::ApiError(format!("Request failed: {}", status)));
        }

        Ok(Some(response.json().await?))
    }
}

/// Turn an Appwrite document into a profile, `None` when it carries no id
fn decode_document(doc: &Value) -> Option<UserProfile> {
    let id = doc.get("$id").and_then(|v| v.as_str())?;
    let data = doc.get("data").unwrap_or(doc);
    Some(UserProfile::from_document(id, data))
}

#[async_trait]
impl ProfileStore for AppwriteClient {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let url = format!("{}/{}", self.documents_url(), urlencoding::encode(user_id));

        tracing::debug!("Fetching profile for user: {}", user_id);

        let Some(doc) = self.fetch_json(&url).await? else {
            return Ok(None);
        };

        decode_document(&doc)
            .map(Some)
            .ok_or_else(|| StoreError::InvalidResponse(format!("Document for {} has no $id", user_id)))
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, StoreError> {
        let mut profiles = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let mut queries = vec![format!("limit({})", self.page_size)];
            if let Some(last_id) = &cursor {
                queries.push(format!("cursorAfter(\"{}\")", last_id));
            }
            let query_string = queries
                .iter()
                .map(|q| format!("queries[]={}", urlencoding::encode(q)))
                .collect::<Vec<_>>()
                .join("&");
            let url = format!("{}?{}", self.documents_url(), query_string);

            let json = self
                .fetch_json(&url)
                .await?
                .ok_or_else(|| StoreError::ApiError("Users collection not found".into()))?;

            let documents = json
                .get("documents")
                .and_then(|d| d.as_array())
                .ok_or_else(|| StoreError::InvalidResponse("Missing documents array".into()))?;

            for doc in documents {
                match decode_document(doc) {
                    Some(profile) => profiles.push(profile),
                    None => tracing::warn!("Skipping profile document without $id"),
                }
            }

            // Continue after the last document of this page, never an earlier one
            let last_id = documents
                .last()
                .and_then(|doc| doc.get("$id"))
                .and_then(|id| id.as_str())
                .map(str::to_string);

            if documents.len() < self.page_size {
                break;
            }
            match last_id {
                Some(id) => cursor = Some(id),
                None => {
                    tracing::warn!("Page ended with a document without $id, stopping pagination");
                    break;
                }
            }
        }

        tracing::debug!("Listed {} profiles", profiles.len());

        Ok(profiles)
    }
}
