// Shared fakes for crate-level tests

#![allow(dead_code)]

use async_trait::async_trait;
use buddy_match::models::{CandidatePool, UserProfile};
use buddy_match::services::{ModelError, ProfileStore, StoreError, TextModel};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn profile(id: &str, name: &str, interests: &[&str]) -> UserProfile {
    UserProfile::from_document(
        id,
        &json!({
            "name": name,
            "bio": format!("{} studies a lot", name),
            "interests": interests,
            "imageUrl": format!("https://img.test/{}.png", id),
        }),
    )
}

pub fn pool(size: usize) -> CandidatePool {
    CandidatePool::new(
        (0..size)
            .map(|i| profile(&format!("user-{}", i), &format!("User {}", i), &["math"]))
            .collect(),
    )
}

/// In-memory profile store that counts reads
#[derive(Default)]
pub struct MemoryStore {
    profiles: Vec<UserProfile>,
    pub reads: AtomicUsize,
    pub fail: bool,
}

impl MemoryStore {
    pub fn new(profiles: Vec<UserProfile>) -> Self {
        Self {
            profiles,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::ApiError("store offline".into()));
        }
        Ok(self.profiles.iter().find(|p| p.id == user_id).cloned())
    }

    async fn list_profiles(&self) -> Result<Vec<UserProfile>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(StoreError::ApiError("store offline".into()));
        }
        Ok(self.profiles.clone())
    }
}

/// Model that replays a fixed reply and records the prompts it was given
pub struct ScriptedModel {
    reply: Result<String, String>,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedModel {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Ok(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            reply: Err(message.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.prompts.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl TextModel for ScriptedModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.reply
            .clone()
            .map_err(ModelError::ApiError)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}
