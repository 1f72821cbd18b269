//! In-process doubles for the store and the three external providers.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;

use crate::embedding::{EmbeddingError, EmbeddingProvider};
use crate::errors::AppError;
use crate::linkedin::{LinkedInError, LinkedInProvider};
use crate::llm_client::{LanguageModel, LlmError};
use crate::models::user::{ProfileEnrichment, UserProfile};
use crate::profile::prompts::NARRATIVE_SYSTEM;
use crate::store::ProfileStore;

/// A processed, similarity-eligible user.
pub fn processed_user(idfv: &str, embedding: Vec<f32>, interests: &[&str]) -> UserProfile {
    let mut user = UserProfile::new(idfv);
    user.embedding = Some(embedding);
    user.interests = Some(interests.iter().map(|s| s.to_string()).collect());
    user.processed = true;
    user
}

// ────────────────────────────────────────────
// Store
// ────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryProfileStore {
    users: Mutex<BTreeMap<String, UserProfile>>,
    commits: AtomicUsize,
}

impl InMemoryProfileStore {
    pub fn with_users(users: Vec<UserProfile>) -> Self {
        let store = Self::default();
        {
            let mut map = store.users.lock().unwrap();
            for user in users {
                map.insert(user.idfv.clone(), user);
            }
        }
        store
    }

    pub fn snapshot(&self, idfv: &str) -> Option<UserProfile> {
        self.users.lock().unwrap().get(idfv).cloned()
    }

    /// Successful `apply_enrichment` calls.
    pub fn commits(&self) -> usize {
        self.commits.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_by_idfv(&self, idfv: &str) -> Result<Option<UserProfile>, AppError> {
        Ok(self.snapshot(idfv))
    }

    async fn create(&self, idfv: &str) -> Result<(UserProfile, bool), AppError> {
        let mut users = self.users.lock().unwrap();
        if let Some(existing) = users.get(idfv) {
            return Ok((existing.clone(), false));
        }
        let user = UserProfile::new(idfv);
        users.insert(idfv.to_string(), user.clone());
        Ok((user, true))
    }

    async fn list_eligible_candidates(&self) -> Result<Vec<UserProfile>, AppError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.is_similarity_eligible())
            .cloned()
            .collect())
    }

    async fn apply_enrichment(
        &self,
        idfv: &str,
        enrichment: &ProfileEnrichment,
    ) -> Result<Option<UserProfile>, AppError> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.get_mut(idfv).filter(|u| !u.processed) else {
            return Ok(None);
        };

        user.first_name = enrichment.first_name.clone();
        user.last_name = enrichment.last_name.clone();
        user.headline = enrichment.headline.clone();
        user.interests = Some(enrichment.interests.clone());
        user.bullet_points = Some(enrichment.bullet_points.clone());
        user.short_description = Some(enrichment.short_description.clone());
        user.long_description = Some(enrichment.long_description.clone());
        user.work_history = Some(Json(enrichment.work_history.clone()));
        user.embedding = Some(enrichment.embedding.clone());
        user.processed = true;
        user.updated_at = Utc::now();

        self.commits.fetch_add(1, Ordering::SeqCst);
        Ok(Some(user.clone()))
    }
}

// ────────────────────────────────────────────
// Providers
// ────────────────────────────────────────────

/// Answers by system prompt: the narrative prompt gets `narrative`, anything else `structured`.
pub struct ScriptedLlm {
    narrative: String,
    structured: String,
    fail_narrative: bool,
    fail_structured: bool,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedLlm {
    pub fn new(narrative: &str, structured: &str) -> Self {
        Self {
            narrative: narrative.to_string(),
            structured: structured.to_string(),
            fail_narrative: false,
            fail_structured: false,
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn fail_narrative(mut self) -> Self {
        self.fail_narrative = true;
        self
    }

    pub fn fail_structured(mut self) -> Self {
        self.fail_structured = true;
        self
    }

    /// Every call sleeps this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageModel for ScriptedLlm {
    async fn complete(
        &self,
        system: &str,
        _prompt: &str,
        _temperature: f32,
        _max_tokens: u32,
    ) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let (fail, text) = if system == NARRATIVE_SYSTEM {
            (self.fail_narrative, &self.narrative)
        } else {
            (self.fail_structured, &self.structured)
        };
        if fail {
            return Err(LlmError::Api {
                status: 529,
                message: "overloaded".to_string(),
            });
        }
        Ok(text.clone())
    }
}

pub struct FixedEmbedder {
    vector: Option<Vec<f32>>,
    calls: AtomicUsize,
    last_input: Mutex<Option<String>>,
}

impl FixedEmbedder {
    pub fn new(vector: Vec<f32>) -> Self {
        Self {
            vector: Some(vector),
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn failing() -> Self {
        Self {
            vector: None,
            calls: AtomicUsize::new(0),
            last_input: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_input(&self) -> Option<String> {
        self.last_input.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmbeddingProvider for FixedEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_input.lock().unwrap() = Some(text.to_string());
        self.vector.clone().ok_or(EmbeddingError::Api {
            status: 500,
            message: "embedding backend down".to_string(),
        })
    }
}

pub struct StaticLinkedIn {
    profile: Option<Value>,
}

impl StaticLinkedIn {
    pub fn new(profile: Value) -> Self {
        Self {
            profile: Some(profile),
        }
    }

    pub fn failing() -> Self {
        Self { profile: None }
    }
}

#[async_trait]
impl LinkedInProvider for StaticLinkedIn {
    async fn lookup(&self, _profile_url: &str) -> Result<Value, LinkedInError> {
        self.profile.clone().ok_or(LinkedInError::Api {
            status: 404,
            message: "profile not found".to_string(),
        })
    }
}
