//! LinkedIn enrichment — best-effort profile lookup by public profile URL.
//!
//! A failed lookup never aborts onboarding; it degrades to `LinkedInData::Unavailable`
//! and the synthesizer receives an error placeholder instead of profile JSON.

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum LinkedInError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("No enrichment provider is configured")]
    NotConfigured,
}

#[async_trait]
pub trait LinkedInProvider: Send + Sync {
    async fn lookup(&self, profile_url: &str) -> Result<Value, LinkedInError>;
}

/// Outcome of the best-effort lookup.
#[derive(Debug, Clone)]
pub enum LinkedInData {
    Found(Value),
    Unavailable { reason: String },
}

impl LinkedInData {
    /// JSON handed to the prompts: the profile itself, or an error placeholder.
    pub fn prompt_value(&self) -> Value {
        match self {
            LinkedInData::Found(v) => v.clone(),
            LinkedInData::Unavailable { reason } => json!({ "error": reason }),
        }
    }

    /// Name and headline derived from the profile, if present.
    pub fn identity(&self) -> LinkedInIdentity {
        match self {
            LinkedInData::Found(v) => LinkedInIdentity::from_profile(v),
            LinkedInData::Unavailable { .. } => LinkedInIdentity::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkedInIdentity {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
}

impl LinkedInIdentity {
    fn from_profile(profile: &Value) -> Self {
        let mut first_name = string_field(profile, &["first_name", "firstName"]);
        let mut last_name = string_field(profile, &["last_name", "lastName"]);

        if first_name.is_none() && last_name.is_none() {
            if let Some(full) = string_field(profile, &["full_name", "fullName", "name"]) {
                let mut parts = full.splitn(2, char::is_whitespace);
                first_name = parts.next().map(str::to_string);
                last_name = parts
                    .next()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string);
            }
        }

        Self {
            first_name,
            last_name,
            headline: string_field(profile, &["headline", "occupation"]),
        }
    }
}

fn string_field(value: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| value.get(*k).and_then(Value::as_str))
        .map(str::trim)
        .find(|s| !s.is_empty())
        .map(str::to_string)
}

/// Public profile URL, e.g. `https://www.linkedin.com/in/jane-doe/`.
pub fn is_valid_profile_url(url: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"^https?://(www\.)?linkedin\.com/in/[A-Za-z0-9-]+/?$")
                .expect("static regex is valid")
        })
        .is_match(url.trim())
}

/// Runs the lookup and folds any failure into `LinkedInData::Unavailable`.
pub async fn fetch_linkedin(provider: &dyn LinkedInProvider, profile_url: &str) -> LinkedInData {
    match provider.lookup(profile_url).await {
        Ok(profile) => {
            info!("LinkedIn profile fetched for {profile_url}");
            LinkedInData::Found(profile)
        }
        Err(e) => {
            warn!("LinkedIn lookup for {profile_url} failed, continuing without it: {e}");
            LinkedInData::Unavailable {
                reason: e.to_string(),
            }
        }
    }
}

/// HTTP enrichment client: `GET {endpoint}?url=<profile_url>` with a bearer key.
#[derive(Clone)]
pub struct HttpLinkedInClient {
    client: Client,
    endpoint: Option<String>,
    api_key: Option<String>,
}

impl HttpLinkedInClient {
    pub fn new(endpoint: Option<String>, api_key: Option<String>) -> Result<Self, LinkedInError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(30))
                .build()?,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl LinkedInProvider for HttpLinkedInClient {
    async fn lookup(&self, profile_url: &str) -> Result<Value, LinkedInError> {
        let endpoint = self.endpoint.as_deref().ok_or(LinkedInError::NotConfigured)?;

        let mut request = self.client.get(endpoint).query(&[("url", profile_url)]);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(LinkedInError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}
