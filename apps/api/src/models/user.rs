use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

/// A single work-experience record. `end_date` may be "Present".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub title: String,
    pub company: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default)]
    pub description: String,
}

/// A persisted user. Created with only `idfv`; enriched once by onboarding.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserProfile {
    pub id: Uuid,
    pub idfv: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    pub interests: Option<Vec<String>>,
    pub bullet_points: Option<Vec<String>>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub work_history: Option<Json<Vec<JobRecord>>>,
    pub embedding: Option<Vec<f32>>,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserProfile {
    /// A freshly bootstrapped user holding only its device identifier.
    pub fn new(idfv: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            idfv: idfv.into(),
            first_name: None,
            last_name: None,
            headline: None,
            interests: None,
            bullet_points: None,
            short_description: None,
            long_description: None,
            work_history: None,
            embedding: None,
            processed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Both similarity inputs are present.
    pub fn is_similarity_eligible(&self) -> bool {
        self.embedding.is_some() && self.interests.is_some()
    }
}

/// Every derived field written by a successful onboarding, committed together
/// with `processed = true`.
#[derive(Debug, Clone)]
pub struct ProfileEnrichment {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    pub interests: Vec<String>,
    pub bullet_points: Vec<String>,
    pub short_description: String,
    pub long_description: String,
    pub work_history: Vec<JobRecord>,
    pub embedding: Vec<f32>,
}

/// API view of a user. The raw embedding is never serialised.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub idfv: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    pub interests: Vec<String>,
    pub bullet_points: Vec<String>,
    pub short_description: Option<String>,
    pub long_description: Option<String>,
    pub work_history: Vec<JobRecord>,
    pub embedding_dimensions: Option<usize>,
    pub processed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&UserProfile> for PublicProfile {
    fn from(user: &UserProfile) -> Self {
        Self {
            id: user.id,
            idfv: user.idfv.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            headline: user.headline.clone(),
            interests: user.interests.clone().unwrap_or_default(),
            bullet_points: user.bullet_points.clone().unwrap_or_default(),
            short_description: user.short_description.clone(),
            long_description: user.long_description.clone(),
            work_history: user
                .work_history
                .as_ref()
                .map(|jobs| jobs.0.clone())
                .unwrap_or_default(),
            embedding_dimensions: user.embedding.as_ref().map(Vec::len),
            processed: user.processed,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}
