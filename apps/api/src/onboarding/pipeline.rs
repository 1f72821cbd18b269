//! Onboarding pipeline — one-shot enrichment of a bootstrapped user.
//!
//! Flow: idfv → idempotence guard → validate body → extract resume → LinkedIn (best-effort)
//!       → synthesize (narrative ‖ structured) → embed narrative → single atomic commit.
//!
//! Nothing is written unless every stage succeeds.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::embedding::{generate_embedding, EmbeddingProvider};
use crate::errors::{AppError, PipelineError};
use crate::extraction::extract_resume_text;
use crate::linkedin::{fetch_linkedin, is_valid_profile_url, LinkedInProvider};
use crate::llm_client::LanguageModel;
use crate::models::user::{ProfileEnrichment, PublicProfile, UserProfile};
use crate::profile::synthesizer::{synthesize_profile, ProfileInputs};
use crate::store::ProfileStore;

/// Collaborators the pipeline runs against.
pub struct OnboardingDeps<'a> {
    pub store: &'a dyn ProfileStore,
    pub llm: &'a dyn LanguageModel,
    pub embedder: &'a dyn EmbeddingProvider,
    pub linkedin: &'a dyn LinkedInProvider,
    pub embedding_dimensions: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OnboardingRequest {
    pub idfv: String,
    pub linkedin_url: String,
    pub interests: Vec<String>,
    #[serde(default)]
    pub resume_base64: Option<String>,
    #[serde(default)]
    pub resume_mime_type: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnboardingStatus {
    Processed,
    AlreadyProcessed,
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardedProfile {
    #[serde(flatten)]
    pub profile: PublicProfile,
    /// Short synthesized summary. Present only on the run that produced it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct OnboardingResponse {
    pub status: OnboardingStatus,
    pub profile: OnboardedProfile,
}

impl OnboardingResponse {
    fn new(status: OnboardingStatus, user: &UserProfile, summary: Option<String>) -> Self {
        Self {
            status,
            profile: OnboardedProfile {
                profile: PublicProfile::from(user),
                summary,
            },
        }
    }
}

struct ResumePayload<'a> {
    encoded: &'a str,
    mime_type: &'a str,
}

struct ValidatedRequest<'a> {
    idfv: &'a str,
    linkedin_url: &'a str,
    interests: Vec<String>,
    resume: Option<ResumePayload<'a>>,
}

fn validate_idfv(request: &OnboardingRequest) -> Result<&str, AppError> {
    let idfv = request.idfv.trim();
    if idfv.is_empty() {
        return Err(AppError::Validation("idfv must not be empty".to_string()));
    }
    Ok(idfv)
}

fn validate(request: &OnboardingRequest) -> Result<ValidatedRequest<'_>, AppError> {
    let idfv = validate_idfv(request)?;

    let linkedin_url = request.linkedin_url.trim();
    if !is_valid_profile_url(linkedin_url) {
        return Err(AppError::Validation(format!(
            "linkedin_url is not a LinkedIn profile URL: {linkedin_url}"
        )));
    }

    let interests: Vec<String> = request
        .interests
        .iter()
        .map(|i| i.trim())
        .filter(|i| !i.is_empty())
        .map(str::to_string)
        .collect();
    if interests.is_empty() {
        return Err(AppError::Validation(
            "interests must contain at least one entry".to_string(),
        ));
    }

    let resume = match (
        request.resume_base64.as_deref().filter(|s| !s.trim().is_empty()),
        request.resume_mime_type.as_deref().filter(|s| !s.trim().is_empty()),
    ) {
        (Some(encoded), Some(mime_type)) => Some(ResumePayload { encoded, mime_type }),
        (None, None) => None,
        _ => {
            return Err(AppError::Validation(
                "resume_base64 and resume_mime_type must be provided together".to_string(),
            ))
        }
    };

    Ok(ValidatedRequest {
        idfv,
        linkedin_url,
        interests,
        resume,
    })
}

/// Runs the full enrichment for one user. A user that is already processed is
/// returned unchanged without any provider call.
pub async fn onboard(
    deps: &OnboardingDeps<'_>,
    request: &OnboardingRequest,
) -> Result<OnboardingResponse, AppError> {
    let idfv = validate_idfv(request)?;

    let user = deps
        .store
        .get_by_idfv(idfv)
        .await?
        .ok_or_else(|| PipelineError::UserNotFound(idfv.to_string()))?;

    // Idempotence first: a processed user never reaches validation or providers.
    if user.processed {
        info!("User {idfv} already processed, skipping onboarding");
        return Ok(OnboardingResponse::new(
            OnboardingStatus::AlreadyProcessed,
            &user,
            None,
        ));
    }

    let req = validate(request)?;

    info!("Onboarding user {}", req.idfv);

    let resume_text = match &req.resume {
        Some(resume) => Some(extract_resume_text(resume.encoded, resume.mime_type).await?),
        None => None,
    };

    let linkedin = fetch_linkedin(deps.linkedin, req.linkedin_url).await;

    let inputs = ProfileInputs {
        linkedin: &linkedin,
        resume_text: resume_text.as_deref(),
        interests: &req.interests,
    };
    let synthesis = synthesize_profile(deps.llm, &inputs).await;
    let narrative = synthesis.narrative?;
    let structured = synthesis.structured?;

    let embedding =
        generate_embedding(deps.embedder, &narrative, deps.embedding_dimensions).await?;

    let identity = linkedin.identity();
    let enrichment = ProfileEnrichment {
        first_name: identity.first_name,
        last_name: identity.last_name,
        headline: identity.headline,
        interests: req.interests,
        bullet_points: structured.bullet_points,
        short_description: structured.short_description,
        long_description: narrative,
        work_history: structured.jobs,
        embedding,
    };

    match deps.store.apply_enrichment(req.idfv, &enrichment).await? {
        Some(updated) => {
            info!("User {} onboarded", req.idfv);
            Ok(OnboardingResponse::new(
                OnboardingStatus::Processed,
                &updated,
                Some(structured.summary),
            ))
        }
        None => {
            // Another request committed first; its result stands.
            warn!("User {} was processed concurrently, discarding this run", req.idfv);
            let current = deps
                .store
                .get_by_idfv(req.idfv)
                .await?
                .ok_or_else(|| PipelineError::UserNotFound(req.idfv.to_string()))?;
            Ok(OnboardingResponse::new(
                OnboardingStatus::AlreadyProcessed,
                &current,
                None,
            ))
        }
    }
}
