//! Similarity Ranker — scores a candidate pool against one query user.
//!
//! Pure and synchronous: the caller fetches a snapshot of the pool once and
//! hands it in. Ordering is by combined score descending, then by IDFV
//! ascending so that equal scores rank the same way on every call.

use std::cmp::Ordering;

use serde::Serialize;
use uuid::Uuid;

use crate::errors::{IneligibleReason, PipelineError};
use crate::models::user::UserProfile;
use crate::similarity::scoring::{
    combined_score, cosine_similarity, jaccard_similarity, RankingConfig,
};

/// Query subject: the two similarity inputs plus the identity to exclude.
#[derive(Debug, Clone)]
pub struct SimilarityQuery<'a> {
    pub idfv: &'a str,
    pub embedding: &'a [f32],
    pub interests: &'a [String],
}

impl<'a> SimilarityQuery<'a> {
    /// Fails when the user lacks either similarity input.
    pub fn from_user(user: &'a UserProfile) -> Result<Self, PipelineError> {
        let embedding = user
            .embedding
            .as_deref()
            .ok_or_else(|| PipelineError::IneligibleQueryUser {
                idfv: user.idfv.clone(),
                reason: IneligibleReason::MissingEmbedding,
            })?;
        let interests = user
            .interests
            .as_deref()
            .ok_or_else(|| PipelineError::IneligibleQueryUser {
                idfv: user.idfv.clone(),
                reason: IneligibleReason::MissingInterests,
            })?;
        Ok(Self {
            idfv: &user.idfv,
            embedding,
            interests,
        })
    }
}

/// One scored candidate with the full score breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityResult {
    pub id: Uuid,
    pub idfv: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub headline: Option<String>,
    pub short_description: Option<String>,
    pub interests: Vec<String>,
    pub embedding_similarity: f64,
    pub interest_similarity: f64,
    pub combined_similarity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Ranking {
    pub results: Vec<SimilarityResult>,
    /// Candidates that passed the eligibility filter, before truncation.
    pub total_eligible: usize,
}

/// Scores every eligible candidate, sorts, and keeps the top `config.top_k`.
pub fn rank_candidates(
    query: &SimilarityQuery<'_>,
    pool: &[UserProfile],
    config: &RankingConfig,
) -> Ranking {
    let mut results: Vec<SimilarityResult> = pool
        .iter()
        .filter(|c| c.idfv != query.idfv && c.is_similarity_eligible())
        .filter_map(|c| score_candidate(query, c, config))
        .collect();

    let total_eligible = results.len();

    results.sort_by(|a, b| {
        b.combined_similarity
            .partial_cmp(&a.combined_similarity)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.idfv.cmp(&b.idfv))
    });
    results.truncate(config.top_k);

    Ranking {
        results,
        total_eligible,
    }
}

fn score_candidate(
    query: &SimilarityQuery<'_>,
    candidate: &UserProfile,
    config: &RankingConfig,
) -> Option<SimilarityResult> {
    let embedding = candidate.embedding.as_deref()?;
    let interests = candidate.interests.as_deref()?;

    let embedding_similarity = cosine_similarity(query.embedding, embedding);
    let interest_similarity = jaccard_similarity(query.interests, interests);

    Some(SimilarityResult {
        id: candidate.id,
        idfv: candidate.idfv.clone(),
        first_name: candidate.first_name.clone(),
        last_name: candidate.last_name.clone(),
        headline: candidate.headline.clone(),
        short_description: candidate.short_description.clone(),
        interests: interests.to_vec(),
        embedding_similarity,
        interest_similarity,
        combined_similarity: combined_score(embedding_similarity, interest_similarity, config),
    })
}
