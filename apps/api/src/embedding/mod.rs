//! Embedding Generator — maps the long-form profile summary to a fixed-length vector.
//!
//! Every stored embedding must come from the same model with the same
//! dimensionality, otherwise cosine similarity between users is meaningless.
//! `generate_embedding` enforces that before anything is persisted.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::errors::PipelineError;
use crate::text::truncate_chars;

pub const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";
pub const DEFAULT_EMBEDDING_DIMENSIONS: usize = 1536;
/// Longest prefix of the summary submitted to the embedding model.
pub const MAX_EMBEDDING_INPUT_CHARS: usize = 8_000;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Provider returned no embedding")]
    Empty,
}

/// Text → vector. Implementations must not retry on their own.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Client for OpenAI-compatible `/v1/embeddings` endpoints.
#[derive(Clone)]
pub struct OpenAiEmbeddingClient {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingClient {
    pub fn new(endpoint: String, model: String, api_key: String) -> Result<Self, EmbeddingError> {
        Ok(Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(60))
                .build()?,
            endpoint,
            model,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                input: text,
                model: &self.model,
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response.json().await?;
        let embedding = body
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::Empty)?;

        debug!("Embedding received: {} dimensions", embedding.len());
        Ok(embedding)
    }
}

/// Embeds the (truncated) summary and validates the vector shape.
pub async fn generate_embedding(
    provider: &dyn EmbeddingProvider,
    text: &str,
    expected_dimensions: usize,
) -> Result<Vec<f32>, PipelineError> {
    let input = truncate_chars(text.trim(), MAX_EMBEDDING_INPUT_CHARS);
    if input.is_empty() {
        return Err(PipelineError::EmbeddingFailed(
            "cannot embed an empty summary".to_string(),
        ));
    }

    let embedding = provider
        .embed(input)
        .await
        .map_err(|e| PipelineError::EmbeddingFailed(e.to_string()))?;

    if embedding.is_empty() {
        return Err(PipelineError::EmbeddingFailed(
            "provider returned an empty vector".to_string(),
        ));
    }
    if embedding.len() != expected_dimensions {
        return Err(PipelineError::EmbeddingFailed(format!(
            "expected {expected_dimensions} dimensions, got {}",
            embedding.len()
        )));
    }
    if embedding.iter().any(|v| !v.is_finite()) {
        return Err(PipelineError::EmbeddingFailed(
            "vector contains non-finite values".to_string(),
        ));
    }

    info!(
        "Generated {}-dimension embedding from {} chars",
        embedding.len(),
        input.chars().count()
    );
    Ok(embedding)
}
