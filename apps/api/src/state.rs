use std::sync::Arc;

use crate::embedding::EmbeddingProvider;
use crate::linkedin::LinkedInProvider;
use crate::llm_client::LanguageModel;
use crate::onboarding::pipeline::OnboardingDeps;
use crate::similarity::scoring::RankingConfig;
use crate::store::ProfileStore;

/// Shared application state injected into all route handlers via Axum extractors.
/// Every collaborator sits behind a trait object so tests can substitute doubles.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ProfileStore>,
    pub llm: Arc<dyn LanguageModel>,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub linkedin: Arc<dyn LinkedInProvider>,
    pub ranking: RankingConfig,
    /// Vector length every stored embedding must have.
    pub embedding_dimensions: usize,
}

impl AppState {
    pub fn onboarding_deps(&self) -> OnboardingDeps<'_> {
        OnboardingDeps {
            store: self.store.as_ref(),
            llm: self.llm.as_ref(),
            embedder: self.embedder.as_ref(),
            linkedin: self.linkedin.as_ref(),
            embedding_dimensions: self.embedding_dimensions,
        }
    }
}
