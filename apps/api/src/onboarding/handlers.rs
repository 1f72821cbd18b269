use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::onboarding::pipeline::{onboard, OnboardingRequest, OnboardingResponse};
use crate::state::AppState;

/// POST /api/v1/onboarding
pub async fn handle_onboard(
    State(state): State<AppState>,
    Json(req): Json<OnboardingRequest>,
) -> Result<Json<OnboardingResponse>, AppError> {
    let response = onboard(&state.onboarding_deps(), &req).await?;
    Ok(Json(response))
}
