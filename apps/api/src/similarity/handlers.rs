use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::similarity::search::{find_similar, FindSimilarResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct SimilarUsersRequest {
    pub idfv: String,
}

/// POST /api/v1/users/similar
pub async fn handle_find_similar(
    State(state): State<AppState>,
    Json(req): Json<SimilarUsersRequest>,
) -> Result<Json<FindSimilarResponse>, AppError> {
    let idfv = req.idfv.trim();
    if idfv.is_empty() {
        return Err(AppError::Validation("idfv must not be empty".to_string()));
    }
    let response = find_similar(state.store.as_ref(), &state.ranking, idfv).await?;
    Ok(Json(response))
}
