use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::user::PublicProfile;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub idfv: String,
}

/// POST /api/v1/users
/// 201 on creation, 200 with the existing row when the IDFV is already known.
pub async fn handle_create_user(
    State(state): State<AppState>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<PublicProfile>), AppError> {
    let idfv = req.idfv.trim();
    if idfv.is_empty() {
        return Err(AppError::Validation("idfv must not be empty".to_string()));
    }

    let (user, created) = state.store.create(idfv).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(PublicProfile::from(&user))))
}

/// GET /api/v1/users/idfv/:idfv
pub async fn handle_get_user(
    State(state): State<AppState>,
    Path(idfv): Path<String>,
) -> Result<Json<PublicProfile>, AppError> {
    let user = state
        .store
        .get_by_idfv(&idfv)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {idfv} not found")))?;
    Ok(Json(PublicProfile::from(&user)))
}
