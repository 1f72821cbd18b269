pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::onboarding::handlers as onboarding;
use crate::similarity::handlers as similarity;
use crate::state::AppState;
use crate::users::handlers as users;

/// Base64 inflates a 10 MiB resume to ~13.4 MiB, plus the JSON envelope.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Users
        .route("/api/v1/users", post(users::handle_create_user))
        .route("/api/v1/users/idfv/:idfv", get(users::handle_get_user))
        .route("/api/v1/users/similar", post(similarity::handle_find_similar))
        // Onboarding
        .route("/api/v1/onboarding", post(onboarding::handle_onboard))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}
