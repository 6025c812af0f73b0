use axum::{extract::State, http::StatusCode};

use crate::state::AppState;

/// Handler for `GET /readyz`.
pub async fn readyz(State(state): State<AppState>) -> StatusCode {
    boxoffice_core::health::database_ready(&state.db).await
}
