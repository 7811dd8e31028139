//! Liveness probe

use axum::extract::State;

use crate::error::Result;
use crate::web::state::AppState;

/// Handler for `GET /health`. Fails when the database cannot be reached.
pub async fn health(State(state): State<AppState>) -> Result<&'static str> {
    state.storage()?.is_empty()?;
    Ok("ok")
}
