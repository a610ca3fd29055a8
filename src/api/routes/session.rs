//! Session Routes
//!
//! - POST /api/v1/session - Establish an anonymous session

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::{SessionRequest, SessionResponse};
use crate::api::error::ApiResult;
use crate::api::state::AppState;

/// POST /api/v1/session
///
/// Reuses `existing` when the issuer recognises it.
pub async fn establish_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> ApiResult<Json<SessionResponse>> {
    let identity = state
        .identity
        .establish_anonymous_session(req.existing.as_ref())
        .await?;

    tracing::debug!(
        owner = %identity.owner_key(),
        reused = req.existing.as_ref() == Some(&identity),
        "Session established"
    );
    Ok(Json(SessionResponse { identity }))
}
