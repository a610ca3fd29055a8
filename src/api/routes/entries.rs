//! Entry Routes
//!
//! - GET /api/v1/entries - Full guestbook, newest first
//! - POST /api/v1/entries - Create an entry
//! - DELETE /api/v1/entries/:id - Delete an entry the caller owns
//! - GET /api/v1/entries/stream - Live snapshots over SSE

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures_util::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use crate::api::dto::{
    CreateEntryRequest, CreateEntryResponse, EntryListResponse, ERROR_EVENT, SESSION_HEADER,
    SNAPSHOT_EVENT,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::identity::SessionIdentity;
use crate::store::{Attendance, NewEntry, ValidationError};

/// GET /api/v1/entries
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<EntryListResponse>> {
    let entries = state.store.list_entries().await?;
    Ok(Json(EntryListResponse {
        total: entries.len(),
        entries,
    }))
}

/// POST /api/v1/entries
///
/// Identity from the session header; id and timestamp assigned by the store.
pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreateEntryRequest>,
) -> ApiResult<(StatusCode, Json<CreateEntryResponse>)> {
    let identity = session_from_headers(&headers)?;
    let attendance = parse_attendance(req.attendance.as_deref())?;

    let id = state
        .store
        .create_entry(NewEntry::new(
            req.author_name,
            attendance,
            req.message,
            identity,
        ))
        .await?;

    Ok((StatusCode::CREATED, Json(CreateEntryResponse { id })))
}

/// DELETE /api/v1/entries/:id
pub async fn delete_entry(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> ApiResult<StatusCode> {
    let identity = session_from_headers(&headers)?;
    state.store.delete_entry(&id, &identity).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/entries/stream
///
/// `snapshot` events carry the full list as JSON: the current one first,
/// then one per change. A failing feed emits one `error` event and ends.
pub async fn stream_entries(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Sse<impl Stream<Item = Result<Event, Infallible>>>> {
    let snapshots = state.store.subscribe().await?;

    let events = snapshots
        .scan(false, |failed, next| {
            if *failed {
                return futures_util::future::ready(None);
            }
            let event = match next {
                Ok(entries) => snapshot_event(&entries),
                Err(e) => {
                    *failed = true;
                    Event::default().event(ERROR_EVENT).data(e.to_string())
                }
            };
            futures_util::future::ready(Some(Ok(event)))
        })
        .boxed();

    let keep_alive = KeepAlive::new().interval(Duration::from_secs(state.config.sse_keep_alive_secs));
    Ok(Sse::new(events).keep_alive(keep_alive))
}

fn snapshot_event<T: serde::Serialize>(entries: &T) -> Event {
    match Event::default().event(SNAPSHOT_EVENT).json_data(entries) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(error = %e, "Failed to encode snapshot");
            Event::default().event(ERROR_EVENT).data("snapshot encoding failed")
        }
    }
}

fn session_from_headers(headers: &HeaderMap) -> ApiResult<SessionIdentity> {
    headers
        .get(SESSION_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(SessionIdentity::new)
        .ok_or_else(|| ApiError::Unauthorized(format!("{} header is required", SESSION_HEADER)))
}

fn parse_attendance(raw: Option<&str>) -> ApiResult<Attendance> {
    let raw = raw.map(str::trim).filter(|value| !value.is_empty());
    match raw {
        None => Err(ApiError::Store(ValidationError::MissingAttendance.into())),
        Some(value) => value.parse().map_err(ApiError::Validation),
    }
}
