//! Invitation Routes
//!
//! - GET /api/v1/invitation?to= - Guest name, countdown, e-ticket, profile
//! - GET /api/v1/qr?to= - E-ticket image (or a redirect to the placeholder)

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use chrono::Utc;
use std::sync::Arc;

use crate::api::dto::InvitationQuery;
use crate::api::state::AppState;
use crate::invitation::{GuestName, InvitationView, QrImage, QrTicket};

/// GET /api/v1/invitation
pub async fn get_invitation(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InvitationQuery>,
) -> Json<InvitationView> {
    let guest = GuestName::from_param(query.to.as_deref());
    Json(InvitationView::build(
        guest,
        &state.invitation,
        state.qr.template(),
        Utc::now(),
    ))
}

/// GET /api/v1/qr
///
/// Issues a fresh ticket and proxies its image.
pub async fn get_qr_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<InvitationQuery>,
) -> Response {
    let guest = GuestName::from_param(query.to.as_deref());
    let ticket = QrTicket::for_guest(&guest, &state.invitation, state.qr.template());

    match state.qr.fetch(&ticket).await {
        QrImage::Image {
            content_type,
            bytes,
        } => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
        QrImage::Placeholder(url) => Redirect::temporary(&url).into_response(),
    }
}
