//! Event host routes, addressed by slug.
//!
//! The host exchanges the event password for a bearer token, then uses it
//! to read guest answers and edit the event.

use axum::{
    extract::{Path, State},
    Json,
};
use domain::models::{EventDetails, Rsvp, UpdateEventRequest};
use domain::services::{AccessError, AccessGrant};

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::AuthorizedEvent;
use crate::middleware::metrics::record_event_access;
use crate::routes::admin_session::PasswordRequest;

/// Exchange the event password for an access token.
///
/// POST /api/events/by-slug/:slug/verify-password
pub async fn verify_password(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<PasswordRequest>,
) -> Result<Json<AccessGrant>, ApiError> {
    let result = state
        .event_access
        .request_access(&slug, &request.password)
        .await;

    record_event_access(match &result {
        Ok(_) => "granted",
        Err(AccessError::EventNotFound) => "not_found",
        Err(AccessError::InvalidPassword) => "denied",
        Err(_) => "error",
    });

    Ok(Json(result?))
}

/// Public view of an active event and its form configuration.
///
/// GET /api/events/by-slug/:slug
pub async fn public_event(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<EventDetails>, ApiError> {
    Ok(Json(state.event_service.public_by_slug(&slug).await?))
}

/// Guest answers for the caller's own event.
///
/// GET /api/events/by-slug/:slug/rsvps
pub async fn own_event_rsvps(
    State(state): State<AppState>,
    AuthorizedEvent(event): AuthorizedEvent,
) -> Result<Json<Vec<Rsvp>>, ApiError> {
    Ok(Json(state.rsvps.list_for_event(event.id).await?))
}

/// Edit the caller's own event.
///
/// PUT /api/events/by-slug/:slug
pub async fn update_own_event(
    State(state): State<AppState>,
    AuthorizedEvent(event): AuthorizedEvent,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<EventDetails>, ApiError> {
    let updated = state.event_service.update(event.id, request).await?;
    tracing::info!(event_id = %updated.id, "Event updated by host");
    Ok(Json(state.event_service.with_config(updated).await?))
}
