//! Guest RSVP routes.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::{CreateRsvpRequest, Rsvp};

use crate::app::AppState;
use crate::error::ApiError;

/// Submit a guest's answer for an active event.
///
/// POST /api/rsvps
pub async fn submit_rsvp(
    State(state): State<AppState>,
    Json(request): Json<CreateRsvpRequest>,
) -> Result<(StatusCode, Json<Rsvp>), ApiError> {
    let rsvp = state.rsvps.submit(request).await?;
    Ok((StatusCode::CREATED, Json(rsvp)))
}

/// Every RSVP across all events, newest first.
///
/// GET /api/admin/rsvps
pub async fn list_rsvps(State(state): State<AppState>) -> Result<Json<Vec<Rsvp>>, ApiError> {
    Ok(Json(state.rsvps.list_all().await?))
}
