//! Event creation and platform admin event management.

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    Json,
};
use domain::models::{
    CreateEventRequest, CreatedEvent, Event, EventDetails, PaymentPlan, Rsvp, UpdateEventRequest,
};
use domain::services::PaymentClaim;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_event_provisioned;
use crate::services::SessionCookies;

/// Create an event.
///
/// POST /api/events
///
/// With `paymentId` this is the self-service path and the payment must be an
/// approved, unused standard payment. Without it the caller must hold a
/// platform admin session.
pub async fn create_event(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<CreatedEvent>), ApiError> {
    let (claim, path) = match request.payment_id {
        Some(payment_id) => (
            Some(PaymentClaim {
                payment_id,
                reserved_plan: PaymentPlan::Standard,
            }),
            "standard",
        ),
        None => {
            let claims = state
                .admin_sessions
                .verify(SessionCookies::extract_session(&headers))?;
            tracing::debug!(session_id = %claims.jti, "Unpaid event creation by platform admin");
            (None, "admin")
        }
    };

    let created = state.provisioning.create_event(request, claim).await?;
    record_event_provisioned(path);
    info!(event_id = %created.event.id, slug = %created.event.slug, path, "Event created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// Create an event from an approved premium payment.
///
/// POST /api/admin/events/premium
pub async fn create_premium_event(
    State(state): State<AppState>,
    Json(request): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<CreatedEvent>), ApiError> {
    let payment_id = request
        .payment_id
        .ok_or_else(|| ApiError::Validation("paymentId is required".to_string()))?;
    let claim = PaymentClaim {
        payment_id,
        reserved_plan: PaymentPlan::Premium,
    };

    let created = state.provisioning.create_event(request, Some(claim)).await?;
    record_event_provisioned("premium");
    info!(event_id = %created.event.id, payment_id = %payment_id, "Premium event created");

    Ok((StatusCode::CREATED, Json(created)))
}

/// List all events, newest first.
///
/// GET /api/admin/events
pub async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    Ok(Json(state.event_service.list().await?))
}

/// GET /api/admin/events/:id
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventDetails>, ApiError> {
    Ok(Json(state.event_service.details(id).await?))
}

/// PUT /api/admin/events/:id
pub async fn update_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateEventRequest>,
) -> Result<Json<EventDetails>, ApiError> {
    let updated = state.event_service.update(id, request).await?;
    Ok(Json(state.event_service.with_config(updated).await?))
}

/// Toggle whether an event is publicly visible.
///
/// PATCH /api/admin/events/:id
///
/// Body: `{"is_active": bool}`. Any other shape is rejected.
pub async fn patch_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Event>, ApiError> {
    let is_active = parse_is_active(&body)?;
    Ok(Json(state.event_service.set_active(id, is_active).await?))
}

fn parse_is_active(body: &Value) -> Result<bool, ApiError> {
    body.get("is_active")
        .and_then(Value::as_bool)
        .ok_or_else(|| ApiError::Validation("is_active must be a boolean".to_string()))
}

/// Delete an event with its configuration and RSVPs.
///
/// DELETE /api/admin/events/:id
pub async fn delete_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    state.event_service.delete(id).await?;
    Ok(Json(json!({ "message": "Event deleted" })))
}

/// GET /api/admin/events/:id/rsvps
pub async fn event_rsvps(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Rsvp>>, ApiError> {
    let event = state.event_service.get(id).await?;
    Ok(Json(state.rsvps.list_for_event(event.id).await?))
}
