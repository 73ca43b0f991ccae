//! Checkout, provider webhook, and payment lookup routes.

use axum::{
    extract::{Query, State},
    Json,
};
use domain::models::{CheckoutRequest, CheckoutSession, Payment, ProviderNotification};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_webhook;

/// Start a hosted checkout for a plan.
///
/// POST /api/payments/create-preference
///
/// The price comes from server configuration; any amount in the body is
/// ignored.
pub async fn create_preference(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutSession>, ApiError> {
    request.validate()?;
    let session = state.payments.initiate_checkout(&request).await?;
    Ok(Json(session))
}

/// Receive a payment notification from the provider.
///
/// POST /api/payments/webhook
///
/// Unknown payments are 404; provider and storage failures are 5xx and get
/// redelivered by the provider.
pub async fn webhook(
    State(state): State<AppState>,
    Json(notification): Json<ProviderNotification>,
) -> Result<Json<Value>, ApiError> {
    match state
        .payments
        .handle_provider_notification(&notification)
        .await
    {
        Ok(outcome) => {
            record_webhook(outcome.label());
            info!(outcome = outcome.label(), "Payment webhook processed");
            Ok(Json(json!({ "received": true })))
        }
        Err(err) => {
            record_webhook("failed");
            warn!(error = %err, kind = ?notification.kind, "Payment webhook failed");
            Err(err.into())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct VerifyQuery {
    pub payment_id: Option<String>,
}

/// Look up a payment after the checkout redirect.
///
/// GET /api/payments/verify?payment_id=<uuid>
pub async fn verify_payment(
    State(state): State<AppState>,
    Query(query): Query<VerifyQuery>,
) -> Result<Json<Value>, ApiError> {
    let payment_id = parse_payment_id(query.payment_id.as_deref())?;
    let summary = state.payments.verify(payment_id).await?;
    Ok(Json(json!({ "payment": summary })))
}

fn parse_payment_id(raw: Option<&str>) -> Result<Uuid, ApiError> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::Validation("payment_id is required".to_string()))?;
    Uuid::parse_str(raw).map_err(|_| ApiError::Validation("Invalid payment_id".to_string()))
}

/// Approved premium payments that have not been turned into an event yet.
///
/// GET /api/admin/payments/premium-pending
pub async fn premium_pending(State(state): State<AppState>) -> Result<Json<Vec<Payment>>, ApiError> {
    Ok(Json(state.payments.list_pending_premium().await?))
}
