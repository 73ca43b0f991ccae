//! Authentication middleware.
//!
//! Guards platform admin routes with the `admin_session` cookie.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use shared::jwt::SessionClaims;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::trace_id::get_request_id;
use crate::services::SessionCookies;

/// Verified platform admin session, stored in request extensions.
#[derive(Debug, Clone)]
pub struct AdminSession(pub SessionClaims);

/// Middleware that requires a valid platform admin session cookie.
///
/// Rejects with 401 for an absent, malformed, expired, or foreign-signed
/// token and with 500 when the session secrets are not configured.
pub async fn require_platform_admin(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let token = SessionCookies::extract_session(req.headers());

    match state.admin_sessions.verify(token) {
        Ok(claims) => {
            req.extensions_mut().insert(AdminSession(claims));
            next.run(req).await
        }
        Err(err) => {
            tracing::debug!(
                request_id = %get_request_id(req.extensions()),
                path = %req.uri().path(),
                "Admin session required"
            );
            ApiError::from(err).into_response()
        }
    }
}
