//! Platform admin login, logout and session check.

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Extension, Json,
};
use domain::services::SessionError;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_admin_login;
use crate::middleware::AdminSession;
use crate::services::SessionCookies;

/// Body of the password endpoints.
#[derive(Debug, Deserialize)]
pub struct PasswordRequest {
    #[serde(default)]
    pub password: String,
}

/// Exchange the platform admin password for a session cookie.
///
/// POST /api/admin-login
pub async fn admin_login(
    State(state): State<AppState>,
    Json(request): Json<PasswordRequest>,
) -> Result<Response, ApiError> {
    let session = state.admin_sessions.login(&request.password).map_err(|err| {
        let outcome = login_failure_outcome(&err);
        if outcome == "rejected" {
            warn!("Rejected platform admin login");
        }
        record_admin_login(outcome);
        ApiError::from(err)
    })?;

    record_admin_login("success");
    info!(expires_at = %session.expires_at, "Platform admin logged in");

    let mut headers = HeaderMap::new();
    SessionCookies::append(&mut headers, &state.cookies.session_cookie(&session));
    Ok((headers, Json(json!({ "success": true }))).into_response())
}

/// Metric label for a failed login.
fn login_failure_outcome(err: &SessionError) -> &'static str {
    match err {
        SessionError::Misconfigured(_) => "misconfigured",
        _ => "rejected",
    }
}

/// Clear the session cookie. Always succeeds.
///
/// POST /api/admin-logout
pub async fn admin_logout(State(state): State<AppState>) -> Response {
    let mut headers = HeaderMap::new();
    SessionCookies::append(&mut headers, &state.cookies.clearing_cookie());
    (headers, Json(json!({ "success": true }))).into_response()
}

/// Report whether the caller holds a valid admin session.
///
/// GET /api/check-auth
///
/// Only reached through the admin guard, so an invalid session never gets here.
pub async fn check_auth(Extension(AdminSession(claims)): Extension<AdminSession>) -> Json<Value> {
    tracing::debug!(session_id = %claims.jti, "Admin session checked");
    Json(json!({ "authenticated": true }))
}
