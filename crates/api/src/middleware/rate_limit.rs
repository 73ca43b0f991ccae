//! Rate limiting middleware.
//!
//! Limits password attempts per client address on the admin login and
//! event password endpoints.

use std::net::SocketAddr;
use std::num::NonZeroU32;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use governor::{clock::Clock, DefaultKeyedRateLimiter, Quota, RateLimiter};
use serde_json::json;

use crate::app::AppState;

/// Per-client limiter shared across all requests.
pub struct RateLimiterState {
    limiter: DefaultKeyedRateLimiter<String>,
    attempts_per_minute: u32,
    trust_proxy_headers: bool,
}

impl RateLimiterState {
    /// Returns `None` when the limit is zero (limiting disabled).
    ///
    /// Forwarding headers are only used as the client key when
    /// `trust_proxy_headers` is set; otherwise the socket peer address is.
    pub fn new(attempts_per_minute: u32, trust_proxy_headers: bool) -> Option<Self> {
        let per_minute = NonZeroU32::new(attempts_per_minute)?;
        Some(Self {
            limiter: RateLimiter::keyed(Quota::per_minute(per_minute)),
            attempts_per_minute,
            trust_proxy_headers,
        })
    }

    /// Check if a request from the given client should be allowed.
    /// Returns Ok(()) if allowed, or Err with retry_after seconds if rate limited.
    pub fn check(&self, client: &str) -> Result<(), u64> {
        let client = client.to_string();
        self.limiter.check_key(&client).map_err(|not_until| {
            let wait_time = not_until.wait_time_from(self.limiter.clock().now());
            // Return retry after in seconds, minimum 1 second
            wait_time.as_secs().max(1)
        })?;

        // keyed state grows with distinct clients
        if self.limiter.len() > 10_000 {
            self.limiter.retain_recent();
        }
        Ok(())
    }
}

impl std::fmt::Debug for RateLimiterState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiterState")
            .field("attempts_per_minute", &self.attempts_per_minute)
            .field("trust_proxy_headers", &self.trust_proxy_headers)
            .field("tracked_clients", &self.limiter.len())
            .finish()
    }
}

/// Identifies the caller by socket peer address.
///
/// Behind a trusted reverse proxy the first `X-Forwarded-For` hop, then
/// `X-Real-IP`, take precedence. Clients can set both headers freely, so
/// they are ignored unless `trust_proxy_headers` is set.
pub fn client_key(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    trust_proxy_headers: bool,
) -> String {
    let peer_key = || peer.map(|addr| addr.ip().to_string());
    if !trust_proxy_headers {
        return peer_key().unwrap_or_else(|| "unknown".to_string());
    }

    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let real_ip = headers
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    forwarded
        .or(real_ip)
        .map(str::to_string)
        .or_else(peer_key)
        .unwrap_or_else(|| "unknown".to_string())
}

/// Middleware that applies the password-attempt limit per client.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let Some(rate_limiter) = state.rate_limiter.as_ref() else {
        return next.run(req).await;
    };

    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0);
    let client = client_key(req.headers(), peer, rate_limiter.trust_proxy_headers);

    if let Err(retry_after) = rate_limiter.check(&client) {
        tracing::warn!(client = %client, path = %req.uri().path(), "Password attempts rate limited");
        return rate_limited_response(rate_limiter.attempts_per_minute, retry_after);
    }

    next.run(req).await
}

/// Create a rate limited response with proper headers and body.
fn rate_limited_response(limit: u32, retry_after: u64) -> Response {
    let body = json!({
        "error": "rate_limited",
        "message": format!("Too many attempts; limit is {} per minute", limit),
        "retryAfter": retry_after
    });

    let mut response = (StatusCode::TOO_MANY_REQUESTS, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::RETRY_AFTER, header::HeaderValue::from(retry_after));

    response
}
