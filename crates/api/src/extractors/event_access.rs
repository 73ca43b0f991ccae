//! Per-event client access extractor.
//!
//! Resolves the `:slug` path parameter and checks the Bearer event access
//! token against it.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use domain::models::Event;

use crate::app::AppState;
use crate::error::ApiError;

/// Event the caller holds a valid access token for.
#[derive(Debug, Clone)]
pub struct AuthorizedEvent(pub Event);

#[async_trait]
impl FromRequestParts<AppState> for AuthorizedEvent {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(slug) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound("Event not found".to_string()))?;

        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::Unauthorized("Unauthorized".to_string()))?;

        let event = state.event_access.authorize(&slug, bearer.token()).await?;
        Ok(AuthorizedEvent(event))
    }
}
