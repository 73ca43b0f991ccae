use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::{
    AccessError, EventError, PaymentError, ProviderError, ProvisioningError, RsvpError,
    SessionError, StoreError,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Rate limited")]
    RateLimited,

    /// A required secret or setting is missing at runtime.
    #[error("Server misconfiguration: {0}")]
    Misconfigured(String),

    /// The checkout provider failed or answered unexpectedly.
    #[error("Payment provider error: {0}")]
    Provider(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "unauthorized", msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg.clone()),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, "validation_error", msg.clone()),
            ApiError::RateLimited => (
                StatusCode::TOO_MANY_REQUESTS,
                "rate_limited",
                "Too many requests. Please try again later.".into(),
            ),
            ApiError::Misconfigured(msg) => {
                tracing::error!("Server misconfiguration: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "server_misconfigured",
                    "Server is not configured correctly; contact the administrator".into(),
                )
            }
            ApiError::Provider(msg) => {
                tracing::error!("Payment provider error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "payment_provider_error",
                    msg.clone(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".into(),
                )
            }
        };

        let body = ErrorBody {
            error: error_code.into(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let details: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => message.to_string(),
                    None => format!("{} is invalid", field),
                })
            })
            .collect();

        let message = match details.len() {
            0 => errors.to_string(),
            1 => details[0].clone(),
            n => format!("{} validation errors", n),
        };

        ApiError::Validation(message)
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(_) => ApiError::Conflict("Resource already exists".into()),
            StoreError::Backend(msg) => ApiError::Internal(format!("Storage error: {}", msg)),
        }
    }
}

impl From<ProviderError> for ApiError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::NotConfigured(msg) => ApiError::Misconfigured(msg),
            // unknown or forged webhook reference
            ProviderError::NotFound(_) => ApiError::NotFound("Payment not found".into()),
            other => ApiError::Provider(other.to_string()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Misconfigured(msg) => ApiError::Misconfigured(msg),
            SessionError::InvalidCredentials => ApiError::Unauthorized("Invalid password".into()),
            SessionError::InvalidSession => ApiError::Unauthorized("Not authenticated".into()),
            SessionError::Token(e) => ApiError::Internal(format!("Session token error: {}", e)),
        }
    }
}

impl From<AccessError> for ApiError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::EventNotFound => ApiError::NotFound("Event not found".into()),
            AccessError::InvalidPassword => ApiError::Unauthorized("Invalid password".into()),
            AccessError::InvalidToken => ApiError::Unauthorized("Unauthorized".into()),
            AccessError::Verification(msg) => ApiError::Internal(msg),
            AccessError::Store(e) => e.into(),
        }
    }
}

impl From<PaymentError> for ApiError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidPlan => ApiError::Validation("Invalid plan".into()),
            PaymentError::MissingReference => ApiError::Validation(err.to_string()),
            PaymentError::PaymentNotFound => ApiError::NotFound("Payment not found".into()),
            PaymentError::ConcurrentUpdate => ApiError::Internal(err.to_string()),
            PaymentError::Provider(e) => e.into(),
            PaymentError::Store(e) => e.into(),
        }
    }
}

impl From<ProvisioningError> for ApiError {
    fn from(err: ProvisioningError) -> Self {
        match err {
            ProvisioningError::Validation(errors) => errors.into(),
            ProvisioningError::InvalidField(msg) => ApiError::Validation(msg),
            ProvisioningError::PaymentNotFound => ApiError::NotFound(err.to_string()),
            ProvisioningError::PaymentNotApproved | ProvisioningError::WrongPlan => {
                ApiError::Validation(err.to_string())
            }
            ProvisioningError::PaymentAlreadyUsed | ProvisioningError::SlugTaken(_) => {
                ApiError::Conflict(err.to_string())
            }
            ProvisioningError::Hashing(msg) => ApiError::Internal(msg),
            ProvisioningError::Store(e) => e.into(),
        }
    }
}

impl From<EventError> for ApiError {
    fn from(err: EventError) -> Self {
        match err {
            EventError::NotFound => ApiError::NotFound("Event not found".into()),
            EventError::Validation(errors) => errors.into(),
            EventError::InvalidField(msg) => ApiError::Validation(msg),
            EventError::SlugTaken(_) => ApiError::Conflict(err.to_string()),
            EventError::Hashing(msg) => ApiError::Internal(msg),
            EventError::Store(e) => e.into(),
        }
    }
}

impl From<RsvpError> for ApiError {
    fn from(err: RsvpError) -> Self {
        match err {
            RsvpError::EventNotFound => ApiError::NotFound("Event not found".into()),
            RsvpError::Validation(errors) => errors.into(),
            RsvpError::GuestLimit(msg) => ApiError::Validation(msg),
            RsvpError::Store(e) => e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_codes() {
        let cases = [
            (ApiError::Unauthorized("x".into()), StatusCode::UNAUTHORIZED),
            (ApiError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (ApiError::Conflict("x".into()), StatusCode::CONFLICT),
            (ApiError::Validation("x".into()), StatusCode::BAD_REQUEST),
            (ApiError::RateLimited, StatusCode::TOO_MANY_REQUESTS),
            (ApiError::Misconfigured("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Provider("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
            (ApiError::Internal("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let body = body_json(ApiError::Internal("connection refused".into()).into_response()).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
    }

    #[tokio::test]
    async fn test_misconfigured_points_at_configuration() {
        let body =
            body_json(ApiError::Misconfigured("session secret".into()).into_response()).await;
        assert_eq!(body["error"], "server_misconfigured");
        assert!(body["message"].as_str().unwrap().contains("configured"));
        assert!(!body["message"].as_str().unwrap().contains("session secret"));
    }

    #[test]
    fn test_auth_failures_stay_generic() {
        let wrong: ApiError = AccessError::InvalidPassword.into();
        let login: ApiError = SessionError::InvalidCredentials.into();
        assert_eq!(wrong.to_string(), "Unauthorized: Invalid password");
        assert_eq!(login.to_string(), "Unauthorized: Invalid password");
    }

    #[test]
    fn test_payment_gate_failures_stay_specific() {
        let used: ApiError = ProvisioningError::PaymentAlreadyUsed.into();
        assert!(matches!(&used, ApiError::Conflict(m) if m.contains("already been used")));

        let plan: ApiError = ProvisioningError::WrongPlan.into();
        assert!(matches!(&plan, ApiError::Validation(m) if m.contains("different plan")));

        let pending: ApiError = ProvisioningError::PaymentNotApproved.into();
        assert!(matches!(&pending, ApiError::Validation(m) if m.contains("not been approved")));

        let missing: ApiError = ProvisioningError::PaymentNotFound.into();
        assert!(matches!(missing, ApiError::NotFound(_)));
    }

    #[test]
    fn test_session_misconfiguration_is_not_unauthorized() {
        let err: ApiError = SessionError::Misconfigured("admin password".into()).into();
        assert!(matches!(err, ApiError::Misconfigured(_)));
    }

    #[test]
    fn test_store_conflict_maps_to_conflict() {
        let err: ApiError = StoreError::Conflict("events_slug_key".into()).into();
        assert!(matches!(err, ApiError::Conflict(_)));
    }

    #[test]
    fn test_provider_errors_map_to_provider() {
        let err: ApiError = PaymentError::Provider(ProviderError::Timeout).into();
        assert!(matches!(err, ApiError::Provider(_)));
    }

    #[tokio::test]
    async fn test_missing_provider_credentials_are_misconfiguration() {
        let err: ApiError =
            PaymentError::Provider(ProviderError::NotConfigured("access token".into())).into();
        assert!(matches!(err, ApiError::Misconfigured(_)));

        let body = body_json(err.into_response()).await;
        assert_eq!(body["error"], "server_misconfigured");
    }

    #[test]
    fn test_unknown_provider_payment_is_not_found() {
        let err: ApiError = PaymentError::Provider(ProviderError::NotFound("999".into())).into();
        assert!(matches!(err, ApiError::NotFound(_)));
        assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(format!("{}", ApiError::RateLimited), "Rate limited");
        assert_eq!(
            format!("{}", ApiError::NotFound("test".to_string())),
            "Not found: test"
        );
    }
}
