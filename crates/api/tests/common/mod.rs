//! Common test utilities for integration tests.
//!
//! The application is wired to the in-memory gateway and the mock payment
//! provider, so these tests run without PostgreSQL or network access.

// Not every integration test uses every helper.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::ConnectInfo,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use domain::services::{InMemoryStore, MockPaymentProvider, PaymentProvider};
use fake::faker::internet::en::SafeEmail;
use fake::faker::name::en::{FirstName, LastName};
use fake::Fake;
use rsvp_api::app::{create_app, Stores};
use rsvp_api::config::{
    AuthConfig, Config, DatabaseConfig, LoggingConfig, PaymentsConfig, SecurityConfig,
    ServerConfig,
};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_PASSWORD: &str = "platform-admin-pass";
pub const SESSION_SECRET: &str = "integration-session-secret-0123456789";
pub const BASE_URL: &str = "https://reservalafecha.test";

/// Configuration with rate limiting off and plain-HTTP cookies.
pub fn test_config() -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
            request_timeout_secs: 30,
            base_url: BASE_URL.to_string(),
        },
        database: DatabaseConfig {
            url: String::new(),
            max_connections: 5,
            min_connections: 1,
            connect_timeout_secs: 10,
            idle_timeout_secs: 600,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        security: SecurityConfig {
            cors_origins: vec![],
            cookie_secure: false,
            login_attempts_per_minute: 0, // Disable rate limiting for tests
            hsts_enabled: false,
            trust_proxy_headers: false,
        },
        auth: AuthConfig {
            admin_password: ADMIN_PASSWORD.to_string(),
            session_secret: SESSION_SECRET.to_string(),
            session_ttl_secs: 3600,
            event_token_ttl_secs: 3600,
        },
        payments: PaymentsConfig::default(),
    }
}

/// Application under test plus handles on its backends.
pub struct TestApp {
    pub router: Router,
    pub store: Arc<InMemoryStore>,
    pub provider: Arc<MockPaymentProvider>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    pub fn with_config(config: Config) -> Self {
        Self::build(config, MockPaymentProvider::new())
    }

    /// App whose payment provider fails every call.
    pub fn with_failing_provider() -> Self {
        Self::build(test_config(), MockPaymentProvider::failing())
    }

    fn build(config: Config, provider: MockPaymentProvider) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let provider = Arc::new(provider);
        let router = create_app(
            config,
            Stores::in_memory(store.clone()),
            provider.clone() as Arc<dyn PaymentProvider>,
        );
        Self {
            router,
            store,
            provider,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Logs in as platform admin and returns the `Cookie` header value.
    pub async fn admin_cookie(&self) -> String {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/admin-login",
                json!({ "password": ADMIN_PASSWORD }),
            ))
            .await;
        assert!(response.status().is_success(), "admin login failed");
        session_cookie_pair(&response)
    }

    /// Creates an event through the admin path.
    pub async fn create_admin_event(&self, slug: &str, password: &str) -> Value {
        let cookie = self.admin_cookie().await;
        let request = with_cookie(
            json_request(Method::POST, "/api/events", event_body(slug, Some(password))),
            &cookie,
        );
        let response = self.send(request).await;
        let status = response.status();
        let body = parse_response_body(response).await;
        assert_eq!(status.as_u16(), 201, "event creation failed: {}", body);
        body
    }

    /// Starts a checkout and returns the local payment id.
    pub async fn start_checkout(&self, plan: &str) -> Uuid {
        let response = self
            .send(json_request(
                Method::POST,
                "/api/payments/create-preference",
                json!({ "plan": plan, "email": fake_email() }),
            ))
            .await;
        let body = parse_response_body(response).await;
        body["paymentId"]
            .as_str()
            .and_then(|id| Uuid::parse_str(id).ok())
            .unwrap_or_else(|| panic!("Missing paymentId in response: {}", body))
    }

    /// Delivers a provider webhook reporting `status` for the payment.
    pub async fn notify(&self, provider_payment_id: &str, payment_id: Uuid, status: &str) -> Response {
        self.provider
            .set_status(provider_payment_id, payment_id, status);
        self.send(json_request(
            Method::POST,
            "/api/payments/webhook",
            json!({ "type": "payment", "data": { "id": provider_payment_id } }),
        ))
        .await
    }

    /// A payment of the given plan that the provider has approved.
    pub async fn approved_payment(&self, plan: &str) -> Uuid {
        let payment_id = self.start_checkout(plan).await;
        let provider_id = format!("mp-{}", payment_id.simple());
        let response = self.notify(&provider_id, payment_id, "approved").await;
        assert!(response.status().is_success(), "approval webhook failed");
        payment_id
    }

    pub async fn event_token(&self, slug: &str, password: &str) -> String {
        let response = self
            .send(json_request(
                Method::POST,
                &format!("/api/events/by-slug/{}/verify-password", slug),
                json!({ "password": password }),
            ))
            .await;
        let body = parse_response_body(response).await;
        body["token"]
            .as_str()
            .unwrap_or_else(|| panic!("Missing token in response: {}", body))
            .to_string()
    }
}

/// Minimal valid event creation body.
pub fn event_body(slug: &str, password: Option<&str>) -> Value {
    let mut body = json!({
        "name": format!("Evento {}", slug),
        "slug": slug,
        "type": "wedding",
        "date": "2026-12-12T20:00:00Z",
        "location": "Salón Dorado",
    });
    if let Some(password) = password {
        body["password"] = json!(password);
    }
    body
}

/// RSVP body with a random guest name.
pub fn rsvp_body(event_id: &str) -> Value {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();
    json!({
        "event_id": event_id,
        "first_name": first_name,
        "last_name": last_name,
        "attendance": "yes",
        "over_ten": 2,
        "under_five": 1,
    })
}

pub fn fake_email() -> String {
    SafeEmail().fake()
}

/// Helper to create a JSON request.
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn with_cookie(mut request: Request<Body>, cookie: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    request
}

pub fn with_bearer(mut request: Request<Body>, token: &str) -> Request<Body> {
    request.headers_mut().insert(
        header::AUTHORIZATION,
        format!("Bearer {}", token).parse().unwrap(),
    );
    request
}

/// Marks the request as arriving from `peer`, as the server's connect info would.
pub fn from_peer(mut request: Request<Body>, peer: &str) -> Request<Body> {
    let addr: SocketAddr = peer.parse().unwrap();
    request.extensions_mut().insert(ConnectInfo(addr));
    request
}

pub fn with_forwarded_for(mut request: Request<Body>, forwarded: &str) -> Request<Body> {
    request
        .headers_mut()
        .insert("x-forwarded-for", forwarded.parse().unwrap());
    request
}

/// `name=value` part of the response's Set-Cookie header.
pub fn session_cookie_pair(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .expect("Missing Set-Cookie header")
        .to_string()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
