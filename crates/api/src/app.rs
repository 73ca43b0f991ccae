use axum::{
    http::{header, Method},
    middleware,
    routing::{get, post},
    Router,
};
use domain::services::{
    AdminSessionManager, CheckoutSettings, EventAccessService, EventService, EventStore,
    InMemoryStore, PaymentProvider, PaymentService, PaymentStore, ProvisioningService,
    RsvpService, RsvpStore,
};
use persistence::repositories::{EventRepository, PaymentRepository, RsvpRepository};
use shared::access_token::EventAccessSigner;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, rate_limit_middleware, require_platform_admin,
    security_headers_middleware, trace_id, RateLimiterState,
};
use crate::routes::{admin_session, event_access, events, health, payments, rsvps};
use crate::services::SessionCookies;

/// Storage backends behind the gateway traits.
#[derive(Clone)]
pub struct Stores {
    pub events: Arc<dyn EventStore>,
    pub payments: Arc<dyn PaymentStore>,
    pub rsvps: Arc<dyn RsvpStore>,
}

impl Stores {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            events: Arc::new(EventRepository::new(pool.clone())),
            payments: Arc::new(PaymentRepository::new(pool.clone())),
            rsvps: Arc::new(RsvpRepository::new(pool)),
        }
    }

    /// All three gateways backed by one in-process store.
    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            events: store.clone(),
            payments: store.clone(),
            rsvps: store,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub events: Arc<dyn EventStore>,
    pub admin_sessions: Arc<AdminSessionManager>,
    pub cookies: SessionCookies,
    pub event_access: Arc<EventAccessService>,
    pub payments: Arc<PaymentService>,
    pub provisioning: Arc<ProvisioningService>,
    pub event_service: Arc<EventService>,
    pub rsvps: Arc<RsvpService>,
    pub rate_limiter: Option<Arc<RateLimiterState>>,
}

impl AppState {
    pub fn new(config: Config, stores: Stores, provider: Arc<dyn PaymentProvider>) -> Self {
        let config = Arc::new(config);

        let admin_sessions = AdminSessionManager::new(
            &config.auth.admin_password,
            &config.auth.session_secret,
            config.auth.session_ttl_secs,
        );
        let signer =
            EventAccessSigner::new(&config.auth.session_secret, config.auth.event_token_ttl_secs);
        let checkout = CheckoutSettings::new(&config.server.base_url, config.payments.pricing());

        Self {
            events: stores.events.clone(),
            admin_sessions: Arc::new(admin_sessions),
            cookies: SessionCookies::new(config.security.cookie_secure),
            event_access: Arc::new(EventAccessService::new(stores.events.clone(), signer)),
            payments: Arc::new(PaymentService::new(
                stores.payments.clone(),
                provider,
                checkout,
            )),
            provisioning: Arc::new(ProvisioningService::new(
                stores.events.clone(),
                stores.payments.clone(),
            )),
            event_service: Arc::new(EventService::new(stores.events.clone())),
            rsvps: Arc::new(RsvpService::new(stores.events, stores.rsvps)),
            rate_limiter: RateLimiterState::new(
                config.security.login_attempts_per_minute,
                config.security.trust_proxy_headers,
            )
            .map(Arc::new),
            config,
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    // Credentialed requests need explicit methods and headers
    let origins: Vec<_> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|o| o.parse().ok())
        .collect();
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

pub fn create_app(config: Config, stores: Stores, provider: Arc<dyn PaymentProvider>) -> Router {
    let state = AppState::new(config, stores, provider);
    let cors = cors_layer(&state.config);
    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    // Password endpoints, limited per client address
    let password_routes = Router::new()
        .route("/api/admin-login", post(admin_session::admin_login))
        .route(
            "/api/events/by-slug/:slug/verify-password",
            post(event_access::verify_password),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Platform admin routes (admin_session cookie)
    let admin_routes = Router::new()
        .route("/api/check-auth", get(admin_session::check_auth))
        .route("/api/admin/events", get(events::list_events))
        .route(
            "/api/admin/events/premium",
            post(events::create_premium_event),
        )
        .route(
            "/api/admin/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .patch(events::patch_event)
                .delete(events::delete_event),
        )
        .route("/api/admin/events/:id/rsvps", get(events::event_rsvps))
        .route("/api/admin/rsvps", get(rsvps::list_rsvps))
        .route(
            "/api/admin/payments/premium-pending",
            get(payments::premium_pending),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_platform_admin,
        ));

    // Public routes; event host routes authorize with a bearer event token
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready))
        .route("/metrics", get(metrics_handler))
        .route("/api/admin-logout", post(admin_session::admin_logout))
        .route("/api/events", post(events::create_event))
        .route(
            "/api/events/by-slug/:slug",
            get(event_access::public_event).put(event_access::update_own_event),
        )
        .route(
            "/api/events/by-slug/:slug/rsvps",
            get(event_access::own_event_rsvps),
        )
        .route("/api/rsvps", post(rsvps::submit_rsvp))
        .route(
            "/api/payments/create-preference",
            post(payments::create_preference),
        )
        .route("/api/payments/webhook", post(payments::webhook))
        .route("/api/payments/verify", get(payments::verify_payment));

    Router::new()
        .merge(public_routes)
        .merge(password_routes)
        .merge(admin_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            security_headers_middleware,
        ))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
