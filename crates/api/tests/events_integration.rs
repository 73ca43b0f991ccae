//! Integration tests for platform admin event management and RSVPs.
//!
//! Run with: cargo test --test events_integration

mod common;

use axum::http::{Method, StatusCode};
use common::{
    event_body, get_request, json_request, parse_response_body, rsvp_body, with_cookie, TestApp,
};
use serde_json::json;
use uuid::Uuid;

// ============================================================================
// Admin guard
// ============================================================================

#[tokio::test]
async fn test_admin_routes_require_session() {
    let app = TestApp::new();
    let id = Uuid::new_v4();

    let requests = vec![
        get_request("/api/admin/events"),
        get_request(&format!("/api/admin/events/{}", id)),
        get_request(&format!("/api/admin/events/{}/rsvps", id)),
        get_request("/api/admin/rsvps"),
        get_request("/api/admin/payments/premium-pending"),
        json_request(
            Method::PATCH,
            &format!("/api/admin/events/{}", id),
            json!({ "is_active": false }),
        ),
        json_request(Method::DELETE, &format!("/api/admin/events/{}", id), json!({})),
    ];

    for request in requests {
        let uri = request.uri().to_string();
        let response = app.send(request).await;
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "{} should require an admin session",
            uri
        );
    }
}

#[tokio::test]
async fn test_create_without_payment_requires_admin() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            Method::POST,
            "/api/events",
            event_body("boda-gratis", Some("abc123")),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.send(get_request("/api/events/by-slug/boda-gratis")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// Event management
// ============================================================================

#[tokio::test]
async fn test_admin_event_lifecycle() {
    let app = TestApp::new();
    let cookie = app.admin_cookie().await;

    let created = app.create_admin_event("boda-demo", "abc123").await;
    let id = created["event"]["id"].as_str().unwrap().to_string();
    assert_eq!(created["event"]["is_active"], true);

    let response = app
        .send(with_cookie(get_request("/api/admin/events"), &cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let list = parse_response_body(response).await;
    assert_eq!(list.as_array().unwrap().len(), 1);

    let response = app
        .send(with_cookie(
            get_request(&format!("/api/admin/events/{}", id)),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let details = parse_response_body(response).await;
    assert_eq!(details["slug"], "boda-demo");
    assert_eq!(details["config"]["max_adults"], 10);

    let response = app
        .send(with_cookie(
            json_request(
                Method::PUT,
                &format!("/api/admin/events/{}", id),
                json!({ "name": "Boda de Ana y Luis", "type": "corporate" }),
            ),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = parse_response_body(response).await;
    assert_eq!(updated["name"], "Boda de Ana y Luis");
    assert_eq!(updated["type"], "corporate");

    let response = app
        .send(with_cookie(
            json_request(
                Method::DELETE,
                &format!("/api/admin/events/{}", id),
                json!({}),
            ),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Event deleted");

    let response = app
        .send(with_cookie(
            get_request(&format!("/api/admin/events/{}", id)),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_duplicate_slug_conflict() {
    let app = TestApp::new();
    let cookie = app.admin_cookie().await;
    app.create_admin_event("boda-demo", "abc123").await;

    let response = app
        .send(with_cookie(
            json_request(
                Method::POST,
                "/api/events",
                event_body("boda-demo", Some("abcdef")),
            ),
            &cookie,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_create_event_validation() {
    let app = TestApp::new();
    let cookie = app.admin_cookie().await;

    let mut bad_type = event_body("evento-raro", Some("abc123"));
    bad_type["type"] = json!("graduation");
    let mut bad_slug = event_body("Mal Slug", Some("abc123"));
    bad_slug["slug"] = json!("Mal Slug");
    let short_password = event_body("clave-corta", Some("abc"));

    for body in [bad_type, bad_slug, short_password] {
        let response = app
            .send(with_cookie(
                json_request(Method::POST, "/api/events", body),
                &cookie,
            ))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_slug_derived_from_name() {
    let app = TestApp::new();
    let cookie = app.admin_cookie().await;

    let response = app
        .send(with_cookie(
            json_request(
                Method::POST,
                "/api/events",
                json!({
                    "name": "Cumpleaños de Sofía",
                    "type": "adult_birthday",
                    "date": "2026-08-01T21:00:00Z",
                }),
            ),
            &cookie,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = parse_response_body(response).await;
    assert_eq!(created["event"]["slug"], "cumpleanos-de-sofia");
    assert!(created["password"].as_str().is_some());
}

#[tokio::test]
async fn test_patch_requires_boolean() {
    let app = TestApp::new();
    let cookie = app.admin_cookie().await;
    let created = app.create_admin_event("boda-demo", "abc123").await;
    let uri = format!("/api/admin/events/{}", created["event"]["id"].as_str().unwrap());

    for body in [json!({ "is_active": "false" }), json!({ "is_active": 0 }), json!({})] {
        let response = app
            .send(with_cookie(json_request(Method::PATCH, &uri, body), &cookie))
            .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    let response = app
        .send(with_cookie(
            json_request(Method::PATCH, &uri, json!({ "is_active": false })),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["is_active"], false);
}

#[tokio::test]
async fn test_patch_unknown_event() {
    let app = TestApp::new();
    let cookie = app.admin_cookie().await;

    let response = app
        .send(with_cookie(
            json_request(
                Method::PATCH,
                &format!("/api/admin/events/{}", Uuid::new_v4()),
                json!({ "is_active": true }),
            ),
            &cookie,
        ))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ============================================================================
// RSVPs
// ============================================================================

#[tokio::test]
async fn test_rsvp_flow_and_admin_listing() {
    let app = TestApp::new();
    let cookie = app.admin_cookie().await;
    let created = app.create_admin_event("boda-demo", "abc123").await;
    let event_id = created["event"]["id"].as_str().unwrap().to_string();
    let other = app.create_admin_event("cumple-ana", "abcdef").await;
    let other_id = other["event"]["id"].as_str().unwrap().to_string();

    for id in [&event_id, &event_id, &other_id] {
        let response = app
            .send(json_request(Method::POST, "/api/rsvps", rsvp_body(id)))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app
        .send(with_cookie(
            get_request(&format!("/api/admin/events/{}/rsvps", event_id)),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let rsvps = parse_response_body(response).await;
    assert_eq!(rsvps.as_array().unwrap().len(), 2);

    let response = app
        .send(with_cookie(get_request("/api/admin/rsvps"), &cookie))
        .await;
    let all = parse_response_body(response).await;
    assert_eq!(all.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_rsvp_to_inactive_event_rejected() {
    let app = TestApp::new();
    let cookie = app.admin_cookie().await;
    let created = app.create_admin_event("boda-demo", "abc123").await;
    let event_id = created["event"]["id"].as_str().unwrap().to_string();

    let response = app
        .send(with_cookie(
            json_request(
                Method::PATCH,
                &format!("/api/admin/events/{}", event_id),
                json!({ "is_active": false }),
            ),
            &cookie,
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .send(json_request(Method::POST, "/api/rsvps", rsvp_body(&event_id)))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.send(get_request("/api/events/by-slug/boda-demo")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rsvp_unknown_event() {
    let app = TestApp::new();

    let response = app
        .send(json_request(
            Method::POST,
            "/api/rsvps",
            rsvp_body(&Uuid::new_v4().to_string()),
        ))
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_rsvp_guest_limits() {
    let app = TestApp::new();
    let created = app.create_admin_event("boda-demo", "abc123").await;
    let event_id = created["event"]["id"].as_str().unwrap().to_string();

    let mut too_many_adults = rsvp_body(&event_id);
    too_many_adults["over_ten"] = json!(11);
    let response = app
        .send(json_request(Method::POST, "/api/rsvps", too_many_adults))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // declining guests are not counted
    let mut declined = rsvp_body(&event_id);
    declined["attendance"] = json!("no");
    declined["over_ten"] = json!(11);
    let response = app
        .send(json_request(Method::POST, "/api/rsvps", declined))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_rsvp_children_rejected_for_adult_only_events() {
    let app = TestApp::new();
    let cookie = app.admin_cookie().await;

    let mut body = event_body("cena-empresa", Some("abc123"));
    body["type"] = json!("corporate");
    let response = app
        .send(with_cookie(
            json_request(Method::POST, "/api/events", body),
            &cookie,
        ))
        .await;
    let created = parse_response_body(response).await;
    let event_id = created["event"]["id"].as_str().unwrap().to_string();

    let response = app
        .send(json_request(Method::POST, "/api/rsvps", rsvp_body(&event_id)))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let mut adults_only = rsvp_body(&event_id);
    adults_only["under_five"] = json!(0);
    let response = app
        .send(json_request(Method::POST, "/api/rsvps", adults_only))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
}
