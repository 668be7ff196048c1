// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! End-to-end flows through the public router.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{HeaderValue, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use catering_server::{
    api::router,
    auth::{AuthConfig, Role},
    payments::{compute_signature, MidtransEnvironment, PaymentConfig},
    state::AppState,
    storage::{CateringDatabase, CateringStore, SubscriptionStatus},
};

const JWT_SECRET: &str = "integration-test-signing-secret-0123456789";
const SERVER_KEY: &str = "SB-Mid-server-integration";
const PASSWORD: &str = "Str0ng!pass";

struct TestApp {
    app: Router,
    store: Arc<CateringDatabase>,
    _dir: TempDir,
}

struct Session {
    token: String,
    csrf: String,
}

impl TestApp {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(CateringDatabase::open(&dir.path().join("catering.redb")).unwrap());
        let state = AppState::new(
            store.clone(),
            AuthConfig::new(JWT_SECRET).unwrap(),
            PaymentConfig::new(SERVER_KEY, MidtransEnvironment::Sandbox),
        );
        Self {
            app: router(state, HeaderValue::from_static("http://localhost:5173")),
            store,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(
            Request::post(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    async fn authed(
        &self,
        method: &str,
        uri: &str,
        session: &Session,
        csrf: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header("Authorization", format!("Bearer {}", session.token));
        if let Some(csrf) = csrf {
            builder = builder.header("X-CSRF-Token", csrf);
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        };
        self.send(request.unwrap()).await
    }

    async fn register_and_login(&self, email: &str) -> (i64, Session) {
        let (status, body) = self
            .post_json(
                "/api/register",
                json!({"fullname": "Test User", "email": email, "password": PASSWORD}),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let user_id = body["userId"].as_i64().unwrap();

        let (status, body) = self
            .post_json("/api/login", json!({"email": email, "password": PASSWORD}))
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        let session = Session {
            token: body["token"].as_str().unwrap().to_string(),
            csrf: body["csrf"].as_str().unwrap().to_string(),
        };
        (user_id, session)
    }

    async fn subscribe(&self, session: &Session) -> i64 {
        let (status, body) = self
            .authed(
                "POST",
                "/api/subscribe",
                session,
                Some(&session.csrf),
                Some(json!({
                    "name": "Test User",
                    "phone": "08123456789",
                    "selectedPlan": "Royal Plan",
                    "selectedMeals": ["Lunch", "Dinner"],
                    "selectedDays": ["Monday", "Wednesday"],
                    "totalPrice": 1_720_000.0
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert_eq!(body["status"], "pending");
        body["subscriptionId"].as_i64().unwrap()
    }

    fn status_of(&self, id: i64) -> SubscriptionStatus {
        self.store.get_subscription(id).unwrap().unwrap().status
    }
}

fn notification(order_id: &str, gross: &str, transaction_status: &str) -> Value {
    json!({
        "order_id": order_id,
        "status_code": "200",
        "gross_amount": gross,
        "signature_key": compute_signature(order_id, "200", gross, SERVER_KEY),
        "transaction_status": transaction_status,
        "payment_type": "bank_transfer"
    })
}

#[tokio::test]
async fn subscribe_pay_and_pause() {
    let app = TestApp::new();
    let (_, session) = app.register_and_login("budi@example.com").await;
    let id = app.subscribe(&session).await;

    // Owner cannot activate it directly.
    let (status, _) = app
        .authed(
            "PUT",
            &format!("/api/subscriptions/{id}/status"),
            &session,
            Some(&session.csrf),
            Some(json!({"status": "active"})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .post_json(
            "/api/payments/notification",
            notification(&format!("SEACATERING-{id}-1700000000"), "1720000.00", "settlement"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.status_of(id), SubscriptionStatus::Active);

    let (status, body) = app
        .authed(
            "PUT",
            &format!("/api/subscriptions/{id}/status"),
            &session,
            Some(&session.csrf),
            Some(json!({"status": "paused"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(app.status_of(id), SubscriptionStatus::Paused);

    let (status, list) = app.authed("GET", "/api/subscriptions", &session, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["id"], id);
    assert_eq!(list[0]["planName"], "Royal Plan");
    assert_eq!(list[0]["mealTypes"], json!(["Lunch", "Dinner"]));
    assert_eq!(list[0]["deliveryDays"], json!(["Monday", "Wednesday"]));
    assert_eq!(list[0]["totalPrice"], 1_720_000.0);
    assert_eq!(list[0]["status"], "paused");
}

#[tokio::test]
async fn mutations_need_matching_csrf_but_reads_do_not() {
    let app = TestApp::new();
    let (_, session) = app.register_and_login("budi@example.com").await;
    let id = app.subscribe(&session).await;
    let uri = format!("/api/subscriptions/{id}/status");
    let body = json!({"status": "paused"});

    let (status, body_missing) = app.authed("PUT", &uri, &session, None, Some(body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body_missing["error_code"], "missing_csrf_token");

    let (status, _) = app
        .authed("PUT", &uri, &session, Some("wrong"), Some(body))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, list) = app
        .authed("GET", "/api/subscriptions", &session, None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn nonce_from_another_login_is_rejected() {
    let app = TestApp::new();
    let (_, first) = app.register_and_login("budi@example.com").await;
    let (status, body) = app
        .post_json(
            "/api/login",
            json!({"email": "budi@example.com", "password": PASSWORD}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let second_csrf = body["csrf"].as_str().unwrap().to_string();
    assert_ne!(first.csrf, second_csrf);

    let (status, _) = app
        .authed(
            "POST",
            "/api/testimonials",
            &first,
            Some(&second_csrf),
            Some(json!({"name": "Budi", "review": "Great", "rating": 5})),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn duplicate_notifications_activate_once() {
    let app = TestApp::new();
    let (_, session) = app.register_and_login("budi@example.com").await;
    let id = app.subscribe(&session).await;
    let payload = notification(&format!("SEACATERING-{id}-1"), "1720000.00", "capture");

    let (a, b) = tokio::join!(
        app.post_json("/api/payments/notification", payload.clone()),
        app.post_json("/api/payments/notification", payload.clone()),
    );
    assert_eq!(a.0, StatusCode::OK);
    assert_eq!(b.0, StatusCode::OK);

    let (status, _) = app.post_json("/api/payments/notification", payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(app.status_of(id), SubscriptionStatus::Active);
}

#[tokio::test]
async fn tampered_amount_is_forbidden_and_changes_nothing() {
    let app = TestApp::new();
    let (_, session) = app.register_and_login("budi@example.com").await;
    let id = app.subscribe(&session).await;

    let mut payload = notification(&format!("SEACATERING-{id}-1"), "1720000.00", "settlement");
    payload["gross_amount"] = json!("1.00");

    let (status, _) = app.post_json("/api/payments/notification", payload).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(app.status_of(id), SubscriptionStatus::Pending);
}

#[tokio::test]
async fn bad_order_id_is_acknowledged() {
    let app = TestApp::new();
    let (_, session) = app.register_and_login("budi@example.com").await;
    let id = app.subscribe(&session).await;

    let (status, body) = app
        .post_json(
            "/api/payments/notification",
            notification("SEACATERING", "1720000.00", "settlement"),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].as_str().unwrap().starts_with("OK"));
    assert_eq!(app.status_of(id), SubscriptionStatus::Pending);
}

#[tokio::test]
async fn malformed_notification_body_is_400() {
    let app = TestApp::new();
    let (status, _) = app
        .send(
            Request::post("/api/payments/notification")
                .header("Content-Type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_dashboard_is_role_gated() {
    let app = TestApp::new();

    let (status, body) = app
        .send(
            Request::get("/api/admin/dashboard-stats")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], "missing_auth_header");

    let (_, user) = app.register_and_login("user@example.com").await;
    let (status, _) = app
        .authed("GET", "/api/admin/dashboard-stats", &user, None, None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (admin_id, admin) = app.register_and_login("admin@example.com").await;
    assert!(app.store.set_user_role(admin_id, Role::Admin).unwrap());
    app.subscribe(&user).await;

    let (status, body) = app
        .authed("GET", "/api/admin/dashboard-stats", &admin, None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["newSubscriptions"], 1);
    assert_eq!(body["pendingSubscriptions"], 1);
    assert_eq!(body["activeSubscriptions"], 0);
    assert_eq!(body["monthlyRecurringRevenue"], 0.0);
    assert_eq!(body["reactivations"], 0);
}

#[tokio::test]
async fn other_users_subscription_looks_missing() {
    let app = TestApp::new();
    let (_, owner) = app.register_and_login("owner@example.com").await;
    let (_, other) = app.register_and_login("other@example.com").await;
    let id = app.subscribe(&owner).await;

    let (foreign_status, foreign_body) = app
        .authed(
            "POST",
            &format!("/api/subscriptions/{id}/create-payment"),
            &other,
            Some(&other.csrf),
            None,
        )
        .await;
    let (missing_status, missing_body) = app
        .authed(
            "POST",
            "/api/subscriptions/9999/payment",
            &other,
            Some(&other.csrf),
            None,
        )
        .await;
    assert_eq!(foreign_status, StatusCode::NOT_FOUND);
    assert_eq!(missing_status, StatusCode::NOT_FOUND);
    assert_eq!(foreign_body, missing_body);
}

#[tokio::test]
async fn testimonials_are_public_to_read() {
    let app = TestApp::new();
    let (_, session) = app.register_and_login("budi@example.com").await;
    let (status, _) = app
        .authed(
            "POST",
            "/api/testimonials",
            &session,
            Some(&session.csrf),
            Some(json!({"name": "Budi", "review": "Tasty", "rating": 4})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = app
        .send(Request::get("/api/testimonials").body(Body::empty()).unwrap())
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["rating"], 4);
}
