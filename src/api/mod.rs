// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::{Role, CSRF_HEADER},
    models::{
        CreateSubscriptionRequest, CreateSubscriptionResponse, CreateTestimonialRequest,
        LoginRequest, LoginResponse, MessageResponse, PaymentTokenResponse, ProfileResponse,
        RegisterRequest, RegisterResponse, SubscriptionResponse, UpdateStatusRequest,
        UpdateStatusResponse,
    },
    payments::PaymentNotification,
    state::AppState,
    storage::{SubscriptionStats, SubscriptionStatus, TestimonialRecord},
};

pub mod admin;
pub mod auth;
pub mod health;
pub mod payments;
pub mod subscriptions;
pub mod testimonials;
pub mod users;

/// Build the HTTP application.
///
/// `allowed_origin` is the single browser origin allowed by CORS.
pub fn router(state: AppState, allowed_origin: HeaderValue) -> Router {
    let api_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/me", get(users::get_current_user))
        .route("/subscribe", post(subscriptions::create_subscription))
        .route("/subscriptions", get(subscriptions::list_subscriptions))
        .route(
            "/subscriptions/{id}/status",
            put(subscriptions::update_subscription_status),
        )
        .route(
            "/subscriptions/{id}/create-payment",
            post(subscriptions::create_payment),
        )
        .route(
            "/subscriptions/{id}/payment",
            post(subscriptions::create_payment),
        )
        .route("/payments/notification", post(payments::payment_notification))
        .route(
            "/testimonials",
            get(testimonials::list_testimonials).post(testimonials::create_testimonial),
        )
        .route("/admin/dashboard-stats", get(admin::dashboard_stats));

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness));

    let cors = CorsLayer::new()
        .allow_origin(allowed_origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            HeaderName::from_static(CSRF_HEADER),
        ]);

    let middleware = ServiceBuilder::new()
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .with_state(state)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(middleware)
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        health::liveness,
        health::readiness,
        auth::register,
        auth::login,
        users::get_current_user,
        subscriptions::create_subscription,
        subscriptions::list_subscriptions,
        subscriptions::update_subscription_status,
        subscriptions::create_payment,
        payments::payment_notification,
        testimonials::list_testimonials,
        testimonials::create_testimonial,
        admin::dashboard_stats
    ),
    components(
        schemas(
            Role,
            RegisterRequest,
            RegisterResponse,
            LoginRequest,
            LoginResponse,
            ProfileResponse,
            CreateSubscriptionRequest,
            CreateSubscriptionResponse,
            UpdateStatusRequest,
            UpdateStatusResponse,
            PaymentTokenResponse,
            PaymentNotification,
            SubscriptionResponse,
            SubscriptionStatus,
            SubscriptionStats,
            TestimonialRecord,
            CreateTestimonialRequest,
            MessageResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness and readiness checks"),
        (name = "Auth", description = "Registration and login"),
        (name = "Users", description = "Caller profile"),
        (name = "Subscriptions", description = "Meal-plan subscriptions"),
        (name = "Payments", description = "Midtrans payment tokens and notifications"),
        (name = "Testimonials", description = "Customer reviews"),
        (name = "Admin", description = "Admin dashboard")
    )
)]
pub struct ApiDoc;
