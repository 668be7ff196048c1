// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Subscription endpoints.
//!
//! All routes are owner-scoped: another user's subscription answers exactly
//! like a missing one.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::{info, warn};

use crate::{
    auth::Auth,
    error::ApiError,
    models::{
        clean_set, CreateSubscriptionRequest, CreateSubscriptionResponse, PaymentTokenResponse,
        SubscriptionResponse, UpdateStatusRequest, UpdateStatusResponse,
    },
    payments::{format_order_id, gross_amount, SnapTransaction},
    state::AppState,
    storage::{
        NewSubscription, OwnerStatus, OwnerStatusChange, OwnershipCheck, SubscriptionId,
        SubscriptionStatus,
    },
};

const NOT_FOUND: &str = "Subscription not found";

#[utoipa::path(
    post,
    path = "/api/subscribe",
    request_body = CreateSubscriptionRequest,
    tag = "Subscriptions",
    security(("bearer" = [])),
    responses(
        (status = 201, body = CreateSubscriptionResponse),
        (status = 400, description = "Malformed body, missing plan, meals, days or invalid price"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "CSRF token missing or mismatched")
    )
)]
pub async fn create_subscription(
    Auth(user): Auth,
    State(state): State<AppState>,
    payload: Result<Json<CreateSubscriptionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreateSubscriptionResponse>), ApiError> {
    let Json(request) = payload?;
    let contact_name = request.name.trim();
    let phone = request.phone.trim();
    let plan_name = request.plan_name.trim();
    if contact_name.is_empty() || phone.is_empty() {
        return Err(ApiError::bad_request("Name and phone are required"));
    }
    if plan_name.is_empty() {
        return Err(ApiError::bad_request("Plan name is required"));
    }
    let meal_types = clean_set(request.meal_types);
    if meal_types.is_empty() {
        return Err(ApiError::bad_request("Select at least one meal type"));
    }
    let delivery_days = clean_set(request.delivery_days);
    if delivery_days.is_empty() {
        return Err(ApiError::bad_request("Select at least one delivery day"));
    }
    if !request.total_price.is_finite() || request.total_price <= 0.0 {
        return Err(ApiError::bad_request("Total price must be a positive amount"));
    }

    let subscription = state.store.create_subscription(NewSubscription {
        user_id: user.user_id,
        contact_name: contact_name.to_string(),
        phone: phone.to_string(),
        plan_name: plan_name.to_string(),
        meal_types,
        delivery_days,
        allergies: request
            .allergies
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty()),
        total_price: request.total_price,
    })?;

    info!(
        user_id = user.user_id,
        subscription_id = subscription.id,
        "Subscription created"
    );
    Ok((
        StatusCode::CREATED,
        Json(CreateSubscriptionResponse {
            message: "Subscription created successfully".to_string(),
            subscription_id: subscription.id,
            status: subscription.status,
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/api/subscriptions",
    tag = "Subscriptions",
    security(("bearer" = [])),
    responses(
        (status = 200, body = [SubscriptionResponse]),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn list_subscriptions(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<Vec<SubscriptionResponse>>, ApiError> {
    let subscriptions = state.store.list_subscriptions_for_user(user.user_id)?;
    Ok(Json(subscriptions.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    put,
    path = "/api/subscriptions/{id}/status",
    params(("id" = i64, Path, description = "Subscription id")),
    request_body = UpdateStatusRequest,
    tag = "Subscriptions",
    security(("bearer" = [])),
    responses(
        (status = 200, body = UpdateStatusResponse),
        (status = 400, description = "Malformed body, unknown status or `pending`"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "CSRF token missing or mismatched"),
        (status = 404, description = "Subscription not found"),
        (status = 409, description = "Subscription is awaiting payment")
    )
)]
pub async fn update_subscription_status(
    Auth(user): Auth,
    path: Result<Path<SubscriptionId>, PathRejection>,
    State(state): State<AppState>,
    payload: Result<Json<UpdateStatusRequest>, JsonRejection>,
) -> Result<Json<UpdateStatusResponse>, ApiError> {
    let Path(id) = path?;
    let Json(request) = payload?;
    let status: SubscriptionStatus = request
        .status
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request("Status must be one of: active, paused, cancelled"))?;
    let status = OwnerStatus::try_from(status)
        .map_err(|_| ApiError::bad_request("Status cannot be set to pending"))?;

    match state.store.set_status_for_owner(id, user.user_id, status)? {
        OwnerStatusChange::Updated(subscription) => {
            info!(
                user_id = user.user_id,
                subscription_id = id,
                status = %subscription.status,
                "Subscription status updated"
            );
            Ok(Json(UpdateStatusResponse {
                message: format!(
                    "Subscription status updated successfully to {}",
                    subscription.status
                ),
                subscription: subscription.into(),
            }))
        }
        OwnerStatusChange::NotFound => Err(ApiError::not_found(NOT_FOUND)),
        OwnerStatusChange::AwaitingPayment => Err(ApiError::conflict(
            "Subscription is awaiting payment and cannot be changed yet",
        )),
    }
}

/// Request a Snap payment token for a pending subscription.
///
/// Also served at `/api/subscriptions/{id}/payment`.
#[utoipa::path(
    post,
    path = "/api/subscriptions/{id}/create-payment",
    params(("id" = i64, Path, description = "Subscription id")),
    tag = "Payments",
    security(("bearer" = [])),
    responses(
        (status = 200, body = PaymentTokenResponse),
        (status = 400, description = "Invalid subscription id"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "CSRF token missing or mismatched"),
        (status = 404, description = "Subscription not found"),
        (status = 409, description = "Subscription is not pending"),
        (status = 502, description = "Payment provider error"),
        (status = 503, description = "Payments not configured")
    )
)]
pub async fn create_payment(
    Auth(user): Auth,
    path: Result<Path<SubscriptionId>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<PaymentTokenResponse>, ApiError> {
    let Path(id) = path?;
    let subscription = state
        .store
        .get_subscription(id)?
        .owned_by(&user)
        .ok_or_else(|| ApiError::not_found(NOT_FOUND))?;

    if subscription.status != SubscriptionStatus::Pending {
        return Err(ApiError::conflict(format!(
            "Subscription is already {}",
            subscription.status
        )));
    }

    let Some(snap) = state.snap.as_ref() else {
        warn!(subscription_id = id, "Payment requested but Snap is not configured");
        return Err(ApiError::service_unavailable("Payments are not available"));
    };

    let customer = state
        .store
        .get_user(user.user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let order_id = format_order_id(&state.payments.order_prefix, id, Utc::now().timestamp());
    let item_id = format!("SUB-{id}");
    let item_name = format!("Subscription: {}", subscription.plan_name);

    let token = snap
        .create_transaction_token(SnapTransaction {
            order_id: &order_id,
            gross_amount: gross_amount(subscription.total_price),
            customer_name: &customer.full_name,
            customer_email: &customer.email,
            item_id: &item_id,
            item_name: &item_name,
        })
        .await
        .map_err(|e| {
            tracing::error!(
                subscription_id = id,
                order_id = %order_id,
                error = %e,
                "Snap transaction failed"
            );
            ApiError::bad_gateway("Failed to create payment transaction")
        })?;

    Ok(Json(PaymentTokenResponse {
        snap_token: token.token,
        redirect_url: token.redirect_url,
        order_id,
    }))
}
