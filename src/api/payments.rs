// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Midtrans webhook endpoint.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use tracing::warn;

use crate::{
    error::ApiError,
    models::MessageResponse,
    payments::{process_notification, PaymentNotification},
    state::AppState,
};

/// Receive a payment notification.
///
/// No bearer credential; trust comes from the `signature_key`. Answers 403
/// only for a bad signature and 200 for everything after it.
#[utoipa::path(
    post,
    path = "/api/payments/notification",
    request_body = PaymentNotification,
    tag = "Payments",
    responses(
        (status = 200, description = "Notification acknowledged", body = MessageResponse),
        (status = 400, description = "Body is not a JSON object"),
        (status = 403, description = "Invalid signature")
    )
)]
pub async fn payment_notification(
    State(state): State<AppState>,
    payload: Result<Json<PaymentNotification>, JsonRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Json(notification) = payload.map_err(|e| {
        warn!(error = %e, "Payment notification body rejected");
        ApiError::bad_request("Invalid notification payload")
    })?;

    let outcome = process_notification(state.store.as_ref(), &state.payments, &notification)
        .map_err(|_| ApiError::forbidden("Invalid signature"))?;

    Ok(Json(MessageResponse::new(outcome.message())))
}
