// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Admin-only API endpoints.
//!
//! These endpoints require the Admin role, looked up from the store on every
//! request.

use axum::{extract::State, Json};

use crate::{auth::AdminOnly, error::ApiError, state::AppState, storage::SubscriptionStats};

/// Subscription counts by status and monthly recurring revenue.
#[utoipa::path(
    get,
    path = "/api/admin/dashboard-stats",
    tag = "Admin",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Dashboard statistics", body = SubscriptionStats),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin role required"),
        (status = 500, description = "Role could not be verified")
    )
)]
pub async fn dashboard_stats(
    AdminOnly(admin): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<SubscriptionStats>, ApiError> {
    let stats = state.store.subscription_stats()?;
    tracing::debug!(
        admin_id = admin.user_id,
        total = stats.total_subscriptions,
        "Dashboard stats served"
    );
    Ok(Json(stats))
}
