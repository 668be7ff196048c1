// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User endpoints.

use axum::{extract::State, Json};

use crate::{
    auth::Auth, error::ApiError, models::ProfileResponse, state::AppState, storage::UserRecord,
};

impl From<UserRecord> for ProfileResponse {
    fn from(user: UserRecord) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Get the current authenticated user's profile.
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "Users",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "User profile", body = ProfileResponse),
        (status = 401, description = "Unauthorized - invalid or missing token"),
        (status = 404, description = "User no longer exists"),
    )
)]
pub async fn get_current_user(
    Auth(user): Auth,
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, ApiError> {
    let record = state
        .store
        .get_user(user.user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(record.into()))
}
