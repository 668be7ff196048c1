// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Registration and login.

use std::sync::LazyLock;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use tracing::{info, warn};

use crate::{
    auth::{hash_password, issue_credential, validate_password_strength, verify_password},
    error::ApiError,
    models::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    state::AppState,
    storage::{normalize_email, NewUser, StoreError},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Verified against when the email is unknown, so both failure paths cost
/// one key derivation.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("unused-Dummy-passw0rd!").ok());

/// `local@domain.tld` shape check; deliverability is not our concern.
pub(crate) fn is_valid_email(email: &str) -> bool {
    let mut parts = email.split('@');
    let (Some(local), Some(domain), None) = (parts.next(), parts.next(), parts.next()) else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

#[utoipa::path(
    post,
    path = "/api/register",
    request_body = RegisterRequest,
    tag = "Auth",
    responses(
        (status = 201, body = RegisterResponse),
        (status = 400, description = "Invalid name, email or weak password"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(request) = payload?;
    let full_name = request.fullname.trim();
    if full_name.is_empty() {
        return Err(ApiError::bad_request("Full name is required"));
    }
    let email = normalize_email(&request.email);
    if !is_valid_email(&email) {
        return Err(ApiError::bad_request("Invalid email address"));
    }
    validate_password_strength(&request.password)
        .map_err(|e| ApiError::bad_request(e.to_string()))?;

    let password_hash = hash_password(&request.password).map_err(|e| {
        tracing::error!(error = %e, "Password hashing failed");
        ApiError::internal("Internal server error")
    })?;

    let user = match state.store.create_user(NewUser {
        full_name: full_name.to_string(),
        email,
        password_hash,
    }) {
        Ok(user) => user,
        Err(StoreError::DuplicateEmail(_)) => {
            return Err(ApiError::conflict("Email already registered"));
        }
        Err(e) => return Err(e.into()),
    };

    info!(user_id = user.id, "User registered");
    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    tag = "Auth",
    responses(
        (status = 200, body = LoginResponse),
        (status = 401, description = "Invalid email or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(request) = payload?;
    let email = normalize_email(&request.email);
    let user = state.store.find_user_by_email(&email)?;

    let Some(user) = user else {
        if let Some(dummy) = DUMMY_HASH.as_deref() {
            verify_password(&request.password, dummy);
        }
        warn!("Login failed: unknown email");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    if !verify_password(&request.password, &user.password_hash) {
        warn!(user_id = user.id, "Login failed: wrong password");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    let issued = issue_credential(&state.auth, user.id).map_err(|e| {
        tracing::error!(user_id = user.id, error = ?e, "Credential issuance failed");
        ApiError::internal("Internal server error")
    })?;

    info!(user_id = user.id, "User logged in");
    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token: issued.token,
        csrf: issued.csrf_token,
        expires_at: issued.expires_at,
    }))
}
