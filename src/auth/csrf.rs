// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Anti-forgery check for state-changing requests.
//!
//! The nonce sealed in the credential must be echoed byte-for-byte in the
//! `X-CSRF-Token` header on every request that is not a read.

use axum::http::{HeaderMap, Method};
use subtle::ConstantTimeEq;

use super::{AuthError, AuthenticatedUser};

/// Header carrying the echoed nonce.
pub const CSRF_HEADER: &str = "x-csrf-token";

/// `GET`, `HEAD` and `OPTIONS` are reads; every other method mutates.
pub fn is_state_changing(method: &Method) -> bool {
    !matches!(*method, Method::GET | Method::HEAD | Method::OPTIONS)
}

/// Enforce the anti-forgery rule for one request.
pub fn check_csrf(
    method: &Method,
    headers: &HeaderMap,
    user: &AuthenticatedUser,
) -> Result<(), AuthError> {
    if !is_state_changing(method) {
        return Ok(());
    }

    let presented = headers
        .get(CSRF_HEADER)
        .map(|value| value.as_bytes())
        .filter(|value| !value.is_empty())
        .ok_or(AuthError::MissingCsrfToken)?;

    let Some(expected) = user.csrf_token.as_deref() else {
        tracing::warn!(user_id = user.user_id, "Credential carries no CSRF nonce");
        return Err(AuthError::CsrfMismatch);
    };

    if bool::from(presented.ct_eq(expected.as_bytes())) {
        Ok(())
    } else {
        tracing::warn!(user_id = user.user_id, %method, "CSRF token mismatch");
        Err(AuthError::CsrfMismatch)
    }
}
