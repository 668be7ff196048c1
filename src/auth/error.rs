// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Authentication and authorization errors.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Authentication error type.
///
/// - 401: the credential is missing, malformed, forged or expired
/// - 403: the credential is fine but the request is not allowed
///   (anti-forgery failure, insufficient role)
/// - 500: the authorization decision could not be made (fail-closed)
#[derive(Debug)]
pub enum AuthError {
    /// No authorization header present
    MissingAuthHeader,
    /// Invalid authorization header format
    InvalidAuthHeader,
    /// Token is malformed or lacks required claims
    MalformedToken,
    /// Token is signed with an algorithm other than HS256
    UnsupportedAlgorithm,
    /// Token signature is invalid
    InvalidSignature,
    /// Token has expired
    TokenExpired,
    /// `sub` claim missing or not an integer
    InvalidSubject,
    /// State-changing request without an `X-CSRF-Token` header
    MissingCsrfToken,
    /// `X-CSRF-Token` does not match the credential's nonce
    CsrfMismatch,
    /// Insufficient permissions
    InsufficientPermissions,
    /// Role could not be determined for a verified subject
    RoleLookupFailed,
    /// Internal error
    InternalError(String),
}

#[derive(Serialize)]
struct AuthErrorBody {
    error: String,
    error_code: String,
}

impl AuthError {
    /// Get the error code for this error.
    pub fn error_code(&self) -> &'static str {
        match self {
            AuthError::MissingAuthHeader => "missing_auth_header",
            AuthError::InvalidAuthHeader => "invalid_auth_header",
            AuthError::MalformedToken => "malformed_token",
            AuthError::UnsupportedAlgorithm => "unsupported_algorithm",
            AuthError::InvalidSignature => "invalid_signature",
            AuthError::TokenExpired => "token_expired",
            AuthError::InvalidSubject => "invalid_subject",
            AuthError::MissingCsrfToken => "missing_csrf_token",
            AuthError::CsrfMismatch => "csrf_mismatch",
            AuthError::InsufficientPermissions => "insufficient_permissions",
            AuthError::RoleLookupFailed => "role_lookup_failed",
            AuthError::InternalError(_) => "internal_error",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::MissingAuthHeader
            | AuthError::InvalidAuthHeader
            | AuthError::MalformedToken
            | AuthError::UnsupportedAlgorithm
            | AuthError::InvalidSignature
            | AuthError::TokenExpired
            | AuthError::InvalidSubject => StatusCode::UNAUTHORIZED,
            AuthError::MissingCsrfToken
            | AuthError::CsrfMismatch
            | AuthError::InsufficientPermissions => StatusCode::FORBIDDEN,
            AuthError::RoleLookupFailed | AuthError::InternalError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingAuthHeader => write!(f, "Authorization header is required"),
            AuthError::InvalidAuthHeader => {
                write!(f, "Invalid authorization header format (expected 'Bearer <token>')")
            }
            AuthError::MalformedToken => write!(f, "Token is malformed"),
            AuthError::UnsupportedAlgorithm => write!(f, "Token algorithm is not accepted"),
            AuthError::InvalidSignature => write!(f, "Token signature is invalid"),
            AuthError::TokenExpired => write!(f, "Token has expired"),
            AuthError::InvalidSubject => write!(f, "Token subject is invalid"),
            AuthError::MissingCsrfToken => write!(f, "X-CSRF-Token header is required"),
            AuthError::CsrfMismatch => write!(f, "CSRF token mismatch"),
            AuthError::InsufficientPermissions => {
                write!(f, "Insufficient permissions for this operation")
            }
            AuthError::RoleLookupFailed => write!(f, "Could not verify user role"),
            AuthError::InternalError(_) => write!(f, "Internal authentication error"),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if let AuthError::InternalError(detail) = &self {
            tracing::error!(error = %detail, "Authentication internal error");
        }
        let body = Json(AuthErrorBody {
            error: self.to_string(),
            error_code: self.error_code().to_string(),
        });
        (status, body).into_response()
    }
}
