// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Bearer credential verification.
//!
//! Pure signature and expiry checks; no I/O. Runs on every protected request.

use axum::http::{header::AUTHORIZATION, HeaderMap};
use jsonwebtoken::{decode, errors::ErrorKind, Algorithm, Validation};

use super::claims::PresentedClaims;
use super::{AuthConfig, AuthError, AuthenticatedUser};

const BEARER_PREFIX: &str = "Bearer ";

/// Extract the raw token from the `Authorization` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = auth_header
        .strip_prefix(BEARER_PREFIX)
        .map(str::trim)
        .ok_or(AuthError::InvalidAuthHeader)?;

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Verify the credential carried in the request headers.
pub fn verify_bearer(
    headers: &HeaderMap,
    config: &AuthConfig,
) -> Result<AuthenticatedUser, AuthError> {
    let token = bearer_token(headers)?;
    verify_token(token, config)
}

/// Verify a raw token and extract the caller identity.
///
/// Only HS256 is accepted. Tokens whose header names any other algorithm,
/// `none` included, are rejected before the signature is looked at.
pub fn verify_token(token: &str, config: &AuthConfig) -> Result<AuthenticatedUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = config.leeway;
    validation.validate_aud = false;
    validation.set_required_spec_claims(&["exp"]);

    let token_data = decode::<PresentedClaims>(token, &config.decoding_key, &validation)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::InvalidSignature,
            ErrorKind::InvalidAlgorithm | ErrorKind::InvalidAlgorithmName => {
                AuthError::UnsupportedAlgorithm
            }
            _ => AuthError::MalformedToken,
        })?;

    let claims = token_data.claims;

    let user_id = claims
        .sub
        .as_ref()
        .and_then(|sub| sub.to_user_id())
        .ok_or(AuthError::InvalidSubject)?;

    Ok(AuthenticatedUser {
        user_id,
        csrf_token: claims.csrf.filter(|nonce| !nonce.is_empty()),
        expires_at: claims.exp,
    })
}
