// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential issuance at login.
//!
//! Every credential carries a fresh anti-forgery nonce. The nonce is handed
//! to the client twice: sealed inside the signed token, and in the clear so
//! the client can echo it in `X-CSRF-Token` on mutating calls.

use std::fmt;

use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, Header};
use uuid::Uuid;

use super::claims::CredentialClaims;
use super::{AuthConfig, AuthError};
use crate::storage::UserId;

/// A freshly minted credential and its plain-text nonce.
#[derive(Clone)]
pub struct IssuedCredential {
    /// Signed HS256 JWT.
    pub token: String,
    /// The same nonce as the token's `csrf` claim.
    pub csrf_token: String,
    /// Expiry (Unix seconds).
    pub expires_at: i64,
}

impl fmt::Debug for IssuedCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IssuedCredential")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// Mint a credential for a subject whose password has already been checked.
pub fn issue_credential(
    config: &AuthConfig,
    user_id: UserId,
) -> Result<IssuedCredential, AuthError> {
    let ttl = i64::try_from(config.token_ttl.as_secs())
        .map_err(|_| AuthError::InternalError("token lifetime out of range".to_string()))?;
    let expires_at = Utc::now().timestamp().saturating_add(ttl);
    // UUIDv4: 122 random bits
    let csrf_token = Uuid::new_v4().to_string();

    let claims = CredentialClaims {
        sub: user_id,
        exp: expires_at,
        csrf: csrf_token.clone(),
    };

    let token = encode(&Header::new(Algorithm::HS256), &claims, &config.encoding_key)
        .map_err(|e| AuthError::InternalError(format!("token signing failed: {e}")))?;

    Ok(IssuedCredential {
        token,
        csrf_token,
        expires_at,
    })
}
