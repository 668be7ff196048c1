// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential claims and the verified caller identity.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::storage::UserId;

/// Claims minted by the token issuer.
///
/// - `sub` - user id
/// - `exp` - expiry, Unix seconds
/// - `csrf` - anti-forgery nonce the client must echo in `X-CSRF-Token`
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialClaims {
    pub sub: UserId,
    pub exp: i64,
    pub csrf: String,
}

impl fmt::Debug for CredentialClaims {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialClaims")
            .field("sub", &self.sub)
            .field("exp", &self.exp)
            .finish_non_exhaustive()
    }
}

/// Claims as presented by a caller. Everything except `exp` may be missing
/// or mistyped, so the subject is parsed loosely and coerced afterwards.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct PresentedClaims {
    #[serde(default)]
    pub sub: Option<SubjectClaim>,
    pub exp: i64,
    #[serde(default)]
    pub csrf: Option<String>,
}

/// Any JSON shape a `sub` claim might plausibly arrive in.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum SubjectClaim {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SubjectClaim {
    /// Coerce to a positive user id. Floats must be integral and strings
    /// must parse as a base-10 integer.
    pub fn to_user_id(&self) -> Option<UserId> {
        let id = match self {
            SubjectClaim::Integer(id) => Some(*id),
            SubjectClaim::Float(value) => {
                let in_range = *value >= i64::MIN as f64 && *value < i64::MAX as f64;
                (value.is_finite() && value.fract() == 0.0 && in_range).then(|| *value as i64)
            }
            SubjectClaim::Text(text) => text.trim().parse().ok(),
        }?;
        (id > 0).then_some(id)
    }
}

/// Identity of a caller whose credential passed verification.
///
/// Produced only by the credential verifier and handed to handlers through
/// the `Auth` / `AdminOnly` extractors.
#[derive(Clone)]
pub struct AuthenticatedUser {
    /// Verified subject id.
    pub user_id: UserId,
    /// Anti-forgery nonce embedded in the credential, if any.
    pub csrf_token: Option<String>,
    /// Credential expiry (Unix seconds).
    pub expires_at: i64,
}

impl fmt::Debug for AuthenticatedUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthenticatedUser")
            .field("user_id", &self.user_id)
            .field("has_csrf_token", &self.csrf_token.is_some())
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
