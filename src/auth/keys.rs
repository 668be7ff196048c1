// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Credential signing configuration.
//!
//! Built once at startup from `JWT_SECRET` and shared read-only through
//! `AppState`. The secret never leaves this struct: `Debug` prints only the
//! token lifetime and leeway.

use std::fmt;
use std::time::Duration;

use jsonwebtoken::{DecodingKey, EncodingKey};

/// Credential lifetime (24 hours).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Clock skew tolerance (60 seconds).
pub const CLOCK_SKEW_LEEWAY: u64 = 60;

/// Minimum signing secret length in bytes (256 bits).
pub const MIN_SECRET_LENGTH: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthConfigError {
    #[error("JWT signing secret too short: got {actual} bytes, need at least {minimum}")]
    SecretTooShort { actual: usize, minimum: usize },
}

/// HS256 signing and verification keys plus token timing policy.
#[derive(Clone)]
pub struct AuthConfig {
    pub(crate) encoding_key: EncodingKey,
    pub(crate) decoding_key: DecodingKey,
    pub(crate) token_ttl: Duration,
    pub(crate) leeway: u64,
}

impl AuthConfig {
    /// Create from the raw signing secret.
    ///
    /// # Errors
    /// Returns error if the secret is shorter than [`MIN_SECRET_LENGTH`].
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, AuthConfigError> {
        let secret = secret.as_ref();
        if secret.len() < MIN_SECRET_LENGTH {
            return Err(AuthConfigError::SecretTooShort {
                actual: secret.len(),
                minimum: MIN_SECRET_LENGTH,
            });
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            token_ttl: DEFAULT_TOKEN_TTL,
            leeway: CLOCK_SKEW_LEEWAY,
        })
    }

    /// Override the credential lifetime.
    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_ttl", &self.token_ttl)
            .field("leeway", &self.leeway)
            .finish_non_exhaustive()
    }
}
