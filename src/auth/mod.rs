// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Authentication Module
//!
//! Self-issued HS256 credentials with an embedded anti-forgery nonce.
//!
//! ## Auth Flow
//!
//! 1. `POST /api/login` checks the password and mints a credential
//!    `{sub, exp, csrf}`; the nonce is also returned in the response body
//! 2. Client sends `Authorization: Bearer <token>` on protected calls
//! 3. Client echoes the nonce in `X-CSRF-Token` on every non-read call
//! 4. Server:
//!    - Verifies signature (HS256 only) and expiry
//!    - Extracts `sub` as the canonical `user_id`
//!    - Compares the echoed nonce to the `csrf` claim
//!    - For admin routes, loads the role from the store (fail-closed)
//!
//! ## Security
//!
//! - No server-side sessions; credentials expire after 24 hours
//! - Clock skew tolerance is 60 seconds
//! - Signing secret and nonces never appear in `Debug` output or logs

pub mod claims;
pub mod csrf;
pub mod error;
pub mod extractor;
pub mod issuer;
pub mod keys;
pub mod password;
pub mod roles;
pub mod verifier;

pub use claims::{AuthenticatedUser, CredentialClaims};
pub use csrf::{check_csrf, is_state_changing, CSRF_HEADER};
pub use error::AuthError;
pub use extractor::{AdminOnly, Auth};
pub use issuer::{issue_credential, IssuedCredential};
pub use keys::{AuthConfig, AuthConfigError};
pub use password::{hash_password, validate_password_strength, verify_password, PasswordError};
pub use roles::{require_admin, Role};
pub use verifier::{verify_bearer, verify_token};
