// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Axum extractors for authenticated callers.
//!
//! ```rust,ignore
//! async fn my_handler(Auth(user): Auth) -> impl IntoResponse {
//!     // user is AuthenticatedUser
//! }
//! ```
//!
//! Both extractors verify the raw request every time. Request extensions are
//! never consulted, so no earlier layer can inject an identity.

use axum::{extract::FromRequestParts, http::request::Parts};

use super::{csrf::check_csrf, roles::require_admin, verifier::verify_bearer};
use super::{AuthError, AuthenticatedUser};
use crate::state::AppState;

/// Extractor for authenticated users.
///
/// Verifies the bearer credential, then applies the anti-forgery check for
/// state-changing methods.
///
/// # Example
///
/// ```rust,ignore
/// async fn list_subscriptions(
///     Auth(user): Auth,
///     State(state): State<AppState>,
/// ) -> Result<Json<Vec<SubscriptionRecord>>, ApiError> {
///     // user.user_id is the verified subject
/// }
/// ```
#[derive(Debug)]
pub struct Auth(pub AuthenticatedUser);

impl FromRequestParts<AppState> for Auth {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = verify_bearer(&parts.headers, &state.auth)?;
        check_csrf(&parts.method, &parts.headers, &user)?;
        Ok(Auth(user))
    }
}

/// Extractor that requires the admin role.
///
/// Unauthenticated callers are rejected before the store is touched.
#[derive(Debug)]
pub struct AdminOnly(pub AuthenticatedUser);

impl FromRequestParts<AppState> for AdminOnly {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Auth(user) = Auth::from_request_parts(parts, state).await?;
        require_admin(state.store.as_ref(), &user)?;
        Ok(AdminOnly(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{issue_credential, Role};
    use crate::test_support::{register_user, test_state, unavailable_state};
    use axum::http::{Method, Request};

    fn parts(method: Method, token: Option<&str>, csrf: Option<&str>) -> Parts {
        let mut builder = Request::builder().method(method).uri("/test");
        if let Some(token) = token {
            builder = builder.header("Authorization", format!("Bearer {token}"));
        }
        if let Some(csrf) = csrf {
            builder = builder.header("X-CSRF-Token", csrf);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[tokio::test]
    async fn auth_requires_header() {
        let (state, _dir) = test_state();
        let mut parts = parts(Method::GET, None, None);
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn auth_read_needs_no_csrf() {
        let (state, _dir) = test_state();
        let issued = issue_credential(&state.auth, 42).unwrap();
        let mut parts = parts(Method::GET, Some(&issued.token), None);
        let Auth(user) = Auth::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, 42);
    }

    #[tokio::test]
    async fn auth_mutation_enforces_csrf() {
        let (state, _dir) = test_state();
        let issued = issue_credential(&state.auth, 42).unwrap();

        let mut missing = parts(Method::POST, Some(&issued.token), None);
        let result = Auth::from_request_parts(&mut missing, &state).await;
        assert!(matches!(result, Err(AuthError::MissingCsrfToken)));

        let mut wrong = parts(Method::PUT, Some(&issued.token), Some("wrong"));
        let result = Auth::from_request_parts(&mut wrong, &state).await;
        assert!(matches!(result, Err(AuthError::CsrfMismatch)));

        let mut good = parts(Method::PUT, Some(&issued.token), Some(&issued.csrf_token));
        assert!(Auth::from_request_parts(&mut good, &state).await.is_ok());
    }

    #[tokio::test]
    async fn auth_ignores_injected_extensions() {
        let (state, _dir) = test_state();
        let mut parts = parts(Method::GET, None, None);
        parts.extensions.insert(AuthenticatedUser {
            user_id: 1,
            csrf_token: None,
            expires_at: i64::MAX,
        });
        let result = Auth::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));
    }

    #[tokio::test]
    async fn admin_only_rejects_regular_user() {
        let (state, _dir) = test_state();
        let user = register_user(&state, "user@example.com", Role::User);
        let issued = issue_credential(&state.auth, user.id).unwrap();
        let mut parts = parts(Method::GET, Some(&issued.token), None);
        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::InsufficientPermissions)));
    }

    #[tokio::test]
    async fn admin_only_accepts_admin() {
        let (state, _dir) = test_state();
        let admin = register_user(&state, "admin@example.com", Role::Admin);
        let issued = issue_credential(&state.auth, admin.id).unwrap();
        let mut parts = parts(Method::GET, Some(&issued.token), None);
        let AdminOnly(user) = AdminOnly::from_request_parts(&mut parts, &state).await.unwrap();
        assert_eq!(user.user_id, admin.id);
    }

    #[tokio::test]
    async fn admin_only_fails_closed_for_unknown_subject() {
        let (state, _dir) = test_state();
        let issued = issue_credential(&state.auth, 9_999).unwrap();
        let mut parts = parts(Method::GET, Some(&issued.token), None);
        let result = AdminOnly::from_request_parts(&mut parts, &state).await;
        assert!(matches!(result, Err(AuthError::RoleLookupFailed)));
    }

    #[tokio::test]
    async fn admin_only_rejects_unauthenticated_first() {
        // Every store call fails here, so reaching the role lookup would
        // surface as RoleLookupFailed instead of the credential error.
        let state = unavailable_state();

        let mut garbage = parts(Method::GET, Some("garbage"), None);
        let result = AdminOnly::from_request_parts(&mut garbage, &state).await;
        assert!(matches!(result, Err(AuthError::MalformedToken)));

        let mut missing = parts(Method::GET, None, None);
        let result = AdminOnly::from_request_parts(&mut missing, &state).await;
        assert!(matches!(result, Err(AuthError::MissingAuthHeader)));

        let issued = issue_credential(&state.auth, 1).unwrap();
        let mut valid = parts(Method::GET, Some(&issued.token), None);
        let result = AdminOnly::from_request_parts(&mut valid, &state).await;
        assert!(matches!(result, Err(AuthError::RoleLookupFailed)));
    }
}
