// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! User roles and the admin role check.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{AuthError, AuthenticatedUser};
use crate::storage::CateringStore;

/// User roles for authorization.
///
/// - `User` - customer, can manage own subscriptions
/// - `Admin` - may additionally read dashboard aggregates
///
/// Roles are assigned out of band; no endpoint changes them. There is no
/// default role: an unknown stored value fails to deserialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Gate an already verified subject on the `admin` role.
///
/// Fails closed: a store error or a subject with no user row is an internal
/// error, never an implicit grant.
pub fn require_admin(store: &dyn CateringStore, user: &AuthenticatedUser) -> Result<(), AuthError> {
    match store.user_role(user.user_id) {
        Ok(Some(Role::Admin)) => Ok(()),
        Ok(Some(Role::User)) => {
            tracing::warn!(user_id = user.user_id, "Admin access denied");
            Err(AuthError::InsufficientPermissions)
        }
        Ok(None) => {
            tracing::error!(
                user_id = user.user_id,
                "Role lookup found no user for verified subject"
            );
            Err(AuthError::RoleLookupFailed)
        }
        Err(e) => {
            tracing::error!(user_id = user.user_id, error = %e, "Role lookup failed");
            Err(AuthError::RoleLookupFailed)
        }
    }
}
