// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Ownership enforcement for subscription reads.
//!
//! Resources owned by another user are reported exactly like missing ones so
//! that ids cannot be enumerated.

use crate::auth::AuthenticatedUser;

use super::records::{SubscriptionRecord, UserId};

/// Trait for resources that have an owner.
pub trait OwnedResource {
    /// Get the owner's user ID.
    fn owner_user_id(&self) -> UserId;
}

impl OwnedResource for SubscriptionRecord {
    fn owner_user_id(&self) -> UserId {
        self.user_id
    }
}

/// Filter a lookup result down to resources the caller owns.
pub trait OwnershipCheck<T> {
    /// `Some(resource)` only if it exists and belongs to `user`.
    fn owned_by(self, user: &AuthenticatedUser) -> Option<T>;
}

impl<T: OwnedResource> OwnershipCheck<T> for Option<T> {
    fn owned_by(self, user: &AuthenticatedUser) -> Option<T> {
        self.filter(|resource| resource.owner_user_id() == user.user_id)
    }
}
