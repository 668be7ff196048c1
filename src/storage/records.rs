// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Persisted record types for users, subscriptions and testimonials.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;

/// Store-assigned user identifier (the credential `sub` claim).
pub type UserId = i64;

/// Store-assigned subscription identifier.
pub type SubscriptionId = i64;

// =============================================================================
// Users
// =============================================================================

/// A registered user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub full_name: String,
    /// Normalized (trimmed, lowercase) email, unique across users.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a user. New users always start with [`Role::User`].
#[derive(Debug, Clone)]
pub struct NewUser {
    pub full_name: String,
    pub email: String,
    pub password_hash: String,
}

/// Normalize an email for storage and lookup.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// =============================================================================
// Subscriptions
// =============================================================================

/// Subscription lifecycle status.
///
/// - `Pending` - created, awaiting payment
/// - `Active` - paid (set only by a verified payment notification from `Pending`)
/// - `Paused` / `Cancelled` - set by the owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Pending,
    Active,
    Paused,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Pending => "pending",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Paused => "paused",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a status string is not one of the known values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subscription status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for SubscriptionStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SubscriptionStatus::Pending),
            "active" => Ok(SubscriptionStatus::Active),
            "paused" => Ok(SubscriptionStatus::Paused),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// Statuses an owner may set directly. `Pending` is not among them, and
/// `Active` is only reachable by the owner once a payment has activated the
/// subscription at least once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnerStatus {
    Active,
    Paused,
    Cancelled,
}

impl From<OwnerStatus> for SubscriptionStatus {
    fn from(status: OwnerStatus) -> Self {
        match status {
            OwnerStatus::Active => SubscriptionStatus::Active,
            OwnerStatus::Paused => SubscriptionStatus::Paused,
            OwnerStatus::Cancelled => SubscriptionStatus::Cancelled,
        }
    }
}

impl TryFrom<SubscriptionStatus> for OwnerStatus {
    type Error = SubscriptionStatus;

    fn try_from(status: SubscriptionStatus) -> Result<Self, Self::Error> {
        match status {
            SubscriptionStatus::Active => Ok(OwnerStatus::Active),
            SubscriptionStatus::Paused => Ok(OwnerStatus::Paused),
            SubscriptionStatus::Cancelled => Ok(OwnerStatus::Cancelled),
            SubscriptionStatus::Pending => Err(SubscriptionStatus::Pending),
        }
    }
}

/// A meal-plan subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub id: SubscriptionId,
    pub user_id: UserId,
    pub contact_name: String,
    pub phone: String,
    pub plan_name: String,
    pub meal_types: BTreeSet<String>,
    pub delivery_days: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    /// Monthly price in IDR.
    pub total_price: f64,
    pub status: SubscriptionStatus,
    /// Times the owner resumed it from `Paused` or `Cancelled`.
    #[serde(default)]
    pub reactivations: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubscriptionRecord {
    /// Apply an owner status change, counting resumptions.
    pub(crate) fn apply_owner_status(&mut self, status: OwnerStatus) {
        let resumed = status == OwnerStatus::Active
            && matches!(
                self.status,
                SubscriptionStatus::Paused | SubscriptionStatus::Cancelled
            );
        if resumed {
            self.reactivations = self.reactivations.saturating_add(1);
        }
        self.status = status.into();
    }
}

/// Input for creating a subscription. New subscriptions are always `Pending`.
#[derive(Debug, Clone)]
pub struct NewSubscription {
    pub user_id: UserId,
    pub contact_name: String,
    pub phone: String,
    pub plan_name: String,
    pub meal_types: BTreeSet<String>,
    pub delivery_days: BTreeSet<String>,
    pub allergies: Option<String>,
    pub total_price: f64,
}

/// Result of an owner-initiated status change.
#[derive(Debug, Clone)]
pub enum OwnerStatusChange {
    Updated(SubscriptionRecord),
    /// Absent, or owned by someone else. The two cases are not distinguished.
    NotFound,
    /// Still pending; only a payment notification can move it forward.
    AwaitingPayment,
}

/// Aggregate counts for the admin dashboard.
///
/// The dashboard labels the overall count as `newSubscriptions`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionStats {
    #[serde(rename = "newSubscriptions")]
    pub total_subscriptions: u64,
    pub active_subscriptions: u64,
    pub paused_subscriptions: u64,
    pub pending_subscriptions: u64,
    pub cancelled_subscriptions: u64,
    /// Sum of `total_price` over active subscriptions.
    pub monthly_recurring_revenue: f64,
    /// Owner resumptions from `Paused` or `Cancelled`, summed over all
    /// subscriptions.
    pub reactivations: u64,
}

impl SubscriptionStats {
    pub(crate) fn record(&mut self, subscription: &SubscriptionRecord) {
        self.total_subscriptions += 1;
        self.reactivations += u64::from(subscription.reactivations);
        match subscription.status {
            SubscriptionStatus::Active => {
                self.active_subscriptions += 1;
                self.monthly_recurring_revenue += subscription.total_price;
            }
            SubscriptionStatus::Paused => self.paused_subscriptions += 1,
            SubscriptionStatus::Pending => self.pending_subscriptions += 1,
            SubscriptionStatus::Cancelled => self.cancelled_subscriptions += 1,
        }
    }
}

// =============================================================================
// Testimonials
// =============================================================================

/// A public customer testimonial.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TestimonialRecord {
    pub id: i64,
    pub name: String,
    pub review: String,
    /// 1 to 5 stars.
    pub rating: u8,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewTestimonial {
    pub name: String,
    pub review: String,
    pub rating: u8,
}
