// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # API Data Models
//!
//! Request and response bodies of the REST API. All types derive
//! `ToSchema` for the OpenAPI document.
//!
//! Field names on the wire are camelCase, matching the web client. Request
//! bodies also accept the snake_case spellings.
//!
//! ## Model Categories
//!
//! - **Accounts**: registration, login, profile
//! - **Subscriptions**: plan creation, status changes, payment tokens
//! - **Testimonials**: public reviews
//! - **Messages**: plain acknowledgements

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::auth::Role;
use crate::storage::{SubscriptionId, SubscriptionRecord, SubscriptionStatus, UserId};

// =============================================================================
// Account Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[serde(alias = "full_name")]
    pub fullname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: UserId,
}

#[derive(Clone, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Login result. `csrf` must be echoed in `X-CSRF-Token` on every
/// state-changing call made with `token`.
#[derive(Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub message: String,
    pub token: String,
    pub csrf: String,
    /// Credential expiry (Unix seconds).
    pub expires_at: i64,
}

impl std::fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginResponse")
            .field("message", &self.message)
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// The caller's own profile.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: UserId,
    pub full_name: String,
    pub email: String,
    pub role: Role,
}

// =============================================================================
// Subscription Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionRequest {
    /// Contact name for deliveries.
    pub name: String,
    pub phone: String,
    #[serde(rename = "selectedPlan", alias = "planName", alias = "plan_name")]
    pub plan_name: String,
    #[serde(rename = "selectedMeals", alias = "mealTypes", alias = "meal_types")]
    pub meal_types: Vec<String>,
    #[serde(rename = "selectedDays", alias = "deliveryDays", alias = "delivery_days")]
    pub delivery_days: Vec<String>,
    #[serde(default)]
    pub allergies: Option<String>,
    /// Monthly price in IDR.
    #[serde(alias = "total_price")]
    pub total_price: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubscriptionResponse {
    pub message: String,
    pub subscription_id: SubscriptionId,
    pub status: SubscriptionStatus,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// `active`, `paused` or `cancelled`.
    pub status: String,
}

/// A subscription as its owner sees it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionResponse {
    pub id: SubscriptionId,
    /// Contact name for deliveries.
    pub name: String,
    pub phone: String,
    pub plan_name: String,
    pub meal_types: Vec<String>,
    pub delivery_days: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<String>,
    pub total_price: f64,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<SubscriptionRecord> for SubscriptionResponse {
    fn from(record: SubscriptionRecord) -> Self {
        Self {
            id: record.id,
            name: record.contact_name,
            phone: record.phone,
            plan_name: record.plan_name,
            meal_types: record.meal_types.into_iter().collect(),
            delivery_days: record.delivery_days.into_iter().collect(),
            allergies: record.allergies,
            total_price: record.total_price,
            status: record.status,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UpdateStatusResponse {
    pub message: String,
    pub subscription: SubscriptionResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentTokenResponse {
    pub snap_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_url: Option<String>,
    pub order_id: String,
}

// =============================================================================
// Testimonial Models
// =============================================================================

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct CreateTestimonialRequest {
    pub name: String,
    pub review: String,
    /// 1 to 5.
    pub rating: i64,
}

// =============================================================================
// Messages
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Trim, drop blanks, de-duplicate.
pub fn clean_set(values: Vec<String>) -> BTreeSet<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}
