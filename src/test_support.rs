// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Shared fixtures for unit tests.

use std::collections::BTreeSet;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::Response;
use tempfile::TempDir;

use crate::auth::{hash_password, AuthConfig, Role};
use crate::payments::{MidtransEnvironment, PaymentConfig};
use crate::state::AppState;
use crate::storage::{
    CateringDatabase, CateringStore, NewSubscription, NewTestimonial, NewUser, OwnerStatus,
    OwnerStatusChange, StoreError, StoreResult, SubscriptionId, SubscriptionRecord,
    SubscriptionStats, TestimonialRecord, UserId, UserRecord,
};

pub const TEST_JWT_SECRET: &str = "unit-test-signing-secret-0123456789abcdef";
pub const TEST_SERVER_KEY: &str = "SB-Mid-server-unit-test";
pub const TEST_PASSWORD: &str = "Str0ng!pass";

/// Fresh state over a throwaway redb file. Keep the `TempDir` alive.
pub fn test_state() -> (AppState, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let db = CateringDatabase::open(&dir.path().join("catering.redb")).expect("open db");
    let state = AppState::new(
        Arc::new(db),
        AuthConfig::new(TEST_JWT_SECRET).expect("auth config"),
        PaymentConfig::new(TEST_SERVER_KEY, MidtransEnvironment::Sandbox),
    );
    (state, dir)
}

/// Register a user with [`TEST_PASSWORD`] and the given role.
pub fn register_user(state: &AppState, email: &str, role: Role) -> UserRecord {
    let user = state
        .store
        .create_user(NewUser {
            full_name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: hash_password(TEST_PASSWORD).expect("hash"),
        })
        .expect("create user");
    if role != Role::User {
        state.store.set_user_role(user.id, role).expect("set role");
    }
    UserRecord { role, ..user }
}

pub fn new_subscription(user_id: UserId) -> NewSubscription {
    NewSubscription {
        user_id,
        contact_name: "Test User".to_string(),
        phone: "08123456789".to_string(),
        plan_name: "Diet Plan".to_string(),
        meal_types: BTreeSet::from(["Lunch".to_string()]),
        delivery_days: BTreeSet::from(["Monday".to_string(), "Friday".to_string()]),
        allergies: None,
        total_price: 150_000.0,
    }
}

pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

/// Store double whose every call fails.
pub struct UnavailableStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Unavailable("test store is down".to_string()))
}

impl CateringStore for UnavailableStore {
    fn ping(&self) -> StoreResult<()> {
        down()
    }
    fn create_user(&self, _user: NewUser) -> StoreResult<UserRecord> {
        down()
    }
    fn find_user_by_email(&self, _email: &str) -> StoreResult<Option<UserRecord>> {
        down()
    }
    fn get_user(&self, _id: UserId) -> StoreResult<Option<UserRecord>> {
        down()
    }
    fn user_role(&self, _id: UserId) -> StoreResult<Option<Role>> {
        down()
    }
    fn set_user_role(&self, _id: UserId, _role: Role) -> StoreResult<bool> {
        down()
    }
    fn create_subscription(&self, _s: NewSubscription) -> StoreResult<SubscriptionRecord> {
        down()
    }
    fn get_subscription(&self, _id: SubscriptionId) -> StoreResult<Option<SubscriptionRecord>> {
        down()
    }
    fn list_subscriptions_for_user(
        &self,
        _user_id: UserId,
    ) -> StoreResult<Vec<SubscriptionRecord>> {
        down()
    }
    fn set_status_for_owner(
        &self,
        _id: SubscriptionId,
        _owner: UserId,
        _status: OwnerStatus,
    ) -> StoreResult<OwnerStatusChange> {
        down()
    }
    fn activate_if_pending(&self, _id: SubscriptionId) -> StoreResult<u64> {
        down()
    }
    fn subscription_stats(&self) -> StoreResult<SubscriptionStats> {
        down()
    }
    fn create_testimonial(&self, _t: NewTestimonial) -> StoreResult<TestimonialRecord> {
        down()
    }
    fn list_testimonials(&self) -> StoreResult<Vec<TestimonialRecord>> {
        down()
    }
}

/// State whose store is [`UnavailableStore`].
pub fn unavailable_state() -> AppState {
    AppState::new(
        Arc::new(UnavailableStore),
        AuthConfig::new(TEST_JWT_SECRET).expect("auth config"),
        PaymentConfig::new(TEST_SERVER_KEY, MidtransEnvironment::Sandbox),
    )
}
