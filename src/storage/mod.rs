// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Storage Module
//!
//! Record storage for users, subscriptions and testimonials.
//!
//! Handlers and the payment notification processor talk to storage through
//! the [`CateringStore`] trait. The production implementation is
//! [`CateringDatabase`], an embedded redb file.
//!
//! ## Contract
//!
//! - point lookup of a user's role by id
//! - point lookup/insert of subscription rows
//! - one atomic conditional update, [`CateringStore::activate_if_pending`],
//!   equivalent to `SET status = 'active' WHERE id = ? AND status = 'pending'`
//!   and returning the affected-row count
//!
//! Implementations must make that conditional update a single compare-and-set:
//! two concurrent calls for the same pending subscription must report one
//! affected row in total.

pub mod database;
pub mod ownership;
pub mod records;

pub use database::CateringDatabase;
pub use ownership::{OwnedResource, OwnershipCheck};
pub use records::{
    normalize_email, NewSubscription, NewTestimonial, NewUser, OwnerStatus, OwnerStatusChange,
    SubscriptionId, SubscriptionRecord, SubscriptionStats, SubscriptionStatus, TestimonialRecord,
    UnknownStatus, UserId, UserRecord,
};

use crate::auth::Role;

// =============================================================================
// Error Type
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("redb database error: {0}")]
    RedbDatabase(#[from] redb::DatabaseError),

    #[error("redb transaction error: {0}")]
    RedbTransaction(#[from] redb::TransactionError),

    #[error("redb table error: {0}")]
    RedbTable(#[from] redb::TableError),

    #[error("redb storage error: {0}")]
    RedbStorage(#[from] redb::StorageError),

    #[error("redb commit error: {0}")]
    RedbCommit(#[from] redb::CommitError),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

// =============================================================================
// Store Trait
// =============================================================================

/// Record store consumed by the HTTP handlers, the role authorizer and the
/// payment notification processor.
///
/// Methods are synchronous; every call is a short ACID transaction.
pub trait CateringStore: Send + Sync {
    /// Cheap liveness check used by the readiness check.
    fn ping(&self) -> StoreResult<()>;

    /// Insert a user with role `user`. Fails with `DuplicateEmail` if the
    /// normalized email is taken.
    fn create_user(&self, user: NewUser) -> StoreResult<UserRecord>;

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;

    fn get_user(&self, id: UserId) -> StoreResult<Option<UserRecord>>;

    /// Role of a user, `None` if the user does not exist.
    fn user_role(&self, id: UserId) -> StoreResult<Option<Role>>;

    /// Out-of-band role change (operators, seeding). Returns `false` if the
    /// user does not exist.
    fn set_user_role(&self, id: UserId, role: Role) -> StoreResult<bool>;

    /// Insert a subscription in `pending` status.
    fn create_subscription(&self, subscription: NewSubscription) -> StoreResult<SubscriptionRecord>;

    fn get_subscription(&self, id: SubscriptionId) -> StoreResult<Option<SubscriptionRecord>>;

    /// A user's subscriptions, newest first.
    fn list_subscriptions_for_user(&self, user_id: UserId) -> StoreResult<Vec<SubscriptionRecord>>;

    /// Atomically set the status of a subscription owned by `owner`.
    fn set_status_for_owner(
        &self,
        id: SubscriptionId,
        owner: UserId,
        status: OwnerStatus,
    ) -> StoreResult<OwnerStatusChange>;

    /// Atomically move a subscription from `pending` to `active`.
    ///
    /// Returns the number of affected rows: `1` if this call performed the
    /// transition, `0` if the subscription is missing or not pending.
    fn activate_if_pending(&self, id: SubscriptionId) -> StoreResult<u64>;

    fn subscription_stats(&self) -> StoreResult<SubscriptionStats>;

    fn create_testimonial(&self, testimonial: NewTestimonial) -> StoreResult<TestimonialRecord>;

    /// All testimonials, newest first.
    fn list_testimonials(&self) -> StoreResult<Vec<TestimonialRecord>>;
}
