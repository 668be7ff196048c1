// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Embedded catering database backed by redb (pure Rust, ACID).
//!
//! ## Table Layout
//!
//! - `users`: user_id → serialized UserRecord
//! - `user_emails`: normalized email → user_id
//! - `subscriptions`: subscription_id → serialized SubscriptionRecord
//! - `user_subscriptions`: (user_id, subscription_id) → ()
//! - `testimonials`: testimonial_id → serialized TestimonialRecord
//! - `sequences`: sequence name → last issued id
//!
//! redb allows a single write transaction at a time, so a read-compare-write
//! inside one write transaction is atomic with respect to every other writer.
//! `activate_if_pending` relies on this.

use std::path::Path;

use chrono::Utc;
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition, WriteTransaction};
use serde::de::DeserializeOwned;

use super::records::{
    normalize_email, NewSubscription, NewTestimonial, NewUser, OwnerStatus, OwnerStatusChange,
    SubscriptionId, SubscriptionRecord, SubscriptionStats, SubscriptionStatus, TestimonialRecord,
    UserId, UserRecord,
};
use super::{CateringStore, StoreError, StoreResult};
use crate::auth::Role;

// =============================================================================
// Table Definitions
// =============================================================================

const USERS: TableDefinition<i64, &[u8]> = TableDefinition::new("users");

const USER_EMAILS: TableDefinition<&str, i64> = TableDefinition::new("user_emails");

const SUBSCRIPTIONS: TableDefinition<i64, &[u8]> = TableDefinition::new("subscriptions");

/// Ownership index. Range scans over `(user_id, ..)` list a user's subscriptions
/// in id order; ids are monotonic so reverse order is newest first.
const USER_SUBSCRIPTIONS: TableDefinition<(i64, i64), ()> =
    TableDefinition::new("user_subscriptions");

const TESTIMONIALS: TableDefinition<i64, &[u8]> = TableDefinition::new("testimonials");

const SEQUENCES: TableDefinition<&str, i64> = TableDefinition::new("sequences");

const USER_SEQUENCE: &str = "users";
const SUBSCRIPTION_SEQUENCE: &str = "subscriptions";
const TESTIMONIAL_SEQUENCE: &str = "testimonials";

// =============================================================================
// Helpers
// =============================================================================

/// Allocate the next id of a sequence inside an open write transaction.
fn next_id(write_txn: &WriteTransaction, sequence: &str) -> StoreResult<i64> {
    let mut table = write_txn.open_table(SEQUENCES)?;
    let last = table.get(sequence)?.map(|v| v.value()).unwrap_or(0);
    let next = last + 1;
    table.insert(sequence, next)?;
    Ok(next)
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> StoreResult<T> {
    Ok(serde_json::from_slice(bytes)?)
}

// =============================================================================
// CateringDatabase
// =============================================================================

/// Embedded ACID store for users, subscriptions and testimonials.
pub struct CateringDatabase {
    db: Database,
}

impl CateringDatabase {
    /// Open (or create) the database at the given path.
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        let db = Database::create(path)?;

        // Pre-create all tables so later read transactions don't fail
        let write_txn = db.begin_write()?;
        {
            let _ = write_txn.open_table(USERS)?;
            let _ = write_txn.open_table(USER_EMAILS)?;
            let _ = write_txn.open_table(SUBSCRIPTIONS)?;
            let _ = write_txn.open_table(USER_SUBSCRIPTIONS)?;
            let _ = write_txn.open_table(TESTIMONIALS)?;
            let _ = write_txn.open_table(SEQUENCES)?;
        }
        write_txn.commit()?;

        Ok(Self { db })
    }

    fn read_subscription(&self, id: SubscriptionId) -> StoreResult<Option<SubscriptionRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SUBSCRIPTIONS)?;
        match table.get(id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }
}

impl CateringStore for CateringDatabase {
    fn ping(&self) -> StoreResult<()> {
        let read_txn = self.db.begin_read()?;
        let _ = read_txn.open_table(SEQUENCES)?;
        Ok(())
    }

    // =========================================================================
    // Users
    // =========================================================================

    fn create_user(&self, user: NewUser) -> StoreResult<UserRecord> {
        let email = normalize_email(&user.email);

        let write_txn = self.db.begin_write()?;
        let record = {
            let mut emails = write_txn.open_table(USER_EMAILS)?;
            if emails.get(email.as_str())?.is_some() {
                return Err(StoreError::DuplicateEmail(email));
            }

            let id = next_id(&write_txn, USER_SEQUENCE)?;
            let record = UserRecord {
                id,
                full_name: user.full_name,
                email: email.clone(),
                password_hash: user.password_hash,
                role: Role::User,
                created_at: Utc::now(),
            };

            let json = serde_json::to_vec(&record)?;
            let mut users = write_txn.open_table(USERS)?;
            users.insert(id, json.as_slice())?;
            emails.insert(email.as_str(), id)?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let email = normalize_email(email);
        let read_txn = self.db.begin_read()?;
        let emails = read_txn.open_table(USER_EMAILS)?;
        let Some(id) = emails.get(email.as_str())?.map(|v| v.value()) else {
            return Ok(None);
        };
        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    fn get_user(&self, id: UserId) -> StoreResult<Option<UserRecord>> {
        let read_txn = self.db.begin_read()?;
        let users = read_txn.open_table(USERS)?;
        match users.get(id)? {
            Some(value) => Ok(Some(decode(value.value())?)),
            None => Ok(None),
        }
    }

    fn user_role(&self, id: UserId) -> StoreResult<Option<Role>> {
        Ok(self.get_user(id)?.map(|user| user.role))
    }

    fn set_user_role(&self, id: UserId, role: Role) -> StoreResult<bool> {
        let write_txn = self.db.begin_write()?;
        let updated = {
            let mut users = write_txn.open_table(USERS)?;
            let existing = users.get(id)?.map(|v| v.value().to_vec());
            match existing {
                Some(bytes) => {
                    let mut user: UserRecord = decode(&bytes)?;
                    user.role = role;
                    let json = serde_json::to_vec(&user)?;
                    users.insert(id, json.as_slice())?;
                    true
                }
                None => false,
            }
        };
        write_txn.commit()?;
        Ok(updated)
    }

    // =========================================================================
    // Subscriptions
    // =========================================================================

    fn create_subscription(
        &self,
        subscription: NewSubscription,
    ) -> StoreResult<SubscriptionRecord> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let id = next_id(&write_txn, SUBSCRIPTION_SEQUENCE)?;
            let now = Utc::now();
            let record = SubscriptionRecord {
                id,
                user_id: subscription.user_id,
                contact_name: subscription.contact_name,
                phone: subscription.phone,
                plan_name: subscription.plan_name,
                meal_types: subscription.meal_types,
                delivery_days: subscription.delivery_days,
                allergies: subscription.allergies,
                total_price: subscription.total_price,
                status: SubscriptionStatus::Pending,
                reactivations: 0,
                created_at: now,
                updated_at: now,
            };

            let json = serde_json::to_vec(&record)?;
            let mut table = write_txn.open_table(SUBSCRIPTIONS)?;
            table.insert(id, json.as_slice())?;

            let mut index = write_txn.open_table(USER_SUBSCRIPTIONS)?;
            index.insert((record.user_id, id), ())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    fn get_subscription(&self, id: SubscriptionId) -> StoreResult<Option<SubscriptionRecord>> {
        self.read_subscription(id)
    }

    fn list_subscriptions_for_user(&self, user_id: UserId) -> StoreResult<Vec<SubscriptionRecord>> {
        let read_txn = self.db.begin_read()?;
        let index = read_txn.open_table(USER_SUBSCRIPTIONS)?;
        let table = read_txn.open_table(SUBSCRIPTIONS)?;

        let mut results = Vec::new();
        for entry in index.range((user_id, i64::MIN)..=(user_id, i64::MAX))?.rev() {
            let (key, _) = entry?;
            let (_, subscription_id) = key.value();
            match table.get(subscription_id)? {
                Some(value) => results.push(decode(value.value())?),
                None => {
                    tracing::warn!(
                        user_id,
                        subscription_id,
                        "Ownership index points at a missing subscription"
                    );
                }
            }
        }
        Ok(results)
    }

    fn set_status_for_owner(
        &self,
        id: SubscriptionId,
        owner: UserId,
        status: OwnerStatus,
    ) -> StoreResult<OwnerStatusChange> {
        let write_txn = self.db.begin_write()?;
        let change = {
            let mut table = write_txn.open_table(SUBSCRIPTIONS)?;
            let existing = table.get(id)?.map(|v| v.value().to_vec());
            match existing {
                None => OwnerStatusChange::NotFound,
                Some(bytes) => {
                    let mut record: SubscriptionRecord = decode(&bytes)?;
                    if record.user_id != owner {
                        OwnerStatusChange::NotFound
                    } else if record.status == SubscriptionStatus::Pending {
                        OwnerStatusChange::AwaitingPayment
                    } else {
                        record.apply_owner_status(status);
                        record.updated_at = Utc::now();
                        let json = serde_json::to_vec(&record)?;
                        table.insert(id, json.as_slice())?;
                        OwnerStatusChange::Updated(record)
                    }
                }
            }
        };

        match change {
            OwnerStatusChange::Updated(_) => write_txn.commit()?,
            _ => write_txn.abort()?,
        }
        Ok(change)
    }

    fn activate_if_pending(&self, id: SubscriptionId) -> StoreResult<u64> {
        let write_txn = self.db.begin_write()?;
        let affected = {
            let mut table = write_txn.open_table(SUBSCRIPTIONS)?;
            let existing = table.get(id)?.map(|v| v.value().to_vec());
            match existing {
                Some(bytes) => {
                    let mut record: SubscriptionRecord = decode(&bytes)?;
                    if record.status == SubscriptionStatus::Pending {
                        record.status = SubscriptionStatus::Active;
                        record.updated_at = Utc::now();
                        let json = serde_json::to_vec(&record)?;
                        table.insert(id, json.as_slice())?;
                        1
                    } else {
                        0
                    }
                }
                None => 0,
            }
        };

        if affected > 0 {
            write_txn.commit()?;
        } else {
            write_txn.abort()?;
        }
        Ok(affected)
    }

    fn subscription_stats(&self) -> StoreResult<SubscriptionStats> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(SUBSCRIPTIONS)?;

        let mut stats = SubscriptionStats::default();
        for entry in table.iter()? {
            let (_, value) = entry?;
            let record: SubscriptionRecord = decode(value.value())?;
            stats.record(&record);
        }
        Ok(stats)
    }

    // =========================================================================
    // Testimonials
    // =========================================================================

    fn create_testimonial(&self, testimonial: NewTestimonial) -> StoreResult<TestimonialRecord> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let id = next_id(&write_txn, TESTIMONIAL_SEQUENCE)?;
            let record = TestimonialRecord {
                id,
                name: testimonial.name,
                review: testimonial.review,
                rating: testimonial.rating,
                created_at: Utc::now(),
            };
            let json = serde_json::to_vec(&record)?;
            let mut table = write_txn.open_table(TESTIMONIALS)?;
            table.insert(id, json.as_slice())?;
            record
        };
        write_txn.commit()?;
        Ok(record)
    }

    fn list_testimonials(&self) -> StoreResult<Vec<TestimonialRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TESTIMONIALS)?;

        let mut results = Vec::new();
        for entry in table.iter()?.rev() {
            let (_, value) = entry?;
            results.push(decode(value.value())?);
        }
        Ok(results)
    }
}

// =============================================================================
// Tests
// =============================================================================
