// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Midtrans payment notification processing.
//!
//! Notifications are untrusted, may be redelivered, and may arrive
//! concurrently. The only hard rejection is a bad signature; once the
//! signature checks out the caller is always acknowledged, and the only
//! durable effect is the guarded `pending -> active` transition.

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sha2::{Digest, Sha512};
use subtle::ConstantTimeEq;
use tracing::{error, info, warn};
use utoipa::ToSchema;

use super::PaymentConfig;
use crate::storage::{CateringStore, SubscriptionId};

/// Notification body as delivered by Midtrans.
///
/// Missing or non-string fields read as empty strings, so a signature
/// computed over them simply fails to match. Unlisted fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct PaymentNotification {
    #[serde(default, deserialize_with = "lenient_string")]
    pub order_id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub status_code: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub gross_amount: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub signature_key: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub transaction_status: String,
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        _ => Ok(String::new()),
    }
}

/// Midtrans `transaction_status` values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionStatus {
    Capture,
    Settlement,
    Pending,
    Deny,
    Expire,
    Cancel,
    Refund,
    PartialRefund,
    Failure,
    Authorize,
    Unrecognized(String),
}

impl TransactionStatus {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "capture" => TransactionStatus::Capture,
            "settlement" => TransactionStatus::Settlement,
            "pending" => TransactionStatus::Pending,
            "deny" => TransactionStatus::Deny,
            "expire" => TransactionStatus::Expire,
            "cancel" => TransactionStatus::Cancel,
            "refund" => TransactionStatus::Refund,
            "partial_refund" => TransactionStatus::PartialRefund,
            "failure" => TransactionStatus::Failure,
            "authorize" => TransactionStatus::Authorize,
            other => TransactionStatus::Unrecognized(other.to_string()),
        }
    }

    /// Only `capture` and `settlement` mean the money arrived.
    pub fn is_success(&self) -> bool {
        matches!(self, TransactionStatus::Capture | TransactionStatus::Settlement)
    }
}

/// What a verified notification led to. Every variant is acknowledged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotificationOutcome {
    /// This delivery moved the subscription from `pending` to `active`.
    Activated(SubscriptionId),
    /// Nothing pending to activate: redelivery, or an unknown id.
    AlreadyProcessed(SubscriptionId),
    /// Not a success status; nothing to do.
    IgnoredStatus(TransactionStatus),
    /// Order id carries no subscription id.
    UnparseableOrderId,
    /// The store failed; the update was not applied.
    StoreUnavailable,
}

impl NotificationOutcome {
    /// Acknowledgement message returned to the payment processor.
    pub fn message(&self) -> &'static str {
        match self {
            NotificationOutcome::Activated(_) | NotificationOutcome::AlreadyProcessed(_) => {
                "Notification processed successfully."
            }
            NotificationOutcome::IgnoredStatus(_) => "Notification acknowledged.",
            NotificationOutcome::UnparseableOrderId => "OK, but order ID format is incorrect.",
            NotificationOutcome::StoreUnavailable => "OK, but the update could not be applied.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid notification signature")]
pub struct InvalidSignature;

/// `hex(SHA-512(order_id || status_code || gross_amount || server_key))`.
pub fn compute_signature(
    order_id: &str,
    status_code: &str,
    gross_amount: &str,
    server_key: &str,
) -> String {
    let mut hasher = Sha512::new();
    hasher.update(order_id.as_bytes());
    hasher.update(status_code.as_bytes());
    hasher.update(gross_amount.as_bytes());
    hasher.update(server_key.as_bytes());
    hex::encode(hasher.finalize())
}

/// Constant-time, case-insensitive comparison against the expected signature.
pub fn verify_signature(notification: &PaymentNotification, server_key: &str) -> bool {
    let expected = compute_signature(
        &notification.order_id,
        &notification.status_code,
        &notification.gross_amount,
        server_key,
    );
    let presented = notification.signature_key.to_ascii_lowercase();
    bool::from(presented.as_bytes().ct_eq(expected.as_bytes()))
}

/// Subscription id from `<PREFIX>-<subscription id>-<nonce>`.
pub fn parse_subscription_id(order_id: &str) -> Option<SubscriptionId> {
    order_id.split('-').nth(1)?.parse().ok()
}

/// Verify and apply one notification.
///
/// # Errors
/// Returns [`InvalidSignature`] when the signature does not match; nothing is
/// read from or written to the store in that case.
pub fn process_notification(
    store: &dyn CateringStore,
    config: &PaymentConfig,
    notification: &PaymentNotification,
) -> Result<NotificationOutcome, InvalidSignature> {
    let order_id = notification.order_id.as_str();

    if !verify_signature(notification, config.server_key()) {
        warn!(order_id, "Payment notification rejected: invalid signature");
        return Err(InvalidSignature);
    }

    let status = TransactionStatus::parse(&notification.transaction_status);
    if !status.is_success() {
        info!(
            order_id,
            transaction_status = %notification.transaction_status,
            "Payment notification acknowledged without state change"
        );
        return Ok(NotificationOutcome::IgnoredStatus(status));
    }

    let Some(subscription_id) = parse_subscription_id(order_id) else {
        warn!(order_id, "Payment notification order id has no subscription id");
        return Ok(NotificationOutcome::UnparseableOrderId);
    };

    match store.activate_if_pending(subscription_id) {
        Ok(0) => {
            info!(order_id, subscription_id, "No pending subscription to activate");
            Ok(NotificationOutcome::AlreadyProcessed(subscription_id))
        }
        Ok(_) => {
            info!(order_id, subscription_id, "Subscription activated by payment");
            Ok(NotificationOutcome::Activated(subscription_id))
        }
        Err(e) => {
            error!(
                order_id,
                subscription_id,
                error = %e,
                "Subscription activation failed"
            );
            Ok(NotificationOutcome::StoreUnavailable)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payments::MidtransEnvironment;
    use crate::storage::{CateringDatabase, SubscriptionStatus};
    use crate::test_support::{new_subscription, UnavailableStore, TEST_SERVER_KEY};
    use tempfile::TempDir;

    fn config() -> PaymentConfig {
        PaymentConfig::new(TEST_SERVER_KEY, MidtransEnvironment::Sandbox)
    }

    fn signed(order_id: &str, status: &str, gross: &str) -> PaymentNotification {
        PaymentNotification {
            order_id: order_id.to_string(),
            status_code: "200".to_string(),
            gross_amount: gross.to_string(),
            signature_key: compute_signature(order_id, "200", gross, TEST_SERVER_KEY),
            transaction_status: status.to_string(),
        }
    }

    fn store_with_pending() -> (CateringDatabase, SubscriptionId, TempDir) {
        let dir = TempDir::new().unwrap();
        let db = CateringDatabase::open(&dir.path().join("test.redb")).unwrap();
        let sub = db.create_subscription(new_subscription(1)).unwrap();
        (db, sub.id, dir)
    }

    fn status_of(db: &CateringDatabase, id: SubscriptionId) -> SubscriptionStatus {
        db.get_subscription(id).unwrap().unwrap().status
    }

    #[test]
    fn signature_is_lowercase_hex_over_every_field() {
        let sig = compute_signature("SEACATERING-1-1", "200", "10000.00", "key");
        assert_eq!(sig.len(), 128);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
        assert_eq!(sig, compute_signature("SEACATERING-1-1", "200", "10000.00", "key"));
        assert_ne!(sig, compute_signature("SEACATERING-1-1", "200", "10000.01", "key"));
    }

    #[test]
    fn uppercase_signature_is_accepted() {
        let mut notification = signed("SEACATERING-1-1", "settlement", "10000.00");
        notification.signature_key = notification.signature_key.to_ascii_uppercase();
        assert!(verify_signature(&notification, TEST_SERVER_KEY));
    }

    #[test]
    fn order_id_parsing() {
        assert_eq!(parse_subscription_id("SEACATERING-42-1700000000"), Some(42));
        assert_eq!(parse_subscription_id("SEACATERING-42"), Some(42));
        assert_eq!(parse_subscription_id("SEACATERING"), None);
        assert_eq!(parse_subscription_id("SEACATERING-abc-1"), None);
        assert_eq!(parse_subscription_id(""), None);
    }

    #[test]
    fn missing_and_non_string_fields_read_as_empty() {
        let notification: PaymentNotification =
            serde_json::from_str(r#"{"order_id":"X-1-2","gross_amount":10000,"extra":true}"#)
                .unwrap();
        assert_eq!(notification.order_id, "X-1-2");
        assert_eq!(notification.gross_amount, "");
        assert_eq!(notification.signature_key, "");
    }

    #[test]
    fn settlement_activates_pending_subscription() {
        let (db, id, _dir) = store_with_pending();
        let notification = signed(&format!("SEACATERING-{id}-1"), "settlement", "150000.00");

        let outcome = process_notification(&db, &config(), &notification).unwrap();
        assert_eq!(outcome, NotificationOutcome::Activated(id));
        assert_eq!(status_of(&db, id), SubscriptionStatus::Active);
    }

    #[test]
    fn redelivery_is_a_no_op() {
        let (db, id, _dir) = store_with_pending();
        let notification = signed(&format!("SEACATERING-{id}-1"), "capture", "150000.00");

        process_notification(&db, &config(), &notification).unwrap();
        let second = process_notification(&db, &config(), &notification).unwrap();
        assert_eq!(second, NotificationOutcome::AlreadyProcessed(id));
        assert_eq!(status_of(&db, id), SubscriptionStatus::Active);
    }

    #[test]
    fn tampered_amount_is_rejected_without_mutation() {
        let (db, id, _dir) = store_with_pending();
        let mut notification = signed(&format!("SEACATERING-{id}-1"), "settlement", "150000.00");
        notification.gross_amount = "1.00".to_string();

        let result = process_notification(&db, &config(), &notification);
        assert_eq!(result, Err(InvalidSignature));
        assert_eq!(status_of(&db, id), SubscriptionStatus::Pending);
    }

    #[test]
    fn wrong_server_key_is_rejected() {
        let (db, id, _dir) = store_with_pending();
        let order_id = format!("SEACATERING-{id}-1");
        let mut notification = signed(&order_id, "settlement", "150000.00");
        notification.signature_key = compute_signature(&order_id, "200", "150000.00", "other-key");

        assert!(process_notification(&db, &config(), &notification).is_err());
        assert_eq!(status_of(&db, id), SubscriptionStatus::Pending);
    }

    #[test]
    fn non_success_statuses_leave_subscription_pending() {
        let (db, id, _dir) = store_with_pending();
        for status in ["pending", "deny", "expire", "cancel", "refund", "something_new"] {
            let notification = signed(&format!("SEACATERING-{id}-1"), status, "150000.00");
            let outcome = process_notification(&db, &config(), &notification).unwrap();
            assert!(matches!(outcome, NotificationOutcome::IgnoredStatus(_)), "{status}");
        }
        assert_eq!(status_of(&db, id), SubscriptionStatus::Pending);
    }

    #[test]
    fn unparseable_order_id_is_acknowledged() {
        let (db, id, _dir) = store_with_pending();
        let notification = signed("SEACATERING", "settlement", "150000.00");
        let outcome = process_notification(&db, &config(), &notification).unwrap();
        assert_eq!(outcome, NotificationOutcome::UnparseableOrderId);
        assert_eq!(status_of(&db, id), SubscriptionStatus::Pending);
    }

    #[test]
    fn store_failure_is_acknowledged() {
        let notification = signed("SEACATERING-1-1", "settlement", "150000.00");
        let outcome = process_notification(&UnavailableStore, &config(), &notification).unwrap();
        assert_eq!(outcome, NotificationOutcome::StoreUnavailable);
    }

    #[test]
    fn bad_signature_never_reaches_store() {
        let mut notification = signed("SEACATERING-1-1", "settlement", "150000.00");
        notification.signature_key = "00".repeat(64);
        let result = process_notification(&UnavailableStore, &config(), &notification);
        assert_eq!(result, Err(InvalidSignature));
    }
}
