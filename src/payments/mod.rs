// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Midtrans payment integration.
//!
//! - `config` - server key, environment and order id prefix
//! - `notification` - webhook signature check and subscription activation
//! - `snap` - payment token creation for pending subscriptions

pub mod config;
pub mod notification;
pub mod snap;

pub use config::{MidtransEnvironment, PaymentConfig, UnknownEnvironment, DEFAULT_ORDER_PREFIX};
pub use notification::{
    compute_signature, parse_subscription_id, process_notification, verify_signature,
    InvalidSignature, NotificationOutcome, PaymentNotification, TransactionStatus,
};
pub use snap::{format_order_id, gross_amount, SnapClient, SnapError, SnapToken, SnapTransaction};
