// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Catering Server - Meal-Plan Subscription Backend
//!
//! Customers register, log in, subscribe to meal plans and pay through
//! Midtrans Snap. Payment confirmation arrives asynchronously on a signed
//! webhook that activates the subscription exactly once.
//!
//! ## Modules
//!
//! - `api` - HTTP API handlers (Axum)
//! - `auth` - Credentials, anti-forgery check, roles, password hashing
//! - `payments` - Midtrans webhook processing and Snap client
//! - `storage` - Record store trait and its redb implementation

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod payments;
pub mod state;
pub mod storage;

#[cfg(test)]
pub(crate) mod test_support;
