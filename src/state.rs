// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::sync::Arc;

use crate::auth::AuthConfig;
use crate::payments::{PaymentConfig, SnapClient};
use crate::storage::CateringStore;

/// Shared application state.
///
/// Everything here is built once at startup and read-only afterwards; the
/// store does its own synchronization.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn CateringStore>,
    pub auth: Arc<AuthConfig>,
    pub payments: Arc<PaymentConfig>,
    /// `None` disables payment token creation (503).
    pub snap: Option<Arc<SnapClient>>,
}

impl AppState {
    pub fn new(store: Arc<dyn CateringStore>, auth: AuthConfig, payments: PaymentConfig) -> Self {
        Self {
            store,
            auth: Arc::new(auth),
            payments: Arc::new(payments),
            snap: None,
        }
    }

    pub fn with_snap_client(mut self, client: SnapClient) -> Self {
        self.snap = Some(Arc::new(client));
        self
    }
}
