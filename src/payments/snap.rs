// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Midtrans Snap client for creating payment tokens.

use std::fmt;
use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use super::PaymentConfig;
use crate::storage::SubscriptionId;

const TRANSACTIONS_PATH: &str = "/snap/v1/transactions";

#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    #[error("Snap request failed: {0}")]
    Request(String),

    #[error("Snap response was invalid: {0}")]
    InvalidResponse(String),
}

/// One Snap transaction to open.
pub struct SnapTransaction<'a> {
    pub order_id: &'a str,
    /// Whole IDR.
    pub gross_amount: i64,
    pub customer_name: &'a str,
    pub customer_email: &'a str,
    pub item_id: &'a str,
    pub item_name: &'a str,
}

/// Token and hosted payment page for an opened transaction.
#[derive(Debug, Clone, Deserialize)]
pub struct SnapToken {
    pub token: String,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

#[derive(Clone)]
pub struct SnapClient {
    base_url: String,
    server_key: String,
    http: Client,
}

impl fmt::Debug for SnapClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SnapClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl SnapClient {
    pub fn new(config: &PaymentConfig) -> Result<Self, SnapError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| SnapError::Request(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: config.environment.snap_base_url().to_string(),
            server_key: config.server_key().to_string(),
            http,
        })
    }

    /// Point the client at another host (local stubs).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub async fn create_transaction_token(
        &self,
        transaction: SnapTransaction<'_>,
    ) -> Result<SnapToken, SnapError> {
        let payload = json!({
            "transaction_details": {
                "order_id": transaction.order_id,
                "gross_amount": transaction.gross_amount,
            },
            "customer_details": {
                "first_name": transaction.customer_name,
                "email": transaction.customer_email,
            },
            "item_details": [{
                "id": transaction.item_id,
                "price": transaction.gross_amount,
                "quantity": 1,
                "name": transaction.item_name,
            }],
        });

        let response = self
            .http
            .post(format!(
                "{}{}",
                self.base_url.trim_end_matches('/'),
                TRANSACTIONS_PATH
            ))
            .basic_auth(&self.server_key, Some(""))
            .header("Accept", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| SnapError::Request(format!("POST {TRANSACTIONS_PATH} failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SnapError::Request(format!(
                "POST {TRANSACTIONS_PATH} returned {status}: {body}"
            )));
        }

        let token: SnapToken = response.json().await.map_err(|e| {
            SnapError::InvalidResponse(format!("POST {TRANSACTIONS_PATH} invalid JSON: {e}"))
        })?;
        if token.token.is_empty() {
            return Err(SnapError::InvalidResponse("empty token".to_string()));
        }

        info!(order_id = transaction.order_id, "Snap transaction created");
        Ok(token)
    }
}

/// `<prefix>-<subscription id>-<unix seconds>`, the shape the notification
/// processor parses back.
pub fn format_order_id(prefix: &str, subscription_id: SubscriptionId, unix_seconds: i64) -> String {
    format!("{prefix}-{subscription_id}-{unix_seconds}")
}

/// Snap amounts are whole IDR.
pub fn gross_amount(total_price: f64) -> i64 {
    total_price.round() as i64
}
