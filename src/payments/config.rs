// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Midtrans account settings shared by the webhook and the Snap client.

use std::fmt;
use std::str::FromStr;

/// Default order id prefix (`<PREFIX>-<subscription id>-<unix seconds>`).
pub const DEFAULT_ORDER_PREFIX: &str = "SEACATERING";

const SANDBOX_SNAP_BASE_URL: &str = "https://app.sandbox.midtrans.com";
const PRODUCTION_SNAP_BASE_URL: &str = "https://app.midtrans.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MidtransEnvironment {
    #[default]
    Sandbox,
    Production,
}

impl MidtransEnvironment {
    pub fn snap_base_url(&self) -> &'static str {
        match self {
            MidtransEnvironment::Sandbox => SANDBOX_SNAP_BASE_URL,
            MidtransEnvironment::Production => PRODUCTION_SNAP_BASE_URL,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown Midtrans environment '{0}' (expected 'sandbox' or 'production')")]
pub struct UnknownEnvironment(pub String);

impl FromStr for MidtransEnvironment {
    type Err = UnknownEnvironment;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Ok(MidtransEnvironment::Sandbox),
            "production" => Ok(MidtransEnvironment::Production),
            _ => Err(UnknownEnvironment(s.to_string())),
        }
    }
}

/// Server key and order id conventions.
///
/// Built once at startup. `Debug` never prints the server key.
#[derive(Clone)]
pub struct PaymentConfig {
    server_key: String,
    pub environment: MidtransEnvironment,
    pub order_prefix: String,
}

impl PaymentConfig {
    pub fn new(server_key: impl Into<String>, environment: MidtransEnvironment) -> Self {
        Self {
            server_key: server_key.into(),
            environment,
            order_prefix: DEFAULT_ORDER_PREFIX.to_string(),
        }
    }

    pub fn with_order_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.order_prefix = prefix.into();
        self
    }

    pub(crate) fn server_key(&self) -> &str {
        &self.server_key
    }
}

impl fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("environment", &self.environment)
            .field("order_prefix", &self.order_prefix)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn environment_parses_case_insensitively() {
        assert_eq!(
            "Production".parse::<MidtransEnvironment>(),
            Ok(MidtransEnvironment::Production)
        );
        assert_eq!(
            " sandbox ".parse::<MidtransEnvironment>(),
            Ok(MidtransEnvironment::Sandbox)
        );
        assert!("staging".parse::<MidtransEnvironment>().is_err());
    }

    #[test]
    fn base_url_follows_environment() {
        assert!(MidtransEnvironment::Sandbox.snap_base_url().contains("sandbox"));
        assert!(!MidtransEnvironment::Production.snap_base_url().contains("sandbox"));
    }

    #[test]
    fn debug_hides_server_key() {
        let config = PaymentConfig::new("SB-Mid-server-secret", MidtransEnvironment::Sandbox);
        let debug = format!("{config:?}");
        assert!(!debug.contains("SB-Mid-server-secret"));
        assert!(debug.contains("SEACATERING"));
    }
}
