// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! Environment variable names, defaults, and the startup configuration
//! loaded from them.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `HOST` | Server bind address | `0.0.0.0` |
//! | `PORT` | Server bind port | `8080` |
//! | `DATA_DIR` | Directory holding the redb database file | `./data` |
//! | `JWT_SECRET` | HS256 signing secret (at least 32 bytes) | Required |
//! | `JWT_TTL_SECS` | Credential lifetime in seconds | `86400` |
//! | `MIDTRANS_SERVER_KEY` | Webhook signature secret and Snap credential | Required |
//! | `MIDTRANS_ENVIRONMENT` | `sandbox` or `production` | `sandbox` |
//! | `ORDER_ID_PREFIX` | Prefix of Midtrans order ids (no `-`) | `SEACATERING` |
//! | `CORS_ALLOWED_ORIGIN` | Browser origin allowed by CORS | `http://localhost:5173` |
//! | `TLS_CERT_PATH` / `TLS_KEY_PATH` | PEM files; both set enables HTTPS | unset |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info,tower_http=debug` |
//! | `SEED_ADMIN_EMAIL` | Registered user promoted to admin at startup | unset |

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::auth::{AuthConfig, AuthConfigError};
use crate::payments::{MidtransEnvironment, PaymentConfig, DEFAULT_ORDER_PREFIX};

pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";

/// Directory of the redb file. Created at startup if missing.
pub const DATA_DIR_ENV: &str = "DATA_DIR";
pub const JWT_SECRET_ENV: &str = "JWT_SECRET";
pub const JWT_TTL_SECS_ENV: &str = "JWT_TTL_SECS";
pub const MIDTRANS_SERVER_KEY_ENV: &str = "MIDTRANS_SERVER_KEY";
pub const MIDTRANS_ENVIRONMENT_ENV: &str = "MIDTRANS_ENVIRONMENT";
pub const ORDER_ID_PREFIX_ENV: &str = "ORDER_ID_PREFIX";
pub const CORS_ALLOWED_ORIGIN_ENV: &str = "CORS_ALLOWED_ORIGIN";
pub const TLS_CERT_PATH_ENV: &str = "TLS_CERT_PATH";
pub const TLS_KEY_PATH_ENV: &str = "TLS_KEY_PATH";
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";
pub const SEED_ADMIN_EMAIL_ENV: &str = "SEED_ADMIN_EMAIL";

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_DATA_DIR: &str = "./data";
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:5173";

/// Default `RUST_LOG` filter when the variable is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,tower_http=debug";

/// Database file name inside `DATA_DIR`.
pub const DATABASE_FILE: &str = "catering.redb";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },

    #[error(transparent)]
    Auth(#[from] AuthConfigError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsPaths {
    pub cert: PathBuf,
    pub key: PathBuf,
}

/// Everything the server needs at startup.
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub data_dir: PathBuf,
    pub auth: AuthConfig,
    pub payments: PaymentConfig,
    pub cors_allowed_origin: String,
    pub tls: Option<TlsPaths>,
    pub log_format: LogFormat,
    pub seed_admin_email: Option<String>,
}

impl fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerConfig")
            .field("bind_addr", &self.bind_addr)
            .field("data_dir", &self.data_dir)
            .field("auth", &self.auth)
            .field("payments", &self.payments)
            .field("cors_allowed_origin", &self.cors_allowed_origin)
            .field("tls", &self.tls)
            .field("log_format", &self.log_format)
            .finish_non_exhaustive()
    }
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let host: IpAddr = get(HOST_ENV)
            .unwrap_or_else(|| DEFAULT_HOST.to_string())
            .parse()
            .map_err(|e| ConfigError::Invalid {
                name: HOST_ENV,
                reason: format!("{e}"),
            })?;
        let port: u16 = match get(PORT_ENV) {
            Some(port) => port.parse().map_err(|e| ConfigError::Invalid {
                name: PORT_ENV,
                reason: format!("{e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let jwt_secret = get(JWT_SECRET_ENV).ok_or(ConfigError::Missing(JWT_SECRET_ENV))?;
        let mut auth = AuthConfig::new(jwt_secret)?;
        if let Some(ttl) = get(JWT_TTL_SECS_ENV) {
            let secs: u64 = ttl
                .parse()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| ConfigError::Invalid {
                    name: JWT_TTL_SECS_ENV,
                    reason: "must be a positive number of seconds".to_string(),
                })?;
            auth = auth.with_token_ttl(Duration::from_secs(secs));
        }

        let server_key =
            get(MIDTRANS_SERVER_KEY_ENV).ok_or(ConfigError::Missing(MIDTRANS_SERVER_KEY_ENV))?;
        let environment = match get(MIDTRANS_ENVIRONMENT_ENV) {
            Some(env) => env.parse().map_err(|e: crate::payments::UnknownEnvironment| {
                ConfigError::Invalid {
                    name: MIDTRANS_ENVIRONMENT_ENV,
                    reason: e.to_string(),
                }
            })?,
            None => MidtransEnvironment::default(),
        };
        let order_prefix =
            get(ORDER_ID_PREFIX_ENV).unwrap_or_else(|| DEFAULT_ORDER_PREFIX.to_string());
        if order_prefix.contains('-') {
            return Err(ConfigError::Invalid {
                name: ORDER_ID_PREFIX_ENV,
                reason: "must not contain '-'".to_string(),
            });
        }
        let payments = PaymentConfig::new(server_key, environment).with_order_prefix(order_prefix);

        let tls = match (get(TLS_CERT_PATH_ENV), get(TLS_KEY_PATH_ENV)) {
            (Some(cert), Some(key)) => Some(TlsPaths {
                cert: cert.into(),
                key: key.into(),
            }),
            (None, None) => None,
            (Some(_), None) => return Err(ConfigError::Missing(TLS_KEY_PATH_ENV)),
            (None, Some(_)) => return Err(ConfigError::Missing(TLS_CERT_PATH_ENV)),
        };

        let log_format = match get(LOG_FORMAT_ENV).as_deref() {
            Some("json") => LogFormat::Json,
            _ => LogFormat::Pretty,
        };

        Ok(Self {
            bind_addr: SocketAddr::new(host, port),
            data_dir: get(DATA_DIR_ENV)
                .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
                .into(),
            auth,
            payments,
            cors_allowed_origin: get(CORS_ALLOWED_ORIGIN_ENV)
                .unwrap_or_else(|| DEFAULT_CORS_ALLOWED_ORIGIN.to_string()),
            tls,
            log_format,
            seed_admin_email: get(SEED_ADMIN_EMAIL_ENV),
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }
}
