// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{net::SocketAddr, process::ExitCode, sync::Arc, time::Duration};

use axum::http::HeaderValue;
use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio::signal;
use tokio_util::sync::CancellationToken;

use catering_server::{
    api::router,
    auth::Role,
    config::{ConfigError, ServerConfig},
    logging::init_tracing,
    payments::{SnapClient, SnapError},
    state::AppState,
    storage::{normalize_email, CateringDatabase, CateringStore, StoreError},
};

/// In-flight requests get this long to finish after a shutdown signal.
const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

#[derive(Debug, thiserror::Error)]
enum StartupError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to open database: {0}")]
    Store(#[from] StoreError),
    #[error("failed to initialize Snap client: {0}")]
    Snap(#[from] SnapError),
    #[error("CORS origin is not a valid header value")]
    InvalidOrigin,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[tokio::main]
async fn main() -> ExitCode {
    let config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };
    init_tracing(config.log_format);

    match run(config).await {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error = %e, "Server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run(config: ServerConfig) -> Result<(), StartupError> {
    // Must happen before any TLS use (server or Snap client).
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        tracing::debug!("rustls crypto provider already installed");
    }

    tracing::info!(?config, "Configuration loaded");

    std::fs::create_dir_all(&config.data_dir)?;
    let db = CateringDatabase::open(&config.database_path())?;
    tracing::info!(path = %config.database_path().display(), "Database opened");

    if let Some(email) = config.seed_admin_email.as_deref() {
        seed_admin(&db, email)?;
    }

    let allowed_origin = HeaderValue::from_str(&config.cors_allowed_origin)
        .map_err(|_| StartupError::InvalidOrigin)?;
    let snap = SnapClient::new(&config.payments)?;
    let state = AppState::new(Arc::new(db), config.auth, config.payments).with_snap_client(snap);
    let app = router(state, allowed_origin);

    let shutdown = CancellationToken::new();
    let handle = Handle::<SocketAddr>::new();
    tokio::spawn(watch_for_shutdown(shutdown.clone()));
    tokio::spawn({
        let shutdown = shutdown.clone();
        let handle = handle.clone();
        async move {
            shutdown.cancelled().await;
            tracing::info!(grace_secs = SHUTDOWN_GRACE_PERIOD.as_secs(), "Draining connections");
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE_PERIOD));
        }
    });

    let addr = config.bind_addr;
    match config.tls {
        Some(tls) => {
            let tls_config = RustlsConfig::from_pem_file(&tls.cert, &tls.key).await?;
            tracing::info!(%addr, "Catering server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "Catering server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    Ok(())
}

fn seed_admin(store: &dyn CateringStore, email: &str) -> Result<(), StoreError> {
    match store.find_user_by_email(&normalize_email(email))? {
        Some(user) if user.role == Role::Admin => {
            tracing::info!(user_id = user.id, "Seed admin already has admin role");
        }
        Some(user) => {
            store.set_user_role(user.id, Role::Admin)?;
            tracing::info!(user_id = user.id, previous_role = %user.role, "Seed admin promoted");
        }
        None => tracing::warn!("Seed admin email is not registered; nothing promoted"),
    }
    Ok(())
}

async fn watch_for_shutdown(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
    shutdown.cancel();
}
