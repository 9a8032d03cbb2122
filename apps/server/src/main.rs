//! # Oaxaca Server
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Startup Sequence                               │
//! │                                                                         │
//! │  1. tracing subscriber (RUST_LOG or default filter)                    │
//! │  2. ServerConfig::load (defaults → TOML → OAXACA_* env → validate)     │
//! │  3. Database::new (pool + migrations), provision floor tables          │
//! │  4. spawn waiter dispatcher (unless interval is 0)                     │
//! │  5. axum::serve until Ctrl+C / SIGTERM                                 │
//! │  6. stop dispatcher, close pool                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```bash
//! oaxaca-server --config ./server.toml
//! OAXACA_PORT=8080 OAXACA_WAITER_MODE=batch oaxaca-server
//! ```

use std::path::PathBuf;

use anyhow::Context;
use oaxaca_db::Database;
use oaxaca_server::{build_router, dispatcher, AppState, ServerConfig};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "info,oaxaca=debug,sqlx=warn";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = ServerConfig::load(config_path_from_args()).context("loading configuration")?;
    info!(
        bind = %config.http.bind_address(),
        database = %config.database.path.display(),
        tables = config.floor.table_count,
        waiter_mode = ?config.allocation.waiter_mode,
        "Configuration loaded"
    );

    let db = Database::new(config.db_config())
        .await
        .context("opening database")?;
    let created = db
        .tables()
        .provision(config.floor.table_count)
        .await
        .context("provisioning tables")?;
    info!(created, total = config.floor.table_count, "Floor ready");

    let state = AppState::new(db.clone(), config.clone());

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let dispatcher_task = config
        .dispatch_interval()
        .map(|period| dispatcher::spawn(state.allocator(), period, shutdown_rx));

    let app = build_router(state);
    let bind_addr = config.http.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!(addr = %bind_addr, "HTTP server started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    // Receiver may already be gone when the dispatcher is disabled.
    let _ = shutdown_tx.send(true);
    if let Some(handle) = dispatcher_task {
        handle.await.context("joining waiter dispatcher")?;
    }
    db.close().await;

    info!("Server shutdown complete");
    Ok(())
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}

/// `--config <path>` / `-c <path>`.
fn config_path_from_args() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    args.iter()
        .position(|a| a == "--config" || a == "-c")
        .and_then(|i| args.get(i + 1))
        .map(PathBuf::from)
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}
