//! qboard web surface
//!
//! Serves the question board over HTTP with warp. Startup is strict: the
//! store is probed before the listener binds, so a misconfigured store
//! stops the process before anything is served.

#![warn(unreachable_pub)]

pub mod config;
pub mod html;
pub mod routes;
pub mod telemetry;

use std::net::SocketAddr;
use std::sync::Arc;

use qboard_core::{BoardError, MemorySheet, QuestionBoard, SheetStore};
use qboard_sheets::{SheetsError, SheetsStore};
use thiserror::Error;
use tokio::signal;
use tracing::info;

pub use config::{ConfigError, QBoardConfig, StoreConfig};
pub use routes::{routes, AppState, VIEWER_COOKIE};
pub use telemetry::LogFormat;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Startup failures
#[derive(Debug, Error)]
pub enum ServeError {
    /// Store backend could not be constructed
    #[error("store setup failed: {0}")]
    Store(#[from] SheetsError),

    /// Store probe failed
    #[error(transparent)]
    Connect(#[from] BoardError),

    /// Listener could not bind
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: SocketAddr,
        /// warp failure
        #[source]
        source: warp::Error,
    },
}

/// Construct the configured store backend
///
/// # Errors
/// `SheetsError` when the Sheets client cannot be built (e.g. missing token).
pub fn build_store(config: &QBoardConfig) -> Result<Arc<dyn SheetStore>, SheetsError> {
    match &config.store {
        StoreConfig::Memory => Ok(Arc::new(MemorySheet::with_worksheet(
            config.board.worksheet.clone(),
        ))),
        StoreConfig::Sheets(sheets) => Ok(Arc::new(SheetsStore::from_config(sheets)?)),
    }
}

/// Build the store and probe it
///
/// # Errors
/// `ServeError::Store` or `ServeError::Connect`.
pub async fn connect(config: &QBoardConfig) -> Result<QuestionBoard, ServeError> {
    info!(backend = config.store.backend(), "Initializing store...");
    let store = build_store(config)?;
    Ok(QuestionBoard::connect(store, config.board.clone()).await?)
}

/// Connect, bind and serve until Ctrl+C or SIGTERM
///
/// # Errors
/// Any `ServeError` raised before the server starts.
pub async fn start_server(config: QBoardConfig) -> Result<(), ServeError> {
    let board = connect(&config).await?;
    let state = AppState::new(board);

    info!("Binding to {}", config.bind);
    let (addr, server) = warp::serve(routes(state.clone()))
        .try_bind_with_graceful_shutdown(config.bind, shutdown_signal())
        .map_err(|source| ServeError::Bind {
            addr: config.bind,
            source,
        })?;

    info!("Server running on {addr}");
    server.await;

    if let Some(board) = state.into_board() {
        board.close();
    }
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                tracing::error!("Failed to install signal handler: {e}");
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
}
