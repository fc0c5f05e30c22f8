//! A personal budget tracker: a local transaction ledger with a running
//! balance, a widget mirror that projects the balance into the platform
//! key-value store for home-screen widgets, and a backend relay that forwards
//! requests to the Plaid financial-data API.
//!
//! This library provides the ledger engine and its stores, plus the JSON REST
//! API served by the relay binary.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use rust_decimal::Decimal;
use serde_json::json;
use tokio::signal;

pub mod endpoints;
pub mod ledger;
mod logging;
pub mod relay;
mod routing;
mod state;
pub mod stores;
pub mod widget;

pub use ledger::{Ledger, LedgerEngine, Transaction, TransactionId, TransactionKind};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use routing::build_router;
pub use state::AppState;
pub use widget::{WidgetSnapshot, format_amount};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The user supplied an amount that is zero or negative.
    ///
    /// This is the only error surfaced synchronously to the user. The ledger
    /// is left untouched when it occurs.
    #[error("{0} is not a valid amount, the amount must be a positive number")]
    InvalidAmount(Decimal),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// A stored value could not be serialized or deserialized.
    #[error("could not serialize or deserialize a stored value: {0}")]
    SerializationError(String),

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLock,

    /// A call to the upstream financial-data API failed.
    ///
    /// The relay reports this to its client as HTTP 500 with the error
    /// message, and never retries.
    #[error("the upstream API call failed: {0}")]
    UpstreamApi(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        tracing::error!("an unhandled SQL error occurred: {value}");
        Error::SqlError(value)
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::SerializationError(value.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Self {
        Error::UpstreamApi(value.to_string())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        tracing::error!("request failed: {self}");

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
