//! Ledgerline is a bookkeeping backend for personal finances.
//!
//! This library provides a JSON REST API for signing users up through an
//! external identity provider, recording income and expense transactions and
//! reading dashboard analytics computed from those transactions.
//!
//! Every response body is an [ApiResponse] envelope of the form
//! `{status, data, error, message}`.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod api_response;
mod app_state;
pub mod config;
mod dashboard;
mod database_id;
mod db;
mod email;
pub mod endpoints;
mod error;
mod identity;
mod logging;
mod not_found;
mod password;
mod routing;
mod sign_up;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use api_response::ApiResponse;
pub use app_state::AppState;
pub use dashboard::{DashboardResult, build_dashboard};
pub use db::{initialize as initialize_db, open_connection};
pub use email::Email;
pub use error::{Error, ErrorKind};
pub use identity::{ClerkClient, IdentityProvider, NewIdentity};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use password::PasswordHash;
pub use routing::{build_router, cors_layer};
pub use timezone::{get_timezone, to_local_time};
pub use transaction::{
    Category, Transaction, TransactionBuilder, TransactionType, create_transaction,
};
pub use user::{NewUser, User, UserId, create_user, get_user_by_id};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install terminate signal handler: {error}");
                std::future::pending::<()>().await;
            }
        }
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
