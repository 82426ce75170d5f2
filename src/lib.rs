//! Storefront Admin is the back office for a small online store.
//!
//! This library provides the admin dashboard for managing a tree of product
//! categories and the products in them, the storefront home page, and
//! session based authentication for admins. Pages are served as HTML and
//! the admin API speaks JSON.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod category;
mod dashboard;
mod db;
mod endpoints;
mod error;
mod error_page;
mod home;
mod html;
mod logging;
mod pagination;
mod product;
mod router;
mod routing;
mod statistics;
#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{Admin, AdminId, PasswordHash, ValidatedPassword, create_admin};
pub use category::{CategoryHierarchy, CategoryId, NewCategory, SqliteCategoryRepository};
pub use db::initialize as initialize_db;
pub use error::{Error, ErrorKind};
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use product::{NewProduct, create_product};
pub use routing::build_router;
pub use statistics::set_home_view_count;

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        if let Err(error) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {error}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(error) => {
                tracing::error!("failed to install signal handler: {error}");
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
