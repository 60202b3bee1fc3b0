//! # lookout-server
//!
//! Read-only JSON API over the engine's [`DashboardState`]:
//!
//! | Route       | Body                                   |
//! |-------------|----------------------------------------|
//! | `/agents`   | agent statuses in roster order         |
//! | `/activity` | activity feed, newest first            |
//! | `/health`   | `{status, agents, uptime, activity_events}` |
//!
//! Trailing slashes are accepted and every response carries permissive CORS
//! headers so browser dashboards on other origins can poll it.

pub mod routes;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::http::{Method, header};
use axum::routing::get;
use lookout_core::{LookoutError, Result};
use lookout_engine::DashboardState;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::routes::{activity, agents, health, not_found, preflight};

/// Build the API router.
pub fn router(state: Arc<DashboardState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/agents", get(agents).options(preflight))
        .route("/agents/", get(agents).options(preflight))
        .route("/activity", get(activity).options(preflight))
        .route("/activity/", get(activity).options(preflight))
        .route("/health", get(health).options(preflight))
        .route("/health/", get(health).options(preflight))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

/// Bind `addr` and serve until Ctrl-C.
///
/// Failing to bind is reported as [`LookoutError::ServerBind`].
pub async fn serve(addr: SocketAddr, state: Arc<DashboardState>) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|source| LookoutError::ServerBind { addr, source })?;

    info!(%addr, "Serving /agents /activity /health");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| LookoutError::Server {
            message: e.to_string(),
        })?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    info!("Shutting down");
}
