//! HTTP edge for the EduEquity web tier.
//!
//! # Overview
//! Every request passes the authorization gate first. Requests under
//! `/api/v1` that are allowed through are forwarded to the upstream API;
//! anything else goes to the page router supplied by the embedding
//! application, or gets a 404.
//!
//! The decisions themselves live in `edge-core`; this crate owns the axum
//! wiring, the upstream HTTP client, configuration and logging setup.

pub mod config;
pub mod convert;
pub mod error;
pub mod forward;
pub mod logging;
pub mod middleware;
pub mod state;
pub mod upstream;

use axum::{middleware::from_fn_with_state, routing::any, Router};
use tokio::net::TcpListener;
use tracing::info;

pub use config::GatewayConfig;
pub use error::GatewayError;
pub use state::AppState;

/// The gateway without any page routes.
pub fn app(config: &GatewayConfig) -> Result<Router, GatewayError> {
    app_with_pages(config, Router::new())
}

/// The gateway in front of `pages`. The gate wraps the page router and its
/// fallback as well as the proxy route.
pub fn app_with_pages(config: &GatewayConfig, pages: Router) -> Result<Router, GatewayError> {
    let state = AppState::new(config)?;
    let api = Router::new()
        .route("/api/v1", any(forward::forward))
        .route("/api/v1/{*rest}", any(forward::forward))
        .with_state(state.clone());

    Ok(pages
        .merge(api)
        .layer(from_fn_with_state(state, middleware::authorize)))
}

pub async fn run(listener: TcpListener, config: &GatewayConfig) -> Result<(), GatewayError> {
    let app = app(config)?;
    info!(
        addr = %listener.local_addr()?,
        upstream = %config.upstream_origin,
        "edge gateway listening"
    );
    axum::serve(listener, app).await?;
    Ok(())
}
