//! # HTTP Servers
//!
//! Two services share this module:
//!
//! - **Print agent** ([`serve_agent`]): runs next to the printer and accepts
//!   ZPL from the browser. Open CORS, JSON everywhere, 404 JSON for anything
//!   unknown.
//! - **Designer server** ([`serve`]): label type registry, ZPL generation,
//!   PNG preview, and the print proxy that copies ZPL to a printer share.
//!
//! ## Usage
//!
//! ```bash
//! etiket agent --port 18080
//! etiket serve --listen 0.0.0.0:8080 --share-host PRINTSRV
//! ```

mod handlers;
mod state;

pub use handlers::agent::{MISSING_LOCAL_FIELDS, MISSING_PRINT_FIELDS};
pub use state::{AgentState, AppState};

use axum::{
    Router, middleware,
    routing::{any, delete, get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::{AgentConfig, ServerConfig};
use crate::error::{EtiketError, Result};
use crate::registry::Registry;
use crate::transport::{RawTcpClient, ShareProxy, spooler};

/// Routes of the local print agent.
pub fn agent_router(state: Arc<AgentState>) -> Router {
    Router::new()
        .route(
            "/print",
            post(handlers::agent::print).fallback(handlers::not_found),
        )
        .route(
            "/printers",
            get(handlers::agent::printers).fallback(handlers::not_found),
        )
        .route(
            "/print-local",
            post(handlers::agent::print_local).fallback(handlers::not_found),
        )
        .fallback(handlers::not_found)
        .layer(middleware::from_fn(handlers::cors))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes of the designer server.
pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/label/zpl", post(handlers::label::zpl))
        .route("/api/label/preview", post(handlers::label::preview))
        .route(
            "/api/label-types",
            get(handlers::label_types::list).post(handlers::label_types::save),
        )
        .route("/api/label-types/:id", delete(handlers::label_types::delete))
        .route("/api/print", any(handlers::print::print))
        .fallback(handlers::not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the local print agent.
pub async fn serve_agent(config: AgentConfig) -> Result<()> {
    let spooler = spooler::detect().await;
    let state = Arc::new(AgentState::new(RawTcpClient::new(), spooler));
    let app = agent_router(state);

    let addr = config.listen_addr();
    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        EtiketError::TransportConnection(format!("Failed to bind to {}: {}", addr, e))
    })?;
    info!(addr = %addr, "print agent listening");

    axum::serve(listener, app)
        .await
        .map_err(|e| EtiketError::TransportConnection(format!("Server error: {}", e)))?;
    Ok(())
}

/// Start the designer server.
///
/// ## Example
///
/// ```no_run
/// use etiket::config::ServerConfig;
/// use etiket::server::serve;
///
/// # async fn example() -> etiket::error::Result<()> {
/// serve(ServerConfig::default()).await?;
/// # Ok(())
/// # }
/// ```
pub async fn serve(config: ServerConfig) -> Result<()> {
    let http_client = reqwest::Client::builder()
        .user_agent("etiket/0.1")
        .build()
        .map_err(|e| EtiketError::Registry(format!("HTTP client error: {}", e)))?;

    let registry = Registry::new(config.registry.clone().into_store(http_client.clone()));
    // A failed load leaves the built-ins in place; the error is already logged
    let _ = registry.load().await;

    let proxy = ShareProxy::new(config.copy_command());
    let state = Arc::new(AppState::new(config.clone(), registry, proxy, http_client));
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            EtiketError::TransportConnection(format!(
                "Failed to bind to {}: {}",
                config.listen_addr, e
            ))
        })?;
    info!(
        addr = %config.listen_addr,
        share_host = %config.share_host,
        "designer server listening"
    );

    axum::serve(listener, app)
        .await
        .map_err(|e| EtiketError::TransportConnection(format!("Server error: {}", e)))?;
    Ok(())
}
