//! SolVanity web surface
//!
//! Accepts the vanity form, runs one grind session per request and streams
//! its events back as newline-delimited JSON.

use std::future::Future;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;

use solvanity_core::{SessionConfig, ToolCommand};

mod error;
mod form;
mod handlers;


pub use form::GrindForm;

/// Everything the server needs to know about its tools
#[derive(Debug, Clone)]
pub struct WebConfig {
    pub session: SessionConfig,
    /// `solana` CLI, only used for the version probe
    pub solana: ToolCommand,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            solana: ToolCommand::new("solana"),
        }
    }
}

#[derive(Clone)]
pub(crate) struct WebState {
    pub(crate) config: Arc<WebConfig>,
    /// Flips to `true` once the server starts shutting down
    pub(crate) shutdown: watch::Receiver<bool>,
}

impl WebState {
    pub(crate) fn new(config: WebConfig, shutdown: watch::Receiver<bool>) -> Self {
        Self {
            config: Arc::new(config),
            shutdown,
        }
    }
}

/// Bind `bind_addr` and serve until Ctrl-C.
///
/// # Errors
/// Returns an error when the socket cannot be bound or the server fails.
pub async fn serve_web(config: WebConfig, bind_addr: &str) -> Result<()> {
    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind web server at {bind_addr}"))?;
    info!("Listening on http://{}", listener.local_addr()?);

    serve_until(listener, config, async {
        let _ = tokio::signal::ctrl_c().await;
    })
    .await
}

/// Serve until `signal` resolves. Running grinds are then stopped, which ends
/// their streams and lets the graceful shutdown complete.
pub(crate) async fn serve_until<F>(listener: TcpListener, config: WebConfig, signal: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (stop, stopped) = watch::channel(false);

    axum::serve(listener, app_router(WebState::new(config, stopped)))
        .with_graceful_shutdown(async move {
            signal.await;
            info!("Shutting down, stopping running grinds");
            let _ = stop.send(true);
        })
        .await
        .context("web server failed")
}

pub(crate) fn app_router(state: WebState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/generate-vanity-address",
            post(handlers::generate_vanity_address),
        )
        .route("/api/tool-version", get(handlers::tool_version))
        .with_state(state)
}
