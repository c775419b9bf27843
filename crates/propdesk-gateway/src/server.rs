// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the webhook ingress.

use std::future::Future;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use propdesk_config::model::GatewayConfig;
use propdesk_core::{PropdeskError, UpdateHandler};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::auth::WebhookAuth;
use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: std::time::Instant,
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    /// Processes parsed updates to completion.
    pub handler: Arc<dyn UpdateHandler>,
    pub auth: WebhookAuth,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(handler: Arc<dyn UpdateHandler>, webhook_secret: Option<String>) -> Self {
        Self {
            handler,
            auth: WebhookAuth::new(webhook_secret),
            health: HealthState {
                start_time: std::time::Instant::now(),
            },
        }
    }
}

/// Builds the router:
/// - POST /webhook/telegram (shared secret)
/// - OPTIONS /webhook/telegram (CORS preflight)
/// - GET /health (unauthenticated)
///
/// Any other method on the webhook path is answered with 405.
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route(
            "/webhook/telegram",
            post(handlers::post_telegram_webhook).options(handlers::options_telegram_webhook),
        )
        .route("/health", get(handlers::get_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Binds `host:port` and serves until `shutdown` resolves.
pub async fn start_server<F>(
    config: &GatewayConfig,
    state: GatewayState,
    shutdown: F,
) -> Result<(), PropdeskError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| PropdeskError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("Gateway server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| PropdeskError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    Ok(())
}
