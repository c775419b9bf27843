// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles POST/OPTIONS /webhook/telegram and GET /health.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::{debug, error};

use propdesk_core::InboundUpdate;

use crate::server::GatewayState;

/// Response body for a processed webhook.
#[derive(Debug, Serialize)]
pub struct WebhookResponse {
    pub success: bool,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// POST /webhook/telegram
///
/// Checks the shared secret before anything else, parses the update and runs
/// it through the handler to completion.
pub async fn post_telegram_webhook(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    if !state.auth.verify(&headers) {
        return error_response(StatusCode::FORBIDDEN, "forbidden");
    }

    let update = match propdesk_telegram::parse_update(&body) {
        Ok(update) => update,
        Err(e) => {
            error!(error = %e, "failed to parse webhook body");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string());
        }
    };

    if let InboundUpdate::Unsupported { update_id } = &update {
        debug!(update_id, "acknowledging unsupported update");
    }

    match state.handler.handle(update).await {
        Ok(()) => (StatusCode::OK, Json(WebhookResponse { success: true })).into_response(),
        Err(e) => {
            error!(error = %e, "webhook handler failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// OPTIONS /webhook/telegram
pub async fn options_telegram_webhook() -> Response {
    let mut response = StatusCode::OK.into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("authorization, x-client-info, apikey, content-type, x-telegram-bot-api-secret-token"),
    );
    response
}

/// GET /health
///
/// Unauthenticated liveness probe.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
    })
}
