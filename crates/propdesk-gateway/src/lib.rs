// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook ingress for Propdesk.
//!
//! An axum router that authenticates Telegram webhook calls with a shared
//! secret, parses the update and hands it to an [`UpdateHandler`]
//! (propdesk_core::UpdateHandler). Each request is processed to completion
//! before the response is written.

pub mod auth;
pub mod handlers;
pub mod server;

pub use auth::{SECRET_HEADER, WebhookAuth};
pub use server::{GatewayState, HealthState, build_router, start_server};
