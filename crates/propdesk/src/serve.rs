// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `propdesk serve` command implementation.
//!
//! Opens SQLite storage, connects the Telegram channel when a bot token is
//! configured, wires the processing pipeline behind the webhook gateway and
//! serves until SIGTERM or Ctrl+C.

use std::sync::Arc;

use propdesk_agent::{Pipeline, install_signal_handler};
use propdesk_config::model::PropdeskConfig;
use propdesk_core::{
    ChannelAdapter, HealthStatus, PluginAdapter, PropdeskError, StorageAdapter, UpdateHandler,
};
use propdesk_gateway::{GatewayState, start_server};
use propdesk_storage::SqliteStorage;
use propdesk_telegram::TelegramChannel;
use tracing::{info, warn};

/// Runs the webhook service until a shutdown signal arrives.
pub async fn run_serve(config: PropdeskConfig) -> Result<(), PropdeskError> {
    init_tracing(&config.agent.log_level);

    info!(agent_name = config.agent.name.as_str(), "starting propdesk serve");

    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let storage: Arc<dyn StorageAdapter> = Arc::new(storage);
    info!(path = config.storage.database_path.as_str(), "storage initialized");

    let channel = connect_channel(&config).await?;

    if config.telegram.webhook_secret.is_none() {
        warn!("telegram.webhook_secret is not set: every webhook call will be rejected with 403");
    }
    if !config.crm.dialogue_enabled {
        info!("dialogue engine disabled, replying with keyword auto-replies");
    }

    let pipeline: Arc<dyn UpdateHandler> =
        Arc::new(Pipeline::new(storage.clone(), channel.clone(), &config.crm));
    let state = GatewayState::new(pipeline, config.telegram.webhook_secret.clone());

    let token = install_signal_handler();
    let shutdown = {
        let token = token.clone();
        async move { token.cancelled().await }
    };
    let served = start_server(&config.gateway, state, shutdown).await;

    info!("gateway stopped, closing storage");
    if let Some(channel) = channel
        && let Err(e) = channel.shutdown().await
    {
        warn!(error = %e, "channel shutdown failed");
    }
    storage.close().await?;
    log_memory_stats();
    served
}

/// Builds the Telegram channel, or `None` without a bot token.
async fn connect_channel(
    config: &PropdeskConfig,
) -> Result<Option<Arc<dyn ChannelAdapter>>, PropdeskError> {
    if config.telegram.bot_token.is_none() {
        warn!("telegram.bot_token is not set: replies are stored but not delivered");
        return Ok(None);
    }

    let channel = TelegramChannel::new(&config.telegram)?;
    match channel.health_check().await {
        Ok(HealthStatus::Healthy) => info!("telegram channel connected"),
        Ok(status) => warn!(?status, "telegram channel not healthy, continuing"),
        Err(e) => warn!(error = %e, "telegram health check failed, continuing"),
    }
    Ok(Some(Arc::new(channel)))
}

#[cfg(not(target_env = "msvc"))]
fn log_memory_stats() {
    use tikv_jemalloc_ctl::{epoch, stats};

    if epoch::advance().is_err() {
        return;
    }
    let allocated = stats::allocated::read().unwrap_or(0);
    let resident = stats::resident::read().unwrap_or(0);
    info!(
        allocated_mb = allocated / (1024 * 1024),
        resident_mb = resident / (1024 * 1024),
        "final memory stats"
    );
}

#[cfg(target_env = "msvc")]
fn log_memory_stats() {}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` wins over `agent.log_level` when set.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("propdesk={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
