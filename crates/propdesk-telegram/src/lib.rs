// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram integration for Propdesk.
//!
//! [`update`] turns webhook bodies into [`InboundUpdate`](propdesk_core::InboundUpdate)s.
//! [`TelegramChannel`] implements [`ChannelAdapter`] over the Bot API via
//! teloxide: `sendMessage` with inline keyboards, `answerCallbackQuery` and
//! `getFile`.

pub mod media;
pub mod update;

use async_trait::async_trait;
use propdesk_config::model::TelegramConfig;
use propdesk_core::error::PropdeskError;
use propdesk_core::traits::{ChannelAdapter, PluginAdapter};
use propdesk_core::types::{AdapterType, HealthStatus, MessageId, OutboundMessage, QuickReplies};
use teloxide::prelude::*;
use teloxide::types::{CallbackQueryId, ChatId, FileId, InlineKeyboardButton, InlineKeyboardMarkup};
use tracing::debug;

pub use update::parse_update;

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    token: String,
    api_url: String,
}

impl TelegramChannel {
    /// Creates a new Telegram channel adapter.
    ///
    /// Requires `config.bot_token` to be set.
    pub fn new(config: &TelegramConfig) -> Result<Self, PropdeskError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            PropdeskError::Config("telegram.bot_token is required for outbound delivery".into())
        })?;

        if token.is_empty() {
            return Err(PropdeskError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        // Sends and file downloads must hit the same Bot API server.
        let api_url = url::Url::parse(&config.api_url).map_err(|e| {
            PropdeskError::Config(format!(
                "telegram.api_url `{}` is not a valid URL: {e}",
                config.api_url
            ))
        })?;

        Ok(Self {
            bot: Bot::new(token).set_api_url(api_url),
            token: token.to_string(),
            api_url: config.api_url.clone(),
        })
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, PropdeskError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), PropdeskError> {
        debug!("Telegram channel shutting down");
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, PropdeskError> {
        let chat_id = parse_chat_id(&msg.chat_id)?;
        let request = self.bot.send_message(chat_id, msg.text);
        let sent = match msg.keyboard.as_ref() {
            Some(keyboard) => request.reply_markup(inline_keyboard(keyboard)).await,
            None => request.await,
        }
        .map_err(|e| PropdeskError::Channel {
            message: format!("failed to send message: {e}"),
            source: Some(Box::new(e)),
        })?;

        Ok(MessageId(sent.id.0.to_string()))
    }

    async fn answer_callback(&self, callback_id: &str) -> Result<(), PropdeskError> {
        self.bot
            .answer_callback_query(CallbackQueryId(callback_id.to_string()))
            .await
            .map_err(|e| PropdeskError::Channel {
                message: format!("failed to answer callback query: {e}"),
                source: Some(Box::new(e)),
            })?;
        Ok(())
    }

    async fn resolve_file_url(&self, file_id: &str) -> Result<String, PropdeskError> {
        let file = self
            .bot
            .get_file(FileId(file_id.to_string()))
            .await
            .map_err(|e| PropdeskError::Channel {
                message: format!("failed to get file info: {e}"),
                source: Some(Box::new(e)),
            })?;
        debug!(file_id, "resolved Telegram file path");
        Ok(media::file_download_url(&self.api_url, &self.token, &file.path))
    }
}

/// Converts a quick-reply keyboard into Telegram's inline keyboard markup.
pub fn inline_keyboard(keyboard: &QuickReplies) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.payload.clone()))
            .collect::<Vec<_>>()
    }))
}

fn parse_chat_id(raw: &str) -> Result<ChatId, PropdeskError> {
    raw.parse::<i64>()
        .map(ChatId)
        .map_err(|e| PropdeskError::Channel {
            message: format!("invalid chat_id `{raw}`: {e}"),
            source: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use propdesk_core::types::QuickReply;

    fn config(token: Option<&str>) -> TelegramConfig {
        TelegramConfig {
            bot_token: token.map(str::to_string),
            ..TelegramConfig::default()
        }
    }

    #[test]
    fn new_requires_bot_token() {
        assert!(TelegramChannel::new(&config(None)).is_err());
        assert!(TelegramChannel::new(&config(Some(""))).is_err());
        assert!(TelegramChannel::new(&config(Some("123456:ABC-DEF1234ghIkl"))).is_ok());
    }

    #[test]
    fn custom_api_url_is_used_for_requests() {
        let channel = TelegramChannel::new(&TelegramConfig {
            api_url: "http://localhost:8081".into(),
            ..config(Some("test:token"))
        })
        .unwrap();
        assert_eq!(channel.bot.api_url().as_str(), "http://localhost:8081/");
        assert_eq!(
            media::file_download_url(&channel.api_url, &channel.token, "docs/a.pdf"),
            "http://localhost:8081/file/bottest:token/docs/a.pdf"
        );

        let broken = TelegramConfig {
            api_url: "http://".into(),
            ..config(Some("test:token"))
        };
        assert!(matches!(
            TelegramChannel::new(&broken),
            Err(PropdeskError::Config(_))
        ));
    }

    #[test]
    fn plugin_adapter_metadata() {
        let channel = TelegramChannel::new(&config(Some("test:token"))).unwrap();
        assert_eq!(channel.name(), "telegram");
        assert_eq!(channel.version(), semver::Version::new(0, 1, 0));
        assert_eq!(channel.adapter_type(), AdapterType::Channel);
    }

    #[test]
    fn chat_id_parsing() {
        assert_eq!(parse_chat_id("12345").unwrap(), ChatId(12345));
        assert_eq!(parse_chat_id("-100987").unwrap(), ChatId(-100987));
        assert!(parse_chat_id("telegram").is_err());
    }

    #[test]
    fn keyboard_rows_are_preserved() {
        let keyboard = QuickReplies {
            rows: vec![
                vec![
                    QuickReply::new("Villa", "property_type_villa"),
                    QuickReply::new("Plot", "property_type_plot"),
                ],
                vec![QuickReply::new("Commercial", "property_type_commercial")],
            ],
        };
        let markup = inline_keyboard(&keyboard);
        assert_eq!(markup.inline_keyboard.len(), 2);
        assert_eq!(markup.inline_keyboard[0].len(), 2);
        assert_eq!(markup.inline_keyboard[0][1].text, "Plot");
        assert_eq!(markup.inline_keyboard[1][0].text, "Commercial");
    }
}
