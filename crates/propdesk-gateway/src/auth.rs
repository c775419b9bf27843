// SPDX-FileCopyrightText: 2026 Propdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook shared-secret check.
//!
//! Telegram echoes the secret registered with `setWebhook` in the
//! `X-Telegram-Bot-Api-Secret-Token` header. When no secret is configured
//! every request is rejected (fail-closed).

use axum::http::HeaderMap;

/// Header Telegram uses to echo the webhook secret.
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Webhook authentication configuration.
#[derive(Clone)]
pub struct WebhookAuth {
    /// Expected secret. `None` rejects everything.
    pub secret: Option<String>,
}

impl std::fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebhookAuth")
            .field("secret", &self.secret.as_ref().map(|_| "[redacted]"))
            .finish()
    }
}

impl WebhookAuth {
    pub fn new(secret: Option<String>) -> Self {
        Self { secret }
    }

    /// True when the request carries the configured secret.
    pub fn verify(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.secret.as_deref() else {
            tracing::error!("telegram.webhook_secret is not configured -- rejecting webhook");
            return false;
        };
        let provided = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok());
        match provided {
            Some(token) if token == expected => true,
            Some(_) => {
                tracing::warn!("webhook rejected: secret mismatch");
                false
            }
            None => {
                tracing::warn!("webhook rejected: missing secret header");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(secret: Option<&str>) -> HeaderMap {
        let mut map = HeaderMap::new();
        if let Some(s) = secret {
            map.insert(SECRET_HEADER, HeaderValue::from_str(s).unwrap());
        }
        map
    }

    #[test]
    fn matching_secret_passes() {
        let auth = WebhookAuth::new(Some("s3cret".into()));
        assert!(auth.verify(&headers(Some("s3cret"))));
    }

    #[test]
    fn wrong_or_missing_secret_fails() {
        let auth = WebhookAuth::new(Some("s3cret".into()));
        assert!(!auth.verify(&headers(Some("guess"))));
        assert!(!auth.verify(&headers(None)));
    }

    #[test]
    fn unconfigured_secret_fails_closed() {
        let auth = WebhookAuth::new(None);
        assert!(!auth.verify(&headers(Some("anything"))));
        assert!(!auth.verify(&headers(None)));
    }

    #[test]
    fn debug_redacts_secret() {
        let auth = WebhookAuth::new(Some("s3cret".into()));
        let out = format!("{auth:?}");
        assert!(!out.contains("s3cret"));
        assert!(out.contains("[redacted]"));
    }
}
