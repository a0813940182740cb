use crate::domain::{NotificationError, Notifier};
use crate::telegram::TelegramConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

/// Notifier posting messages to a Telegram chat through the Bot API
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    config: TelegramConfig,
}

impl TelegramNotifier {
    /// Builds the HTTP client; missing credentials only fail at send time
    pub fn new(config: TelegramConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build telegram http client")?;

        Ok(Self { client, config })
    }

    pub fn is_configured(&self) -> bool {
        !self.config.bot_token.is_empty() && !self.config.chat_id.is_empty()
    }

    fn send_message_url(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.bot_token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    #[instrument(skip(self, text), fields(chat_id = %self.config.chat_id))]
    async fn send(&self, text: String) -> Result<(), NotificationError> {
        if self.config.bot_token.is_empty() {
            return Err(NotificationError::Config("bot token is empty".to_string()));
        }
        if self.config.chat_id.is_empty() {
            return Err(NotificationError::Config("chat id is empty".to_string()));
        }

        let response = self
            .client
            .post(self.send_message_url())
            .json(&SendMessageRequest {
                chat_id: &self.config.chat_id,
                text: &text,
            })
            .send()
            .await
            .map_err(|e| NotificationError::Network(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(NotificationError::Remote(status.as_u16()));
        }

        debug!("telegram message delivered");
        Ok(())
    }
}
