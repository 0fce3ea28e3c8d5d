// In crates/api-client/src/telegram.rs

use crate::types::TelegramReply;
use crate::{Error, Notifier, Result};
use app_config::TelegramCredentials;
use async_trait::async_trait;
use std::time::Duration;

/// Sends text messages to one chat through the Bot API.
pub struct TelegramClient {
    http_client: reqwest::Client,
    base_url: String,
    credentials: TelegramCredentials,
}

impl TelegramClient {
    pub fn new(base_url: &str, credentials: TelegramCredentials, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ClientBuildError(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            credentials,
        })
    }

    /// `POST {base}/bot{token}/sendMessage`
    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.credentials.bot_token)
    }
}

#[async_trait]
impl Notifier for TelegramClient {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, text: &str) -> Result<()> {
        let params = [
            ("chat_id", self.credentials.chat_id.as_str()),
            ("text", text),
        ];

        let response = self
            .http_client
            .post(self.send_message_url())
            .form(&params)
            .send()
            .await
            .map_err(Error::RequestFailed)?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        // Prefer the API's own description over the raw body when it parses.
        let body = response.text().await.unwrap_or_default();
        let body = match serde_json::from_str::<TelegramReply>(&body) {
            Ok(reply) if !reply.ok => reply.description.unwrap_or(body),
            _ => body,
        };
        Err(Error::HttpStatus {
            status: status.as_u16(),
            body,
        })
    }
}
