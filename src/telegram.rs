//! Telegram delivery
//!
//! Talks to the Bot API directly over HTTP: multipart `sendPhoto` when a
//! chart is available, JSON `sendMessage` otherwise. Delivery is a boolean
//! outcome by contract; the discovery loop only marks a token as known
//! after a `true`, so any failure here means the token is retried next pass.

use reqwest::multipart;
use tracing::{debug, error};

use crate::config::TelegramConfig;
use crate::error::Result;

pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(config.timeout_secs))
                .build()
                .unwrap_or_default(),
            api_url: config.api_url.clone(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        }
    }

    /// Send an alert, with the chart attached when one was rendered.
    ///
    /// Never propagates an error: transport failures, non-2xx statuses and
    /// bad payloads all collapse to `false` after being logged.
    pub async fn send(&self, message: &str, chart: Option<Vec<u8>>) -> bool {
        if message.is_empty() || self.bot_token.is_empty() || self.chat_id.is_empty() {
            error!("Telegram message or credentials missing; nothing sent");
            return false;
        }

        let result = match chart {
            Some(png) => self.send_photo(message, png).await,
            None => self.send_message(message).await,
        };

        match result {
            Ok(()) => {
                debug!("Telegram alert delivered ({} chars)", message.len());
                true
            }
            Err(e) => {
                error!("Telegram delivery failed: {}", e);
                false
            }
        }
    }

    async fn send_photo(&self, caption: &str, png: Vec<u8>) -> Result<()> {
        let url = format!("{}/bot{}/sendPhoto", self.api_url, self.bot_token);

        let photo = multipart::Part::bytes(png)
            .file_name("graph.png")
            .mime_str("image/png")?;
        let form = multipart::Form::new()
            .text("chat_id", self.chat_id.clone())
            .text("caption", caption.to_string())
            .text("parse_mode", "HTML")
            .part("photo", photo);

        self.client
            .post(&url)
            .multipart(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }

    async fn send_message(&self, text: &str) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_url, self.bot_token);

        let payload = serde_json::json!({
            "chat_id": self.chat_id,
            "text": text,
            "parse_mode": "HTML",
            "disable_web_page_preview": true,
        });

        self.client
            .post(&url)
            .json(&payload)
            .send()
            .await?
            .error_for_status()?;

        Ok(())
    }
}
