pub mod format;


pub use format::{format_keywords_message, markdown_to_html};

use futures::future::join_all;
use keywordpulse_core::{
    ConfigError, CoreError, ErrorExt, TelegramConfig, TelegramError, ENV_TELEGRAM_CHAT_ID,
};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Returned instead of a real message id when the bot is not configured.
pub const STUB_MESSAGE_ID: &str = "test-message-id";
const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageFormat {
    #[default]
    Markdown,
    Html,
}

impl MessageFormat {
    pub fn parse_mode(&self) -> &'static str {
        match self {
            MessageFormat::Markdown => "Markdown",
            MessageFormat::Html => "HTML",
        }
    }

    /// Converts composer markdown into the body sent for this format.
    pub fn render(&self, text: &str) -> String {
        match self {
            MessageFormat::Markdown => text.to_string(),
            MessageFormat::Html => markdown_to_html(text),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TelegramResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Deserialize)]
struct ChatInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    username: Option<String>,
    #[serde(default)]
    first_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SendSummary {
    pub total: usize,
    pub success: usize,
    pub failed: usize,
}

/// Outcome of a fan-out send, keyed by chat id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MultiSendReport {
    pub results: BTreeMap<String, String>,
    pub errors: BTreeMap<String, String>,
    pub summary: SendSummary,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatValidation {
    pub valid: bool,
    pub message: String,
    pub chat_id: String,
}

/// Chat notification sink backed by the Telegram Bot API.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http_client: Client,
    api_base: String,
    bot_token: Option<String>,
    chat_id: Option<String>,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        if config.bot_token.is_none() || config.chat_id.is_none() {
            warn!("TELEGRAM_BOT_TOKEN or TELEGRAM_CHAT_ID is not set, notifications run in test mode");
        }

        Ok(Self {
            http_client,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            bot_token: config.bot_token.clone(),
            chat_id: config.chat_id.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.bot_token.is_some() && self.chat_id.is_some()
    }

    /// Sends markdown text to the configured chat and returns the message id.
    pub async fn notify(&self, text: &str) -> Result<String, CoreError> {
        self.notify_as(text, MessageFormat::Markdown).await
    }

    pub async fn notify_as(&self, text: &str, format: MessageFormat) -> Result<String, CoreError> {
        let (Some(token), Some(chat_id)) = (&self.bot_token, &self.chat_id) else {
            info!("Test mode: returning stub message id");
            return Ok(STUB_MESSAGE_ID.to_string());
        };

        let message_id = self
            .send_with_token(token, chat_id, &format.render(text), format)
            .await?;
        info!("Notification sent: message_id={}", message_id);
        Ok(message_id)
    }

    /// Sends the same text to every distinct chat concurrently. Per-chat
    /// failures are collected in the report rather than failing the whole call.
    pub async fn send_to_many(
        &self,
        chat_ids: &[String],
        text: &str,
        format: MessageFormat,
    ) -> MultiSendReport {
        let mut seen = BTreeSet::new();
        let chat_ids: Vec<&String> = chat_ids.iter().filter(|id| seen.insert(*id)).collect();

        let mut report = MultiSendReport {
            summary: SendSummary {
                total: chat_ids.len(),
                ..SendSummary::default()
            },
            ..MultiSendReport::default()
        };

        let Some(token) = &self.bot_token else {
            info!("Test mode: reporting {} stub deliveries", chat_ids.len());
            for chat_id in &chat_ids {
                report
                    .results
                    .insert(chat_id.to_string(), STUB_MESSAGE_ID.to_string());
            }
            report.summary.success = report.results.len();
            return report;
        };

        let body = format.render(text);
        let sends = chat_ids
            .iter()
            .map(|chat_id| self.send_with_token(token, chat_id.as_str(), &body, format));
        let outcomes = join_all(sends).await;

        for (chat_id, outcome) in chat_ids.into_iter().zip(outcomes) {
            match outcome {
                Ok(message_id) => {
                    report.results.insert(chat_id.clone(), message_id);
                }
                Err(e) => {
                    warn!("Delivery to chat {} failed", chat_id);
                    e.log_warn();
                    report.errors.insert(chat_id.clone(), e.to_string());
                }
            }
        }
        report.summary.success = report.results.len();
        report.summary.failed = report.errors.len();

        info!(
            "Sent to {}/{} chats",
            report.summary.success, report.summary.total
        );
        report
    }

    /// Checks that the bot can reach `chat_id`, defaulting to the configured
    /// chat when none is given.
    pub async fn validate_chat(&self, chat_id: Option<&str>) -> Result<ChatValidation, CoreError> {
        let chat_id = chat_id
            .filter(|id| !id.trim().is_empty())
            .or(self.chat_id.as_deref())
            .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                var_name: ENV_TELEGRAM_CHAT_ID.to_string(),
            })?
            .to_string();

        let Some(token) = &self.bot_token else {
            return Ok(ChatValidation {
                valid: false,
                message: "Telegram bot token is not configured".to_string(),
                chat_id,
            });
        };

        let response = self
            .http_client
            .get(self.method_url(token, "getChat"))
            .query(&[("chat_id", chat_id.as_str())])
            .send()
            .await?;
        let body: TelegramResponse<ChatInfo> = Self::parse("getChat", response).await?;

        let validation = match (body.ok, body.result) {
            (true, Some(chat)) => {
                let name = chat
                    .title
                    .or(chat.username)
                    .or(chat.first_name)
                    .unwrap_or_else(|| chat_id.clone());
                ChatValidation {
                    valid: true,
                    message: format!("Chat '{}' is reachable", name),
                    chat_id,
                }
            }
            _ => ChatValidation {
                valid: false,
                message: body
                    .description
                    .unwrap_or_else(|| "Chat could not be found".to_string()),
                chat_id,
            },
        };

        debug!("Validated chat {}: {}", validation.chat_id, validation.valid);
        Ok(validation)
    }

    pub async fn send_message(
        &self,
        chat_id: &str,
        text: &str,
        format: MessageFormat,
    ) -> Result<String, CoreError> {
        match &self.bot_token {
            Some(token) => self.send_with_token(token, chat_id, text, format).await,
            None => Ok(STUB_MESSAGE_ID.to_string()),
        }
    }

    async fn send_with_token(
        &self,
        token: &str,
        chat_id: &str,
        text: &str,
        format: MessageFormat,
    ) -> Result<String, CoreError> {
        let payload = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": format.parse_mode(),
        });

        debug!("Sending Telegram message to chat {}", chat_id);
        let response = self
            .http_client
            .post(self.method_url(token, "sendMessage"))
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                error!("Network error sending Telegram message: {}", e);
                CoreError::Network(e)
            })?;

        let status = response.status().as_u16();
        let body: TelegramResponse<SentMessage> = Self::parse("sendMessage", response).await?;

        match (body.ok, body.result) {
            (true, Some(message)) => Ok(message.message_id.to_string()),
            (true, None) => Err(TelegramError::InvalidResponse {
                details: "sendMessage succeeded without a message".to_string(),
            }
            .into()),
            (false, _) => {
                let description = body
                    .description
                    .unwrap_or_else(|| "unknown error".to_string());
                error!("Telegram rejected sendMessage ({}): {}", status, description);
                Err(TelegramError::ApiRejected {
                    method: "sendMessage".to_string(),
                    status,
                    description,
                }
                .into())
            }
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        method: &str,
        response: Response,
    ) -> Result<TelegramResponse<T>, CoreError> {
        let status = response.status();
        let raw = response.text().await?;

        serde_json::from_str(&raw).map_err(|_| {
            if status.is_success() {
                TelegramError::InvalidResponse {
                    details: format!("{} returned a non-JSON body", method),
                }
            } else {
                TelegramError::ApiRejected {
                    method: method.to_string(),
                    status: status.as_u16(),
                    description: raw.clone(),
                }
            }
            .into()
        })
    }

    // The token is part of the path; never log this URL.
    fn method_url(&self, token: &str, method: &str) -> String {
        format!("{}/bot{}/{}", self.api_base, token, method)
    }
}
