/// Chat platform boundary
///
/// The controller only needs "send a payload", "delete a message" and
/// "answer a button press". [`TelegramTransport`] implements them on top of
/// the Telegram Bot API.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    services::render::{Control, DisplayPayload},
};

pub type ChatId = i64;
pub type MessageId = i64;

const CAPTION_LIMIT: usize = 1024;
const MESSAGE_LIMIT: usize = 4096;

#[async_trait::async_trait]
pub trait ChatTransport: Send + Sync {
    /// Sends text, or a photo with caption, plus its button grid
    async fn send(&self, chat_id: ChatId, payload: &DisplayPayload) -> AppResult<MessageId>;

    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()>;

    /// Acknowledges a button press, optionally with a short toast
    async fn notify(&self, callback_id: &str, text: Option<&str>) -> AppResult<()>;
}

/// Cuts `text` to at most `limit` chars, marking the cut with an ellipsis
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(limit.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[derive(Debug, Serialize)]
struct InlineButton<'a> {
    text: &'a str,
    callback_data: String,
}

#[derive(Debug, Serialize)]
struct InlineKeyboard<'a> {
    inline_keyboard: Vec<Vec<InlineButton<'a>>>,
}

impl<'a> InlineKeyboard<'a> {
    fn from_controls(controls: &'a [Vec<Control>]) -> Option<Self> {
        if controls.is_empty() {
            return None;
        }
        let inline_keyboard = controls
            .iter()
            .map(|row| {
                row.iter()
                    .map(|control| InlineButton {
                        text: &control.label,
                        callback_data: control.action.to_string(),
                    })
                    .collect()
            })
            .collect();
        Some(Self { inline_keyboard })
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: ChatId,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboard<'a>>,
}

#[derive(Debug, Serialize)]
struct SendPhoto<'a> {
    chat_id: ChatId,
    photo: &'a str,
    caption: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboard<'a>>,
}

#[derive(Debug, Serialize)]
struct DeleteMessage {
    chat_id: ChatId,
    message_id: MessageId,
}

#[derive(Debug, Serialize)]
struct AnswerCallbackQuery<'a> {
    callback_query_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<&'a str>,
}

/// Envelope of every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: MessageId,
}

#[derive(Clone)]
pub struct TelegramTransport {
    http_client: HttpClient,
    /// `{api_url}/bot{token}`; never logged
    base_url: String,
}

impl TelegramTransport {
    /// `timeout` bounds every Bot API call; the controller holds the chat's
    /// lock while it sends
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder().timeout(timeout).build()?;
        Ok(Self {
            http_client,
            base_url: format!("{}/bot{}", api_url.trim_end_matches('/'), token),
        })
    }

    async fn call<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> AppResult<T> {
        let response = self
            .http_client
            .post(format!("{}/{}", self.base_url, method))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => {
                let description = description.unwrap_or_default();
                tracing::error!(method = %method, status = %status, description = %description, "Bot API call failed");
                Err(AppError::Chat(format!("{} failed: {}", method, description)))
            }
        }
    }
}

#[async_trait::async_trait]
impl ChatTransport for TelegramTransport {
    async fn send(&self, chat_id: ChatId, payload: &DisplayPayload) -> AppResult<MessageId> {
        if let Some(photo) = payload.photo_url.as_deref() {
            let request = SendPhoto {
                chat_id,
                photo,
                caption: truncate_chars(&payload.text, CAPTION_LIMIT),
                reply_markup: InlineKeyboard::from_controls(&payload.controls),
            };
            match self.call::<_, SentMessage>("sendPhoto", &request).await {
                Ok(sent) => return Ok(sent.message_id),
                // Telegram refuses some poster URLs; the text alone is still useful
                Err(e) => tracing::warn!(chat_id, error = %e, "Photo send failed, falling back to text"),
            }
        }

        let request = SendMessage {
            chat_id,
            text: truncate_chars(&payload.text, MESSAGE_LIMIT),
            reply_markup: InlineKeyboard::from_controls(&payload.controls),
        };
        let sent: SentMessage = self.call("sendMessage", &request).await?;
        Ok(sent.message_id)
    }

    async fn delete(&self, chat_id: ChatId, message_id: MessageId) -> AppResult<()> {
        let _: bool = self
            .call("deleteMessage", &DeleteMessage { chat_id, message_id })
            .await?;
        Ok(())
    }

    async fn notify(&self, callback_id: &str, text: Option<&str>) -> AppResult<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                &AnswerCallbackQuery {
                    callback_query_id: callback_id,
                    text,
                },
            )
            .await?;
        Ok(())
    }
}
