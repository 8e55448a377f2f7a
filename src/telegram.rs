use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::error::TelegramError;

const API_BASE: &str = "https://api.telegram.org";

/// Seconds Telegram holds a getUpdates request open
pub const LONG_POLL_SECS: u64 = 30;

/// Envelope around every Bot API response
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    pub from: Option<User>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

/// Command shown in the client's command menu
#[derive(Debug, Clone, Serialize)]
pub struct BotCommand {
    pub command: String,
    pub description: String,
}

impl BotCommand {
    pub fn new(command: &str, description: &str) -> Self {
        Self {
            command: command.to_string(),
            description: description.to_string(),
        }
    }
}

#[derive(Serialize)]
struct GetUpdates<'a> {
    offset: Option<i64>,
    timeout: u64,
    allowed_updates: &'a [&'a str],
}

#[derive(Serialize)]
struct ReplyParameters {
    message_id: i64,
    allow_sending_without_reply: bool,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_parameters: Option<ReplyParameters>,
}

#[derive(Serialize)]
struct SetMyCommands<'a> {
    commands: &'a [BotCommand],
}

/// Minimal Telegram Bot API client over reqwest
#[derive(Clone)]
pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self, TelegramError> {
        let http = reqwest::Client::builder()
            // Must outlive the long-poll window
            .timeout(Duration::from_secs(LONG_POLL_SECS + 10))
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{API_BASE}/bot{token}"),
        })
    }

    async fn call<P, T>(&self, method: &str, params: &P) -> Result<T, TelegramError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method, "Calling Telegram API");

        let response: ApiResponse<T> = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .json(params)
            .send()
            .await?
            .json()
            .await?;

        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse {
                description,
                error_code,
                ..
            } => Err(TelegramError::Api {
                code: error_code,
                description: description.unwrap_or_else(|| format!("{method} returned no result")),
            }),
        }
    }

    pub async fn get_me(&self) -> Result<User, TelegramError> {
        self.call("getMe", &serde_json::json!({})).await
    }

    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<(), TelegramError> {
        let _: bool = self
            .call("setMyCommands", &SetMyCommands { commands })
            .await?;
        Ok(())
    }

    /// Long-poll for new messages starting at `offset`
    pub async fn get_updates(&self, offset: Option<i64>) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: LONG_POLL_SECS,
                allowed_updates: &["message"],
            },
        )
        .await
    }

    /// Send plain text, optionally as a reply to `reply_to`
    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to: Option<i64>,
    ) -> Result<Message, TelegramError> {
        self.call(
            "sendMessage",
            &SendMessage {
                chat_id,
                text,
                reply_parameters: reply_to.map(|message_id| ReplyParameters {
                    message_id,
                    allow_sending_without_reply: true,
                }),
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_update_batch() {
        let raw = r#"{
            "ok": true,
            "result": [
                {"update_id": 10, "message": {
                    "message_id": 1,
                    "chat": {"id": 5, "type": "private", "first_name": "Ann"},
                    "from": {"id": 5, "is_bot": false, "first_name": "Ann", "username": "ann"},
                    "text": "привет"
                }},
                {"update_id": 11, "message": {
                    "message_id": 2,
                    "chat": {"id": -100, "type": "supergroup", "title": "Friends"},
                    "text": "/povod@PovodBot"
                }},
                {"update_id": 12}
            ]
        }"#;

        let response: ApiResponse<Vec<Update>> = serde_json::from_str(raw).unwrap();
        let updates = response.result.unwrap();

        assert_eq!(updates.len(), 3);
        let first = updates[0].message.as_ref().unwrap();
        assert_eq!(first.chat.kind, ChatKind::Private);
        assert_eq!(first.text.as_deref(), Some("привет"));
        assert_eq!(updates[1].message.as_ref().unwrap().chat.kind, ChatKind::Supergroup);
        assert!(updates[2].message.is_none());
    }

    #[test]
    fn decodes_error_envelope() {
        let raw = r#"{"ok": false, "error_code": 401, "description": "Unauthorized"}"#;
        let response: ApiResponse<User> = serde_json::from_str(raw).unwrap();
        assert!(!response.ok);
        assert_eq!(response.error_code, Some(401));
    }

    #[test]
    fn send_message_omits_missing_reply() {
        let body = serde_json::to_value(SendMessage {
            chat_id: 1,
            text: "hi",
            reply_parameters: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"chat_id": 1, "text": "hi"}));
    }
}
