//! Telegram Bot API client and update types.

use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::json;
use shared::models::{ChannelIdentity, PollAnswer};
use tracing::debug;

use crate::{
    config::BotConfig,
    error::BotError,
    transport::{SentPoll, Transport},
    utils::display_name,
};

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    /// Commands posted inside a channel arrive here rather than in `message`.
    #[serde(default)]
    pub channel_post: Option<Message>,
    #[serde(default)]
    pub poll_answer: Option<TelegramPollAnswer>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub poll: Option<Poll>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl Chat {
    pub fn identity(&self) -> ChannelIdentity {
        let name = self.title.clone()
            .or_else(|| self.username.clone())
            .unwrap_or_else(|| "Unknown Channel".to_string());
        ChannelIdentity { id: self.id.to_string(), name }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

impl User {
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, self.last_name.as_deref(), self.username.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Poll {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramPollAnswer {
    pub poll_id: String,
    /// Absent when the answer was given on behalf of a chat.
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub option_ids: Vec<u32>,
}

impl TelegramPollAnswer {
    pub fn into_answer(self) -> Option<PollAnswer> {
        let user = self.user?;
        Some(PollAnswer {
            poll_id: self.poll_id,
            user_id: user.id,
            username: user.display_name(),
            option_ids: self.option_ids,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Stats,
    Leaderboard,
}

impl Command {
    /// Parses `/stats` or `/stats@BotName`, ignoring trailing arguments.
    pub fn parse(text: &str) -> Option<Self> {
        let word = text.split_whitespace().next()?;
        let name = word.strip_prefix('/')?;
        let name = name.split('@').next().unwrap_or(name);
        match name.to_lowercase().as_str() {
            "stats" => Some(Command::Stats),
            "leaderboard" => Some(Command::Leaderboard),
            _ => None,
        }
    }
}

pub struct TelegramClient {
    http: reqwest::Client,
    base_url: String,
    request_timeout: Duration,
}

impl TelegramClient {
    pub fn new(config: &BotConfig) -> Result<Self, BotError> {
        let request_timeout = Duration::from_secs(config.request_timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: format!("{}/bot{}", config.api_url.trim_end_matches('/'), config.token),
            request_timeout,
        })
    }

    async fn call<P, T>(&self, method: &str, payload: &P) -> Result<T, BotError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.call_with_timeout(method, payload, self.request_timeout).await
    }

    async fn call_with_timeout<P, T>(&self, method: &str, payload: &P, timeout: Duration) -> Result<T, BotError>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(method, "Calling Telegram API");
        let response: ApiResponse<T> = self.http
            .post(format!("{}/{}", self.base_url, method))
            .timeout(timeout)
            .json(payload)
            .send()
            .await?
            .json()
            .await?;

        match response {
            ApiResponse { ok: true, result: Some(result), .. } => Ok(result),
            ApiResponse { description, .. } => Err(BotError::Transport(
                description.unwrap_or_else(|| format!("{} failed", method))
            )),
        }
    }
}

#[async_trait]
impl Transport for TelegramClient {
    async fn send_message(&self, chat: &str, text: &str) -> Result<(), BotError> {
        let _: Message = self.call("sendMessage", &json!({
            "chat_id": chat,
            "text": text,
        }))
        .await?;
        Ok(())
    }

    async fn send_poll(&self, chat: &str, question: &str, options: &[String]) -> Result<SentPoll, BotError> {
        let options: Vec<_> = options.iter().map(|text| json!({ "text": text })).collect();
        let message: Message = self.call("sendPoll", &json!({
            "chat_id": chat,
            "question": question,
            "options": options,
            "is_anonymous": false,
            "allows_multiple_answers": false,
        }))
        .await?;

        let poll = message.poll
            .ok_or_else(|| BotError::Transport("sendPoll returned no poll".into()))?;
        Ok(SentPoll { poll_id: poll.id, message_id: message.message_id })
    }

    async fn get_channel_identity(&self, chat: &str) -> Result<ChannelIdentity, BotError> {
        let chat: Chat = self.call("getChat", &json!({ "chat_id": chat })).await?;
        Ok(chat.identity())
    }

    async fn set_webhook(&self, url: &str, secret: &str, allowed_updates: &[&str]) -> Result<(), BotError> {
        let _: bool = self.call("setWebhook", &json!({
            "url": url,
            "secret_token": secret,
            "allowed_updates": allowed_updates,
        }))
        .await?;
        Ok(())
    }

    async fn delete_webhook(&self) -> Result<(), BotError> {
        let _: bool = self.call("deleteWebhook", &json!({ "drop_pending_updates": false })).await?;
        Ok(())
    }

    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
        allowed_updates: &[&str],
    ) -> Result<Vec<Update>, BotError> {
        let payload = json!({
            "offset": offset,
            "timeout": timeout_secs,
            "allowed_updates": allowed_updates,
        });
        // The server holds the request open for up to `timeout_secs`.
        let timeout = self.request_timeout + Duration::from_secs(timeout_secs);
        self.call_with_timeout("getUpdates", &payload, timeout).await
    }
}
