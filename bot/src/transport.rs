use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared::models::ChannelIdentity;
use crate::{error::BotError, telegram::Update};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentPoll {
    pub poll_id: String,
    pub message_id: i64,
}

/// Messaging capability. Polls are always sent single-answer and
/// non-anonymous, since votes are tracked per user.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_message(&self, chat: &str, text: &str) -> Result<(), BotError>;

    async fn send_poll(&self, chat: &str, question: &str, options: &[String]) -> Result<SentPoll, BotError>;

    async fn get_channel_identity(&self, chat: &str) -> Result<ChannelIdentity, BotError>;

    /// Routes updates to `url`, signed with `secret` in the secret header.
    async fn set_webhook(&self, url: &str, secret: &str, allowed_updates: &[&str]) -> Result<(), BotError>;

    async fn delete_webhook(&self) -> Result<(), BotError>;

    /// Updates with id `>= offset`; fetching acknowledges everything before it.
    async fn get_updates(
        &self,
        offset: i64,
        timeout_secs: u64,
        allowed_updates: &[&str],
    ) -> Result<Vec<Update>, BotError>;
}
