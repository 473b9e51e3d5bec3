use serde::{Serialize, Deserialize};
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct PollOption {
    pub id: i64,
    pub text: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChannelIdentity {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PollRecord {
    pub poll_id: String,
    pub channel_id: String,
    pub channel_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Current vote of one user in one poll. At most one exists per `(poll_id, user_id)`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VoteRecord {
    pub poll_id: String,
    pub user_id: i64,
    pub username: String,
    pub option_id: i64,
    pub channel_id: String,
    pub channel_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Transport-neutral answer event. An empty `option_ids` is a retraction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PollAnswer {
    pub poll_id: String,
    pub user_id: i64,
    pub username: String,
    pub option_ids: Vec<u32>,
}

impl PollAnswer {
    pub fn is_retraction(&self) -> bool {
        self.option_ids.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct OptionTally {
    pub text: String,
    pub votes: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "backend", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct WeeklyVote {
    pub username: String,
    pub sort_order: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub username: String,
    pub score: u32,
}
