use sqlx::SqlitePool;
use shared::models::{ChannelIdentity, PollOption, PollRecord};
use time::OffsetDateTime;
use tracing::debug;
use crate::{error::BotError, utils::{from_unix, to_unix}};

/// Polls created by this bot. Membership here is the only test for whether
/// an answer event belongs to us.
pub struct PollLedger;

impl PollLedger {
    /// Records a dispatched poll and the option ids in the order they were sent.
    /// Returns `false` without touching anything when the poll is already known.
    pub async fn record_poll(
        pool: &SqlitePool,
        poll_id: &str,
        channel: &ChannelIdentity,
        choices: &[i64],
        created_at: OffsetDateTime,
    ) -> Result<bool, BotError> {
        let mut tx = pool.begin().await?;

        let inserted = sqlx::query(
            "INSERT OR IGNORE INTO daily_polls (poll_id, channel_id, channel_name, created_at)
             VALUES (?, ?, ?, ?)"
        )
        .bind(poll_id)
        .bind(&channel.id)
        .bind(&channel.name)
        .bind(to_unix(created_at))
        .execute(&mut *tx)
        .await?
        .rows_affected() > 0;

        if !inserted {
            debug!(poll_id, "Poll already recorded");
            tx.rollback().await?;
            return Ok(false);
        }

        for (position, option_id) in choices.iter().enumerate() {
            sqlx::query("INSERT INTO poll_choices (poll_id, position, option_id) VALUES (?, ?, ?)")
                .bind(poll_id)
                .bind(position as i64)
                .bind(option_id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(true)
    }

    pub async fn is_member(pool: &SqlitePool, poll_id: &str) -> Result<bool, BotError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM daily_polls WHERE poll_id = ?")
            .bind(poll_id)
            .fetch_optional(pool)
            .await?;
        Ok(found.is_some())
    }

    pub async fn lookup_channel(pool: &SqlitePool, poll_id: &str) -> Result<Option<ChannelIdentity>, BotError> {
        let row = sqlx::query_as::<_, (String, String)>(
            "SELECT channel_id, channel_name FROM daily_polls WHERE poll_id = ?"
        )
        .bind(poll_id)
        .fetch_optional(pool)
        .await?;

        Ok(row.map(|(id, name)| ChannelIdentity { id, name }))
    }

    pub async fn get(pool: &SqlitePool, poll_id: &str) -> Result<Option<PollRecord>, BotError> {
        let row = sqlx::query_as::<_, (String, String, String, i64)>(
            "SELECT poll_id, channel_id, channel_name, created_at FROM daily_polls WHERE poll_id = ?"
        )
        .bind(poll_id)
        .fetch_optional(pool)
        .await?;

        let Some((poll_id, channel_id, channel_name, created_at)) = row else { return Ok(None) };
        Ok(Some(PollRecord {
            poll_id,
            channel_id,
            channel_name,
            created_at: from_unix(created_at)?,
        }))
    }

    /// Options as they were ordered when the poll was sent. Empty for polls
    /// recorded without a snapshot.
    pub async fn choices(pool: &SqlitePool, poll_id: &str) -> Result<Vec<PollOption>, BotError> {
        let options = sqlx::query_as::<_, PollOption>(
            "SELECT po.id, po.option_text AS text, po.sort_order
             FROM poll_choices pc
             JOIN poll_options po ON pc.option_id = po.id
             WHERE pc.poll_id = ?
             ORDER BY pc.position"
        )
        .bind(poll_id)
        .fetch_all(pool)
        .await?;
        Ok(options)
    }
}
