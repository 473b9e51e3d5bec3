use sqlx::SqlitePool;
use shared::models::{OptionTally, VoteRecord, WeeklyVote};
use time::OffsetDateTime;
use crate::{error::BotError, utils::{from_unix, to_unix}};

/// Current vote per `(poll_id, user_id)`. A vote change overwrites the row;
/// no history is kept.
pub struct VoteStore;

impl VoteStore {
    /// Inserts or replaces in a single statement, so concurrent answers for the
    /// same user and poll cannot lose an update.
    pub async fn upsert(pool: &SqlitePool, vote: &VoteRecord) -> Result<(), BotError> {
        sqlx::query(
            "INSERT INTO poll_results
             (poll_id, user_id, username, option_id, channel_id, channel_name, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT (poll_id, user_id) DO UPDATE SET
                username = excluded.username,
                option_id = excluded.option_id,
                channel_id = excluded.channel_id,
                channel_name = excluded.channel_name,
                updated_at = excluded.updated_at"
        )
        .bind(&vote.poll_id)
        .bind(vote.user_id)
        .bind(&vote.username)
        .bind(vote.option_id)
        .bind(&vote.channel_id)
        .bind(&vote.channel_name)
        .bind(to_unix(vote.updated_at))
        .execute(pool)
        .await?;
        Ok(())
    }

    /// Returns whether a vote existed. A missing vote is not an error.
    pub async fn remove(pool: &SqlitePool, poll_id: &str, user_id: i64) -> Result<bool, BotError> {
        let result = sqlx::query("DELETE FROM poll_results WHERE poll_id = ? AND user_id = ?")
            .bind(poll_id)
            .bind(user_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn get(pool: &SqlitePool, poll_id: &str, user_id: i64) -> Result<Option<VoteRecord>, BotError> {
        let row = sqlx::query_as::<_, (String, i64, String, i64, String, String, i64)>(
            "SELECT poll_id, user_id, username, option_id, channel_id, channel_name, updated_at
             FROM poll_results WHERE poll_id = ? AND user_id = ?"
        )
        .bind(poll_id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        let Some((poll_id, user_id, username, option_id, channel_id, channel_name, updated_at)) = row else {
            return Ok(None);
        };
        Ok(Some(VoteRecord {
            poll_id,
            user_id,
            username,
            option_id,
            channel_id,
            channel_name,
            updated_at: from_unix(updated_at)?,
        }))
    }

    pub async fn count(pool: &SqlitePool, poll_id: &str) -> Result<i64, BotError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM poll_results WHERE poll_id = ?")
            .bind(poll_id)
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    pub async fn votes_since(
        pool: &SqlitePool,
        channel_id: &str,
        since: OffsetDateTime,
    ) -> Result<Vec<WeeklyVote>, BotError> {
        let votes = sqlx::query_as::<_, WeeklyVote>(
            "SELECT pr.username, po.sort_order
             FROM poll_results pr
             JOIN poll_options po ON pr.option_id = po.id
             WHERE pr.updated_at >= ? AND pr.channel_id = ?"
        )
        .bind(to_unix(since))
        .bind(channel_id)
        .fetch_all(pool)
        .await?;
        Ok(votes)
    }

    pub async fn votes_since_grouped_by_option(
        pool: &SqlitePool,
        channel_id: &str,
        since: OffsetDateTime,
    ) -> Result<Vec<OptionTally>, BotError> {
        let tallies = sqlx::query_as::<_, OptionTally>(
            "SELECT po.option_text AS text, COUNT(pr.id) AS votes
             FROM poll_results pr
             JOIN poll_options po ON pr.option_id = po.id
             WHERE pr.updated_at >= ? AND pr.channel_id = ?
             GROUP BY po.id, po.option_text, po.sort_order
             ORDER BY po.sort_order, po.id"
        )
        .bind(to_unix(since))
        .bind(channel_id)
        .fetch_all(pool)
        .await?;
        Ok(tallies)
    }
}
