use shared::{Leaderboard, MonthlyReport, PointTable};
use sqlx::SqlitePool;
use time::{Duration, OffsetDateTime};
use crate::{error::BotError, store::VoteStore, utils::window_start};

pub const MONTHLY_WINDOW: Duration = Duration::days(30);
pub const WEEKLY_WINDOW: Duration = Duration::days(7);

pub struct StatsEngine;

impl StatsEngine {
    pub async fn monthly_report(
        pool: &SqlitePool,
        channel_id: &str,
        now: OffsetDateTime,
    ) -> Result<MonthlyReport, BotError> {
        let since = window_start(now, MONTHLY_WINDOW);
        let tallies = VoteStore::votes_since_grouped_by_option(pool, channel_id, since).await?;
        Ok(MonthlyReport::new(tallies))
    }

    pub async fn weekly_leaderboard(
        pool: &SqlitePool,
        channel_id: &str,
        points: &PointTable,
        now: OffsetDateTime,
    ) -> Result<Leaderboard, BotError> {
        let since = window_start(now, WEEKLY_WINDOW);
        let votes = VoteStore::votes_since(pool, channel_id, since).await?;
        Ok(Leaderboard::from_votes(&votes, points))
    }
}
