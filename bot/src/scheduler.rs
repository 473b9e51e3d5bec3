use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use shared::models::PollOption;
use sqlx::SqlitePool;
use time::{Duration, OffsetDateTime, Time, UtcOffset, Weekday};
use tracing::{error, info};

use crate::{
    config::{ChannelConfig, Config},
    error::BotError,
    ledger::PollLedger,
    registry::OptionRegistry,
    stats::StatsEngine,
    transport::Transport,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Job {
    Daily,
    Weekly,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelOutcome {
    pub channel: String,
    pub delivered: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub poll_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChannelOutcome {
    fn success(channel: &ChannelConfig, poll_id: Option<String>) -> Self {
        Self { channel: channel.id.clone(), delivered: true, poll_id, error: None }
    }

    fn failure(channel: &ChannelConfig, error: &BotError) -> Self {
        Self { channel: channel.id.clone(), delivered: false, poll_id: None, error: Some(error.to_string()) }
    }
}

pub fn next_daily(now: OffsetDateTime, at: Time) -> OffsetDateTime {
    let candidate = now.replace_time(at);
    if candidate > now { candidate } else { candidate + Duration::days(1) }
}

pub fn next_weekly(now: OffsetDateTime, weekday: Weekday, at: Time) -> OffsetDateTime {
    let days_ahead = (7 + weekday.number_days_from_monday() - now.weekday().number_days_from_monday()) % 7;
    let candidate = now.replace_time(at) + Duration::days(i64::from(days_ahead));
    if candidate > now { candidate } else { candidate + Duration::weeks(1) }
}

/// Runs the daily poll job and the weekly leaderboard job. One instance is
/// built by the entry point; there is no process-wide job registry.
pub struct Scheduler {
    pool: SqlitePool,
    transport: Arc<dyn Transport>,
    config: Arc<Config>,
    daily_at: Time,
    weekly_on: Weekday,
    weekly_at: Time,
    offset: UtcOffset,
}

impl Scheduler {
    pub fn new(pool: SqlitePool, transport: Arc<dyn Transport>, config: Arc<Config>) -> Result<Self, BotError> {
        let schedule = &config.schedule;
        Ok(Self {
            daily_at: schedule.daily_time()?,
            weekly_on: schedule.weekday()?,
            weekly_at: schedule.weekly_time()?,
            offset: schedule.offset()?,
            pool,
            transport,
            config,
        })
    }

    pub fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc().to_offset(self.offset)
    }

    /// Next job due after `now`. Both are due when the times coincide.
    pub fn next_due(&self, now: OffsetDateTime) -> (OffsetDateTime, Vec<Job>) {
        let daily = next_daily(now, self.daily_at);
        let weekly = next_weekly(now, self.weekly_on, self.weekly_at);
        match daily.cmp(&weekly) {
            std::cmp::Ordering::Less => (daily, vec![Job::Daily]),
            std::cmp::Ordering::Greater => (weekly, vec![Job::Weekly]),
            std::cmp::Ordering::Equal => (daily, vec![Job::Daily, Job::Weekly]),
        }
    }

    /// Like `next_due`, but never earlier than the last fired instant, so a
    /// wall clock stepping backwards cannot fire the same trigger twice.
    pub fn next_after(&self, now: OffsetDateTime, last_due: Option<OffsetDateTime>) -> (OffsetDateTime, Vec<Job>) {
        let from = last_due.map_or(now, |last| now.max(last));
        self.next_due(from)
    }

    pub async fn run(self: Arc<Self>) {
        info!(
            "⏰ Scheduler started: daily at {}, weekly on {} at {} (UTC{:+})",
            self.daily_at, self.weekly_on, self.weekly_at, self.offset.whole_hours()
        );

        let mut last_due = None;
        loop {
            let now = self.now();
            let (due, jobs) = self.next_after(now, last_due);
            let wait = std::time::Duration::try_from(due - now).unwrap_or_default();
            tokio::time::sleep(wait).await;
            last_due = Some(due);

            for job in jobs {
                let scheduler = Arc::clone(&self);
                tokio::spawn(async move {
                    scheduler.run_job(job).await;
                });
            }
        }
    }

    pub async fn run_job(&self, job: Job) -> Vec<ChannelOutcome> {
        let outcomes = match job {
            Job::Daily => self.run_daily_job().await,
            Job::Weekly => self.run_weekly_job().await,
        };
        let delivered = outcomes.iter().filter(|o| o.delivered).count();
        info!("🏁 {:?} job finished: {}/{} channels delivered", job, delivered, outcomes.len());
        outcomes
    }

    pub async fn run_daily_job(&self) -> Vec<ChannelOutcome> {
        join_all(self.config.channels.values().map(|channel| async move {
            match self.daily_for_channel(channel).await {
                Ok(poll_id) => ChannelOutcome::success(channel, poll_id),
                Err(e) => {
                    error!("❌ Error sending message/poll to {}: {}", channel.id, e);
                    ChannelOutcome::failure(channel, &e)
                }
            }
        }))
        .await
    }

    pub async fn run_weekly_job(&self) -> Vec<ChannelOutcome> {
        join_all(self.config.channels.values().map(|channel| async move {
            match self.weekly_for_channel(channel).await {
                Ok(()) => ChannelOutcome::success(channel, None),
                Err(e) => {
                    error!("❌ Error sending leaderboard to {}: {}", channel.id, e);
                    ChannelOutcome::failure(channel, &e)
                }
            }
        }))
        .await
    }

    async fn daily_for_channel(&self, channel: &ChannelConfig) -> Result<Option<String>, BotError> {
        let identity = self.transport.get_channel_identity(&channel.id).await?;

        self.transport.send_message(&channel.id, &self.config.message.text).await?;
        info!("✅ Message sent to {} ({})", identity.name, identity.id);

        if !channel.include_poll {
            return Ok(None);
        }

        let choices = self.poll_choices().await?;
        let texts: Vec<String> = choices.iter().map(|option| option.text.clone()).collect();
        let sent = self.transport.send_poll(&channel.id, &self.config.poll.question, &texts).await?;

        let option_ids: Vec<i64> = choices.iter().map(|option| option.id).collect();
        PollLedger::record_poll(&self.pool, &sent.poll_id, &identity, &option_ids, OffsetDateTime::now_utc()).await?;
        info!("📊 Poll {} sent to {}", sent.poll_id, identity.name);

        Ok(Some(sent.poll_id))
    }

    async fn weekly_for_channel(&self, channel: &ChannelConfig) -> Result<(), BotError> {
        let identity = self.transport.get_channel_identity(&channel.id).await?;
        let board = StatsEngine::weekly_leaderboard(
            &self.pool,
            &identity.id,
            &self.config.poll.points,
            OffsetDateTime::now_utc(),
        )
        .await?;

        self.transport.send_message(&channel.id, &board.to_string()).await?;
        info!("🏆 Leaderboard sent to {} ({} players)", identity.name, board.entries().len());
        Ok(())
    }

    /// Configured options resolved to registry rows, in configured order.
    async fn poll_choices(&self) -> Result<Vec<PollOption>, BotError> {
        OptionRegistry::resolve_all(&self.pool, &self.config.poll.options).await
    }
}
