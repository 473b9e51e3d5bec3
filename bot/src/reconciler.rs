use serde::Serialize;
use shared::models::{PollAnswer, PollOption, VoteRecord};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::{debug, info, instrument, warn};

use crate::{error::BotError, ledger::PollLedger, registry::OptionRegistry, store::VoteStore};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AnswerOutcome {
    Recorded,
    Retracted { existed: bool },
    /// The poll was not created by this bot.
    Foreign,
    UnresolvableOption,
    /// Several options reported for a single-answer poll.
    MultipleSelections,
}

pub struct VoteReconciler;

impl VoteReconciler {
    #[instrument(skip(pool, answer), fields(poll_id = %answer.poll_id, user_id = answer.user_id))]
    pub async fn on_poll_answer(pool: &SqlitePool, answer: &PollAnswer) -> Result<AnswerOutcome, BotError> {
        Self::apply(pool, answer, OffsetDateTime::now_utc()).await
    }

    pub async fn apply(
        pool: &SqlitePool,
        answer: &PollAnswer,
        at: OffsetDateTime,
    ) -> Result<AnswerOutcome, BotError> {
        if answer.is_retraction() {
            let existed = VoteStore::remove(pool, &answer.poll_id, answer.user_id).await?;
            if existed {
                info!("❌ User {} retracted their vote from poll {}", answer.user_id, answer.poll_id);
            } else {
                debug!("No vote to retract for user {} in poll {}", answer.user_id, answer.poll_id);
            }
            return Ok(AnswerOutcome::Retracted { existed });
        }

        if !PollLedger::is_member(pool, &answer.poll_id).await? {
            info!("🚫 Ignoring poll response from {} (not a daily poll)", answer.username);
            return Ok(AnswerOutcome::Foreign);
        }

        let position = match answer.option_ids.as_slice() {
            [position] => *position,
            selected => {
                warn!(
                    "⚠️ Poll {} is single-answer but {} reported {} selections; dropping",
                    answer.poll_id, answer.username, selected.len()
                );
                return Ok(AnswerOutcome::MultipleSelections);
            }
        };

        let Some(option) = Self::resolve_choice(pool, &answer.poll_id, position).await? else {
            warn!("⚠️ Option index {} not found for poll {}", position, answer.poll_id);
            return Ok(AnswerOutcome::UnresolvableOption);
        };

        let Some(channel) = PollLedger::lookup_channel(pool, &answer.poll_id).await? else {
            warn!("❌ Could not find channel info for poll {}", answer.poll_id);
            return Ok(AnswerOutcome::Foreign);
        };

        VoteStore::upsert(pool, &VoteRecord {
            poll_id: answer.poll_id.clone(),
            user_id: answer.user_id,
            username: answer.username.clone(),
            option_id: option.id,
            channel_id: channel.id.clone(),
            channel_name: channel.name.clone(),
            updated_at: at,
        })
        .await?;

        info!("📝 {} voted in {} ({}): {}", answer.username, channel.name, channel.id, option.text);
        Ok(AnswerOutcome::Recorded)
    }

    /// Maps a 0-based answer index to an option using the order the poll was
    /// sent with, or the registry order for polls recorded without one.
    async fn resolve_choice(
        pool: &SqlitePool,
        poll_id: &str,
        position: u32,
    ) -> Result<Option<PollOption>, BotError> {
        let mut choices = PollLedger::choices(pool, poll_id).await?;
        if choices.is_empty() {
            choices = OptionRegistry::list(pool).await?;
        }
        Ok(choices.into_iter().nth(position as usize))
    }
}
