use std::convert::Infallible;
use std::sync::Arc;

use rocket::request::{FromRequest, Outcome};
use rocket::{catchers, get, post, routes, http::Status, serde::json::Json, Build, Request, Rocket, State};
use shared::models::LeaderboardEntry;
use shared::PointTable;
use sqlx::SqlitePool;
use time::OffsetDateTime;
use tracing::{debug, error, instrument, warn};

use crate::{
    catchers::{bad_request, internal_error, not_found, unauthorized, unprocessable},
    error::BotError,
    reconciler::VoteReconciler,
    scheduler::{ChannelOutcome, Job, Scheduler},
    stats::StatsEngine,
    telegram::{Command, Message, Update},
    transport::Transport,
};

pub const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

pub struct SecretToken(Option<String>);

#[rocket::async_trait]
impl<'r> FromRequest<'r> for SecretToken {
    type Error = Infallible;

    async fn from_request(req: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        Outcome::Success(SecretToken(req.headers().get_one(SECRET_HEADER).map(str::to_owned)))
    }
}

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub transport: Arc<dyn Transport>,
    pub scheduler: Arc<Scheduler>,
    pub points: PointTable,
    pub webhook_secret: String,
}

impl AppState {
    pub fn new(
        db: SqlitePool,
        transport: Arc<dyn Transport>,
        scheduler: Arc<Scheduler>,
        points: PointTable,
        webhook_secret: String,
    ) -> Self {
        Self { db, transport, scheduler, points, webhook_secret }
    }

    fn authorize(&self, token: &SecretToken) -> Result<(), BotError> {
        match token.0.as_deref() {
            Some(token) if token == self.webhook_secret => Ok(()),
            _ => Err(BotError::Unauthorized),
        }
    }

    /// Applies one inbound update. Store failures propagate so the transport
    /// redelivers; reply delivery failures are only logged.
    pub async fn handle_update(&self, update: Update) -> Result<(), BotError> {
        if let Some(answer) = update.poll_answer {
            let poll_id = answer.poll_id.clone();
            match answer.into_answer() {
                Some(answer) => {
                    let outcome = VoteReconciler::on_poll_answer(&self.db, &answer).await?;
                    debug!(?outcome, "Poll answer reconciled");
                }
                None => debug!(poll_id = %poll_id, "Skipping poll answer without a user"),
            }
        }

        if let Some(message) = update.message.or(update.channel_post) {
            self.handle_command(&message).await?;
        }
        Ok(())
    }

    async fn handle_command(&self, message: &Message) -> Result<(), BotError> {
        let Some(command) = message.text.as_deref().and_then(Command::parse) else {
            return Ok(());
        };

        let chat_id = message.chat.id.to_string();
        let now = OffsetDateTime::now_utc();
        let reply = match command {
            Command::Stats => StatsEngine::monthly_report(&self.db, &chat_id, now).await?.to_string(),
            Command::Leaderboard => {
                StatsEngine::weekly_leaderboard(&self.db, &chat_id, &self.points, now).await?.to_string()
            }
        };

        if let Err(e) = self.transport.send_message(&chat_id, &reply).await {
            error!("❌ Failed to reply to {:?} in {}: {}", command, chat_id, e);
        }
        Ok(())
    }
}

#[instrument(skip(state, token, update), fields(update_id = update.update_id))]
#[post("/telegram/webhook", format = "json", data = "<update>")]
pub async fn telegram_webhook(
    state: &State<AppState>,
    token: SecretToken,
    update: Json<Update>,
) -> Result<Status, BotError> {
    if let Err(e) = state.authorize(&token) {
        warn!("Rejected webhook call with a missing or wrong secret");
        return Err(e);
    }
    state.handle_update(update.into_inner()).await?;
    Ok(Status::Ok)
}

#[get("/channels/<channel_id>/stats")]
pub async fn channel_stats(state: &State<AppState>, channel_id: &str) -> Result<String, BotError> {
    let report = StatsEngine::monthly_report(&state.db, channel_id, OffsetDateTime::now_utc()).await?;
    Ok(report.to_string())
}

#[get("/channels/<channel_id>/leaderboard")]
pub async fn channel_leaderboard(
    state: &State<AppState>,
    channel_id: &str,
) -> Result<Json<Vec<LeaderboardEntry>>, BotError> {
    let board = StatsEngine::weekly_leaderboard(&state.db, channel_id, &state.points, OffsetDateTime::now_utc()).await?;
    Ok(Json(board.into_entries()))
}

#[instrument(skip(state, token))]
#[post("/jobs/<job>")]
pub async fn trigger_job(
    state: &State<AppState>,
    token: SecretToken,
    job: &str,
) -> Result<Json<Vec<ChannelOutcome>>, BotError> {
    state.authorize(&token)?;
    let job = match job {
        "daily" => Job::Daily,
        "weekly" => Job::Weekly,
        _ => return Err(BotError::NotFound),
    };
    Ok(Json(state.scheduler.run_job(job).await))
}

pub fn mount(rocket: Rocket<Build>, state: AppState) -> Rocket<Build> {
    rocket
        .manage(state)
        .mount("/", routes![telegram_webhook])
        .mount("/api", routes![channel_stats, channel_leaderboard, trigger_job])
        .register(
            "/",
            catchers![bad_request, unauthorized, not_found, unprocessable, internal_error],
        )
}
