use std::sync::Arc;

use pollbot::{
    config::Config,
    db,
    error::BotError,
    registry::OptionRegistry,
    routes::{self, AppState},
    scheduler::Scheduler,
    telegram::TelegramClient,
    transport::Transport,
    updates::{self, UpdatePoller},
};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[rocket::main]
async fn main() -> Result<(), BotError> {
    let config = Config::load()?;
    init_tracing(config.bot.debug);
    config.validate()?;

    info!("🚀 Starting poll bot");

    let pool = db::connect(&config.database).await?;
    OptionRegistry::initialize(&pool, &config.poll.options).await?;

    let transport: Arc<dyn Transport> = Arc::new(TelegramClient::new(&config.bot)?);
    let config = Arc::new(config);
    let scheduler = Arc::new(Scheduler::new(pool.clone(), Arc::clone(&transport), Arc::clone(&config))?);

    tokio::spawn(Arc::clone(&scheduler).run());

    let secret = config.server.secret()?.to_string();
    let state = AppState::new(
        pool,
        Arc::clone(&transport),
        scheduler,
        config.poll.points.clone(),
        secret.clone(),
    );

    match &config.server.webhook_url {
        Some(url) => updates::register_webhook(transport.as_ref(), url, &secret).await?,
        None => {
            transport.delete_webhook().await?;
            tokio::spawn(UpdatePoller::new(state.clone(), config.bot.poll_timeout_secs).run());
        }
    }

    let figment = rocket::Config::figment()
        .merge(("address", config.server.address.clone()))
        .merge(("port", config.server.port));

    routes::mount(rocket::custom(figment), state)
        .launch()
        .await
        .map_err(|e| BotError::Server(e.to_string()))?;

    info!("👋 Poll bot stopped");
    Ok(())
}
