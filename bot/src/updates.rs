//! Update intake: a registered webhook, or long polling when the bot has no
//! public URL.

use std::time::Duration;

use tracing::{error, info};

use crate::{error::BotError, routes::AppState, transport::Transport};

pub const ALLOWED_UPDATES: [&str; 3] = ["message", "channel_post", "poll_answer"];
const RETRY_DELAY: Duration = Duration::from_secs(5);

pub async fn register_webhook(transport: &dyn Transport, url: &str, secret: &str) -> Result<(), BotError> {
    transport.set_webhook(url, secret, &ALLOWED_UPDATES).await?;
    info!("🔗 Webhook registered at {}", url);
    Ok(())
}

pub struct UpdatePoller {
    state: AppState,
    timeout_secs: u64,
    offset: i64,
}

impl UpdatePoller {
    pub fn new(state: AppState, timeout_secs: u64) -> Self {
        Self { state, timeout_secs, offset: 0 }
    }

    /// First update id not yet acknowledged.
    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Fetches one batch and applies it in order. An update that fails to
    /// apply stays unacknowledged and is fetched again by the next call.
    pub async fn poll_once(&mut self) -> Result<usize, BotError> {
        let updates = self.state.transport
            .get_updates(self.offset, self.timeout_secs, &ALLOWED_UPDATES)
            .await?;

        let mut applied = 0;
        for update in updates {
            let next = update.update_id + 1;
            self.state.handle_update(update).await?;
            self.offset = next;
            applied += 1;
        }
        Ok(applied)
    }

    pub async fn run(mut self) {
        info!("📥 Polling for updates");
        loop {
            if let Err(e) = self.poll_once().await {
                error!("❌ Failed to fetch or apply updates: {}", e);
                tokio::time::sleep(RETRY_DELAY).await;
            }
        }
    }
}
