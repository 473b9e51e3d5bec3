use sqlx::SqlitePool;
use shared::models::PollOption;
use tracing::info;
use crate::error::BotError;

/// Canonical answer choices. Rows are insert-only: renaming an option in
/// configuration registers a new row and old votes keep the old one.
pub struct OptionRegistry;

impl OptionRegistry {
    pub async fn initialize(pool: &SqlitePool, options: &[String]) -> Result<(), BotError> {
        let mut tx = pool.begin().await?;

        for (sort_order, text) in options.iter().enumerate() {
            let result = sqlx::query(
                "INSERT OR IGNORE INTO poll_options (option_text, sort_order) VALUES (?, ?)"
            )
            .bind(text)
            .bind(sort_order as i64)
            .execute(&mut *tx)
            .await?;

            if result.rows_affected() > 0 {
                info!(option = %text, sort_order, "➕ Registered poll option");
            }
        }

        tx.commit().await?;
        Ok(())
    }

    pub async fn resolve(pool: &SqlitePool, text: &str) -> Result<Option<i64>, BotError> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM poll_options WHERE option_text = ?")
            .bind(text)
            .fetch_optional(pool)
            .await?;
        Ok(id)
    }

    pub async fn list(pool: &SqlitePool) -> Result<Vec<PollOption>, BotError> {
        let options = sqlx::query_as::<_, PollOption>(
            "SELECT id, option_text AS text, sort_order FROM poll_options ORDER BY sort_order, id"
        )
        .fetch_all(pool)
        .await?;
        Ok(options)
    }

    /// Registered options for `texts`, in the given order.
    pub async fn resolve_all(pool: &SqlitePool, texts: &[String]) -> Result<Vec<PollOption>, BotError> {
        let registered = Self::list(pool).await?;
        texts.iter()
            .map(|text| {
                registered.iter()
                    .find(|option| &option.text == text)
                    .cloned()
                    .ok_or_else(|| BotError::UnknownOption(text.clone()))
            })
            .collect()
    }
}
