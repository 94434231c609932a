use sqlx::SqlitePool;

use crate::error::AppError;

/// Returns the configured log channel, or None when monitoring is disabled
/// for the guild. Every event handler keys off this.
pub async fn log_channel(pool: &SqlitePool, guild_id: &str) -> Result<Option<String>, AppError> {
    let row: Option<(String,)> =
        sqlx::query_as("SELECT log_channel_id FROM guild_settings WHERE guild_id = ?")
            .bind(guild_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.map(|(id,)| id))
}

pub async fn is_enabled(pool: &SqlitePool, guild_id: &str) -> Result<bool, AppError> {
    Ok(log_channel(pool, guild_id).await?.is_some())
}

pub async fn enable(pool: &SqlitePool, guild_id: &str, channel_id: &str) -> Result<(), AppError> {
    sqlx::query(
        "INSERT INTO guild_settings (guild_id, log_channel_id) VALUES (?, ?) \
         ON CONFLICT (guild_id) DO UPDATE SET log_channel_id = excluded.log_channel_id",
    )
    .bind(guild_id)
    .bind(channel_id)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn disable(pool: &SqlitePool, guild_id: &str) -> Result<(), AppError> {
    sqlx::query("DELETE FROM guild_settings WHERE guild_id = ?")
        .bind(guild_id)
        .execute(pool)
        .await?;
    Ok(())
}
