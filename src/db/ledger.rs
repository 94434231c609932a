use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::attribution::Attribution;

/// Records who invited a member. A returning member keeps their original
/// attribution: the insert is a no-op when a row for `invited_id` already
/// exists. Callers must not record failed attributions.
pub async fn record(
    pool: &SqlitePool,
    guild_id: &str,
    invited_id: &str,
    attribution: &Attribution,
) -> Result<(), AppError> {
    sqlx::query(
        "INSERT OR IGNORE INTO invite_relations (guild_id, invited_id, inviter_id, code) \
         VALUES (?, ?, ?, ?)",
    )
    .bind(guild_id)
    .bind(invited_id)
    .bind(attribution.inviter_id.as_deref())
    .bind(attribution.code.as_deref())
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn lookup_inviter(
    pool: &SqlitePool,
    guild_id: &str,
    invited_id: &str,
) -> Result<Option<String>, AppError> {
    let row: Option<(Option<String>,)> = sqlx::query_as(
        "SELECT inviter_id FROM invite_relations WHERE guild_id = ? AND invited_id = ?",
    )
    .bind(guild_id)
    .bind(invited_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.and_then(|(id,)| id))
}

pub async fn lookup_code(
    pool: &SqlitePool,
    guild_id: &str,
    invited_id: &str,
) -> Result<Option<String>, AppError> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT code FROM invite_relations WHERE guild_id = ? AND invited_id = ?")
            .bind(guild_id)
            .bind(invited_id)
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(code,)| code))
}

/// How many members this inviter has brought in. Derived from the relation
/// rows, so it stays consistent with them by construction.
pub async fn count_for_inviter(
    pool: &SqlitePool,
    guild_id: &str,
    inviter_id: &str,
) -> Result<i64, AppError> {
    let (n,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM invite_relations WHERE guild_id = ? AND inviter_id = ?",
    )
    .bind(guild_id)
    .bind(inviter_id)
    .fetch_one(pool)
    .await?;
    Ok(n)
}

/// Members with a recorded relation in this guild.
pub async fn known_member_count(pool: &SqlitePool, guild_id: &str) -> Result<i64, AppError> {
    let (n,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM invite_relations WHERE guild_id = ?")
            .bind(guild_id)
            .fetch_one(pool)
            .await?;
    Ok(n)
}

pub async fn is_known(
    pool: &SqlitePool,
    guild_id: &str,
    invited_id: &str,
) -> Result<bool, AppError> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT 1 FROM invite_relations WHERE guild_id = ? AND invited_id = ?",
    )
    .bind(guild_id)
    .bind(invited_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.is_some())
}
