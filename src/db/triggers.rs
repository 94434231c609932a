use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::trigger::{Trigger, TriggerKind, ROLE_LIMIT, TRIGGER_LIMIT};

fn decode_roles(raw: &str) -> Result<Vec<String>, AppError> {
    serde_json::from_str(raw)
        .map_err(|e| AppError::Internal(format!("corrupt role_ids column: {e}")))
}

pub async fn count(pool: &SqlitePool, guild_id: &str, kind: TriggerKind) -> Result<i64, AppError> {
    let (n,): (i64,) =
        sqlx::query_as("SELECT COUNT(*) FROM triggers WHERE guild_id = ? AND kind = ?")
            .bind(guild_id)
            .bind(kind.as_str())
            .fetch_one(pool)
            .await?;
    Ok(n)
}

/// Triggers of one kind in creation order. Listing and 1-based index
/// removal both use this ordering.
pub async fn list(
    pool: &SqlitePool,
    guild_id: &str,
    kind: TriggerKind,
) -> Result<Vec<Trigger>, AppError> {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT key, role_ids FROM triggers WHERE guild_id = ? AND kind = ? ORDER BY rowid",
    )
    .bind(guild_id)
    .bind(kind.as_str())
    .fetch_all(pool)
    .await?;

    let mut triggers = Vec::with_capacity(rows.len());
    for (key, raw) in rows {
        triggers.push(Trigger {
            guild_id: guild_id.to_string(),
            kind,
            key,
            role_ids: decode_roles(&raw)?,
        });
    }
    Ok(triggers)
}

pub async fn roles_for(
    pool: &SqlitePool,
    guild_id: &str,
    kind: TriggerKind,
    key: &str,
) -> Result<Option<Vec<String>>, AppError> {
    let row: Option<(String,)> = sqlx::query_as(
        "SELECT role_ids FROM triggers WHERE guild_id = ? AND kind = ? AND key = ?",
    )
    .bind(guild_id)
    .bind(kind.as_str())
    .bind(key)
    .fetch_optional(pool)
    .await?;

    match row {
        Some((raw,)) => Ok(Some(decode_roles(&raw)?)),
        None => Ok(None),
    }
}

pub async fn exists(
    pool: &SqlitePool,
    guild_id: &str,
    kind: TriggerKind,
    key: &str,
) -> Result<bool, AppError> {
    Ok(roles_for(pool, guild_id, kind, key).await?.is_some())
}

/// Inserts or overwrites a trigger, enforcing the per-guild trigger bound
/// and the per-trigger role bound. Overwriting an existing key does not
/// count against the trigger bound.
pub async fn add(
    pool: &SqlitePool,
    guild_id: &str,
    kind: TriggerKind,
    key: &str,
    role_ids: &[String],
) -> Result<(), AppError> {
    if role_ids.is_empty() {
        return Err(AppError::NotFound("no roles given for trigger".to_string()));
    }
    if role_ids.len() > ROLE_LIMIT {
        return Err(AppError::LimitExceeded(format!(
            "too many roles: a trigger can grant up to {ROLE_LIMIT}"
        )));
    }
    let existing = exists(pool, guild_id, kind, key).await?;
    if !existing && count(pool, guild_id, kind).await? >= TRIGGER_LIMIT as i64 {
        return Err(AppError::LimitExceeded(format!(
            "you already have {TRIGGER_LIMIT} {} triggers; delete one before adding another",
            kind.as_str()
        )));
    }

    let raw = serde_json::to_string(role_ids)
        .map_err(|e| AppError::Internal(format!("encode role_ids: {e}")))?;
    sqlx::query(
        "INSERT INTO triggers (guild_id, kind, key, role_ids) VALUES (?, ?, ?, ?) \
         ON CONFLICT (guild_id, kind, key) DO UPDATE SET role_ids = excluded.role_ids",
    )
    .bind(guild_id)
    .bind(kind.as_str())
    .bind(key)
    .bind(&raw)
    .execute(pool)
    .await?;
    Ok(())
}

pub async fn remove(
    pool: &SqlitePool,
    guild_id: &str,
    kind: TriggerKind,
    key: &str,
) -> Result<(), AppError> {
    sqlx::query("DELETE FROM triggers WHERE guild_id = ? AND kind = ? AND key = ?")
        .bind(guild_id)
        .bind(kind.as_str())
        .bind(key)
        .execute(pool)
        .await?;
    Ok(())
}

/// Removes the trigger at a 1-based index over the listing order and
/// returns its key. Out-of-range indexes are NotFound.
pub async fn remove_by_index(
    pool: &SqlitePool,
    guild_id: &str,
    kind: TriggerKind,
    index: usize,
) -> Result<String, AppError> {
    let triggers = list(pool, guild_id, kind).await?;
    if triggers.is_empty() {
        return Err(AppError::NotFound(format!(
            "no {} triggers configured",
            kind.as_str()
        )));
    }
    if index == 0 || index > triggers.len() {
        return Err(AppError::NotFound(format!(
            "invalid index: specify an integer between 1 and {}",
            triggers.len()
        )));
    }
    let key = triggers[index - 1].key.clone();
    remove(pool, guild_id, kind, &key).await?;
    Ok(key)
}
