use sqlx::SqlitePool;

use crate::db::triggers;
use crate::error::AppError;
use crate::models::attribution::{Attribution, GrantOutcome};
use crate::models::trigger::TriggerKind;
use crate::platform::PlatformGateway;

/// The trigger chosen for one join, evaluated exactly once per event.
/// By-inviter beats by-code; a by-code trigger is consulted only when no
/// by-inviter trigger matched.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Selection {
    ByInviter(String),
    ByCode(String),
    None,
}

async fn select_trigger(
    pool: &SqlitePool,
    guild_id: &str,
    attribution: &Attribution,
) -> Result<Selection, AppError> {
    if let Some(inviter_id) = attribution.inviter_id.as_deref() {
        if triggers::exists(pool, guild_id, TriggerKind::Inviter, inviter_id).await? {
            return Ok(Selection::ByInviter(inviter_id.to_string()));
        }
    }
    if let Some(code) = attribution.code.as_deref() {
        if triggers::exists(pool, guild_id, TriggerKind::Code, code).await? {
            return Ok(Selection::ByCode(code.to_string()));
        }
    }
    Ok(Selection::None)
}

/// Resolves the applicable trigger for an attribution and grants its roles
/// to the member. Every outcome comes back as a GrantOutcome value: a
/// refused grant is `Failed`, a trigger whose roles all vanished is removed
/// and reported as `SelfHealed`. Only store and transport failures
/// propagate as errors, and those leave no partial trigger state behind.
pub async fn resolve_and_grant<G: PlatformGateway + ?Sized>(
    pool: &SqlitePool,
    gateway: &G,
    guild_id: &str,
    member_id: &str,
    attribution: &Attribution,
) -> Result<GrantOutcome, AppError> {
    let (kind, key) = match select_trigger(pool, guild_id, attribution).await? {
        Selection::ByInviter(key) => (TriggerKind::Inviter, key),
        Selection::ByCode(key) => (TriggerKind::Code, key),
        Selection::None => return Ok(GrantOutcome::NotApplicable),
    };

    let configured = triggers::roles_for(pool, guild_id, kind, &key)
        .await?
        .unwrap_or_default();

    // Drop role ids that no longer resolve to a live role. A transport
    // failure is not "role gone": it aborts the event instead of healing
    // away a trigger that may still be valid.
    let mut live = Vec::with_capacity(configured.len());
    for role_id in &configured {
        if gateway.get_role(guild_id, role_id).await?.is_some() {
            live.push(role_id.clone());
        }
    }

    if live.is_empty() {
        triggers::remove(pool, guild_id, kind, &key).await?;
        return Ok(GrantOutcome::SelfHealed { kind, key });
    }

    match gateway.grant_roles(guild_id, member_id, &live).await {
        Ok(()) => Ok(GrantOutcome::Applied {
            kind,
            key,
            role_ids: live,
        }),
        Err(e) => Ok(GrantOutcome::Failed {
            kind,
            key,
            reason: e.message(),
        }),
    }
}
