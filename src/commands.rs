//! Operations behind user commands, with arguments already parsed by the
//! command front-end. Validation errors are resolved here and never reach
//! the attribution pipeline.

use std::time::Duration;
use tokio::sync::mpsc;

use crate::db::{ledger, settings, triggers};
use crate::engine::Engine;
use crate::error::AppError;
use crate::models::event::BotPermissions;
use crate::models::identity::Identity;
use crate::models::trigger::{Trigger, TriggerKind, ROLE_LIMIT};
use crate::notify::Notifier;
use crate::platform::PlatformGateway;

/// Result of a bounded overwrite-confirmation wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
    TimedOut,
}

/// Waits for the invoker's next reply within `timeout`. Only "yes"/"y"
/// confirms; any other reply declines; silence cancels. No state may be
/// mutated before this returns Confirmed.
pub async fn await_confirmation(
    replies: &mut mpsc::Receiver<String>,
    timeout: Duration,
) -> Confirmation {
    match tokio::time::timeout(timeout, replies.recv()).await {
        Ok(Some(reply)) => match reply.trim().to_lowercase().as_str() {
            "yes" | "y" => Confirmation::Confirmed,
            _ => Confirmation::Declined,
        },
        Ok(None) | Err(_) => Confirmation::TimedOut,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    /// The key already existed and the invoker did not confirm overwrite.
    Cancelled(Confirmation),
}

#[derive(Debug, Clone)]
pub struct GuildStatus {
    pub guild_id: String,
    pub log_channel_id: String,
    pub cached_invites: usize,
    pub known_members: i64,
}

#[derive(Debug, Clone)]
pub struct UserStatus {
    pub user_id: String,
    pub invite_count: i64,
    pub inviter: Identity,
    pub code: Option<String>,
}

fn require_manage_roles(bot: BotPermissions, actor: BotPermissions) -> Result<(), AppError> {
    if !bot.manage_roles {
        return Err(AppError::PermissionDenied(
            "missing required permission manage_roles; please check the bot's access".to_string(),
        ));
    }
    if !actor.manage_roles {
        return Err(AppError::PermissionDenied(
            "you don't have the manage_roles permission".to_string(),
        ));
    }
    Ok(())
}

impl<G: PlatformGateway, N: Notifier> Engine<G, N> {
    /// Starts monitoring and sets the report channel. The snapshot is
    /// primed first so the first join after enabling can diff; a failed
    /// fetch leaves the guild disabled.
    pub async fn enable(&self, guild_id: &str, channel_id: &str) -> Result<(), AppError> {
        self.cache.refresh(self.gateway.as_ref(), guild_id).await?;
        settings::enable(&self.db, guild_id, channel_id).await?;
        Ok(())
    }

    pub async fn disable(&self, guild_id: &str) -> Result<(), AppError> {
        if !settings::is_enabled(&self.db, guild_id).await? {
            return Err(AppError::NotFound("not enabled yet".to_string()));
        }
        settings::disable(&self.db, guild_id).await?;
        self.cache.forget(guild_id);
        Ok(())
    }

    pub async fn guild_status(&self, guild_id: &str) -> Result<GuildStatus, AppError> {
        let Some(log_channel_id) = settings::log_channel(&self.db, guild_id).await? else {
            return Err(AppError::NotFound(
                "not enabled yet; set up with enable first".to_string(),
            ));
        };
        Ok(GuildStatus {
            guild_id: guild_id.to_string(),
            log_channel_id,
            cached_invites: self.cache.invite_count(guild_id).await,
            known_members: ledger::known_member_count(&self.db, guild_id).await?,
        })
    }

    pub async fn user_status(&self, guild_id: &str, user_id: &str) -> Result<UserStatus, AppError> {
        if !settings::is_enabled(&self.db, guild_id).await? {
            return Err(AppError::NotFound(
                "not enabled yet; set up with enable first".to_string(),
            ));
        }
        let inviter_id = ledger::lookup_inviter(&self.db, guild_id, user_id).await?;
        let inviter = self
            .resolver
            .resolve(self.gateway.as_ref(), inviter_id.as_deref())
            .await;
        Ok(UserStatus {
            user_id: user_id.to_string(),
            invite_count: ledger::count_for_inviter(&self.db, guild_id, user_id).await?,
            inviter,
            code: ledger::lookup_code(&self.db, guild_id, user_id).await?,
        })
    }

    pub async fn list_triggers(
        &self,
        guild_id: &str,
        kind: TriggerKind,
        bot: BotPermissions,
        actor: BotPermissions,
    ) -> Result<Vec<Trigger>, AppError> {
        require_manage_roles(bot, actor)?;
        triggers::list(&self.db, guild_id, kind).await
    }

    /// Adds (or, after confirmation, overwrites) a trigger. `replies`
    /// carries follow-up messages from the original invoker and is only
    /// consulted when the key already exists.
    pub async fn add_trigger(
        &self,
        guild_id: &str,
        kind: TriggerKind,
        key: &str,
        role_ids: &[String],
        bot: BotPermissions,
        actor: BotPermissions,
        replies: &mut mpsc::Receiver<String>,
    ) -> Result<AddOutcome, AppError> {
        require_manage_roles(bot, actor)?;

        if role_ids.is_empty() {
            return Err(AppError::NotFound(
                "role not found; please make sure the role exists".to_string(),
            ));
        }
        if role_ids.len() > ROLE_LIMIT {
            return Err(AppError::LimitExceeded(format!(
                "too many roles: you can attach up to {ROLE_LIMIT}"
            )));
        }
        for role_id in role_ids {
            if self.gateway.get_role(guild_id, role_id).await?.is_none() {
                return Err(AppError::NotFound(format!("role {role_id} does not exist")));
            }
        }

        match kind {
            TriggerKind::Code => {
                if !self.cache.contains_code(guild_id, key).await {
                    return Err(AppError::NotFound("invalid invite code".to_string()));
                }
            }
            TriggerKind::Inviter => {
                if self.gateway.fetch_user(key).await?.is_none() {
                    return Err(AppError::NotFound(
                        "user not found; please make sure the user exists".to_string(),
                    ));
                }
            }
        }

        if triggers::exists(&self.db, guild_id, kind, key).await? {
            let timeout = Duration::from_secs(self.confirm_timeout_secs);
            match await_confirmation(replies, timeout).await {
                Confirmation::Confirmed => {}
                cancelled => return Ok(AddOutcome::Cancelled(cancelled)),
            }
        }

        triggers::add(&self.db, guild_id, kind, key, role_ids).await?;
        Ok(AddOutcome::Added)
    }

    /// Removes the trigger at a 1-based index in listing order and returns
    /// its key.
    pub async fn remove_trigger(
        &self,
        guild_id: &str,
        kind: TriggerKind,
        index: usize,
        bot: BotPermissions,
        actor: BotPermissions,
    ) -> Result<String, AppError> {
        require_manage_roles(bot, actor)?;
        triggers::remove_by_index(&self.db, guild_id, kind, index).await
    }
}
