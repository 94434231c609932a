use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::cache::SnapshotCache;
use crate::db::{ledger, settings, triggers};
use crate::error::AppError;
use crate::grants;
use crate::models::attribution::GrantOutcome;
use crate::models::event::{BotPermissions, GatewayEvent};
use crate::models::invite::InviteRecord;
use crate::models::trigger::TriggerKind;
use crate::notify::{JoinReport, LeaveReport, Notifier};
use crate::platform::PlatformGateway;
use crate::resolver::IdentityResolver;

/// The invite engine for all guilds: snapshot cache, diff, ledger and
/// trigger grants composed over injected collaborators. One instance is
/// shared across the per-guild workers.
pub struct Engine<G, N> {
    pub db: SqlitePool,
    pub gateway: Arc<G>,
    pub notifier: Arc<N>,
    pub cache: SnapshotCache,
    pub resolver: IdentityResolver,
    /// Our own user id; used to ignore the bot's own departure events.
    pub bot_user_id: Option<String>,
    pub confirm_timeout_secs: u64,
}

impl<G: PlatformGateway, N: Notifier> Engine<G, N> {
    pub fn new(db: SqlitePool, gateway: Arc<G>, notifier: Arc<N>) -> Self {
        Self {
            db,
            gateway,
            notifier,
            cache: SnapshotCache::new(),
            resolver: IdentityResolver::new(),
            bot_user_id: None,
            confirm_timeout_secs: 30,
        }
    }

    pub fn with_bot_user_id(mut self, bot_user_id: Option<String>) -> Self {
        self.bot_user_id = bot_user_id;
        self
    }

    pub fn with_confirm_timeout(mut self, secs: u64) -> Self {
        self.confirm_timeout_secs = secs;
        self
    }

    /// Entry point for one platform event. Errors abort this event only;
    /// the snapshot cache keeps its previous state on fetch failure and no
    /// partial ledger or trigger writes are left behind.
    pub async fn handle_event(&self, event: GatewayEvent) -> Result<(), AppError> {
        match event {
            GatewayEvent::InviteCreate {
                guild_id,
                invite,
                permissions,
            } => self.on_invite_create(&guild_id, invite, permissions).await,
            GatewayEvent::InviteDelete {
                guild_id,
                code,
                permissions,
            } => self.on_invite_delete(&guild_id, &code, permissions).await,
            GatewayEvent::MemberJoin {
                guild_id,
                member_id,
                created_at,
                permissions,
            } => {
                self.on_member_join(&guild_id, &member_id, created_at, permissions)
                    .await
            }
            GatewayEvent::MemberLeave {
                guild_id,
                member_id,
                joined_at,
                ..
            } => self.on_member_leave(&guild_id, &member_id, joined_at).await,
        }
    }

    /// Channel to report into, or None when the guild has monitoring off.
    async fn report_channel(&self, guild_id: &str) -> Result<Option<String>, AppError> {
        settings::log_channel(&self.db, guild_id).await
    }

    fn can_manage_guild(guild_id: &str, permissions: BotPermissions) -> bool {
        if !permissions.manage_guild {
            tracing::warn!(guild_id, "missing manage_guild, skipping invite event");
            return false;
        }
        true
    }

    async fn on_invite_create(
        &self,
        guild_id: &str,
        invite: InviteRecord,
        permissions: BotPermissions,
    ) -> Result<(), AppError> {
        let Some(channel) = self.report_channel(guild_id).await? else {
            return Ok(());
        };
        if !Self::can_manage_guild(guild_id, permissions) {
            return Ok(());
        }

        self.cache.refresh(self.gateway.as_ref(), guild_id).await?;
        let inviter = self
            .resolver
            .resolve(self.gateway.as_ref(), invite.inviter_id.as_deref())
            .await;
        self.notifier.invite_created(&channel, &invite, &inviter).await;
        Ok(())
    }

    async fn on_invite_delete(
        &self,
        guild_id: &str,
        code: &str,
        permissions: BotPermissions,
    ) -> Result<(), AppError> {
        let Some(channel) = self.report_channel(guild_id).await? else {
            return Ok(());
        };
        if !Self::can_manage_guild(guild_id, permissions) {
            return Ok(());
        }

        // Recover the inviter from the snapshot that still lists the code.
        let inviter_id = self.cache.inviter_of(guild_id, code).await;
        self.cache.refresh(self.gateway.as_ref(), guild_id).await?;

        let inviter = self
            .resolver
            .resolve(self.gateway.as_ref(), inviter_id.as_deref())
            .await;
        self.notifier.invite_deleted(&channel, code, &inviter).await;

        // A by-code trigger pointing at a deleted invite can never fire
        // again; heal it away now instead of at the next join.
        if triggers::exists(&self.db, guild_id, TriggerKind::Code, code).await? {
            triggers::remove(&self.db, guild_id, TriggerKind::Code, code).await?;
            self.notifier
                .trigger_unavailable(&channel, TriggerKind::Code, code)
                .await;
        }
        Ok(())
    }

    async fn on_member_join(
        &self,
        guild_id: &str,
        member_id: &str,
        created_at: Option<DateTime<Utc>>,
        permissions: BotPermissions,
    ) -> Result<(), AppError> {
        let Some(channel) = self.report_channel(guild_id).await? else {
            return Ok(());
        };
        if !Self::can_manage_guild(guild_id, permissions) {
            return Ok(());
        }

        let (previous, current) = self.cache.refresh(self.gateway.as_ref(), guild_id).await?;
        let attribution = crate::diff::attribute(&previous, &current);

        if attribution.is_known() {
            ledger::record(&self.db, guild_id, member_id, &attribution).await?;
        }

        let inviter = self
            .resolver
            .resolve(self.gateway.as_ref(), attribution.inviter_id.as_deref())
            .await;
        let report = JoinReport {
            guild_id: guild_id.to_string(),
            member_id: member_id.to_string(),
            attribution: attribution.clone(),
            inviter,
            account_created_at: created_at,
        };
        self.notifier.member_joined(&channel, &report).await;

        if !attribution.is_known() {
            return Ok(());
        }
        if !permissions.manage_roles {
            tracing::warn!(guild_id, "missing manage_roles, skipping triggers");
            return Ok(());
        }

        let outcome = grants::resolve_and_grant(
            &self.db,
            self.gateway.as_ref(),
            guild_id,
            member_id,
            &attribution,
        )
        .await?;
        match &outcome {
            GrantOutcome::NotApplicable => {}
            GrantOutcome::Applied {
                kind,
                key,
                role_ids,
            } => {
                self.notifier
                    .roles_granted(&channel, member_id, *kind, key, role_ids)
                    .await;
            }
            GrantOutcome::SelfHealed { kind, key } => {
                self.notifier.trigger_unavailable(&channel, *kind, key).await;
            }
            GrantOutcome::Failed { kind, key, reason } => {
                self.notifier
                    .grant_failed(&channel, member_id, *kind, key, reason)
                    .await;
            }
        }
        Ok(())
    }

    async fn on_member_leave(
        &self,
        guild_id: &str,
        member_id: &str,
        joined_at: Option<DateTime<Utc>>,
    ) -> Result<(), AppError> {
        if self.bot_user_id.as_deref() == Some(member_id) {
            return Ok(());
        }
        let Some(channel) = self.report_channel(guild_id).await? else {
            return Ok(());
        };

        let inviter_id = ledger::lookup_inviter(&self.db, guild_id, member_id).await?;
        let code = ledger::lookup_code(&self.db, guild_id, member_id).await?;
        let inviter = self
            .resolver
            .resolve(self.gateway.as_ref(), inviter_id.as_deref())
            .await;

        let report = LeaveReport {
            guild_id: guild_id.to_string(),
            member_id: member_id.to_string(),
            inviter,
            code,
            joined_at,
        };
        self.notifier.member_left(&channel, &report).await;
        Ok(())
    }
}
