use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::AppError;
use crate::models::invite::GuildSnapshot;
use crate::platform::PlatformGateway;

/// Per-guild table of current invite snapshots.
///
/// Refreshes for one guild are serialized behind that guild's mutex so two
/// interleaved fetches can never produce lost or duplicated deltas; guilds
/// refresh independently of each other. The table is a cache only — it is
/// rebuilt from the platform after restart.
#[derive(Default)]
pub struct SnapshotCache {
    guilds: DashMap<String, Arc<Mutex<GuildSnapshot>>>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&self, guild_id: &str) -> Arc<Mutex<GuildSnapshot>> {
        self.guilds
            .entry(guild_id.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(GuildSnapshot::new(guild_id, Vec::new())))
            })
            .clone()
    }

    /// Fetches the authoritative invite list, swaps it in, and returns the
    /// replaced and the new snapshot. On fetch failure the previous
    /// snapshot stays current; nothing is partially replaced.
    pub async fn refresh<G: PlatformGateway + ?Sized>(
        &self,
        gateway: &G,
        guild_id: &str,
    ) -> Result<(GuildSnapshot, GuildSnapshot), AppError> {
        let entry = self.entry(guild_id);
        let mut slot = entry.lock().await;
        let records = gateway.list_invites(guild_id).await?;
        let current = GuildSnapshot::new(guild_id, records);
        let previous = std::mem::replace(&mut *slot, current.clone());
        Ok((previous, current))
    }

    /// The current snapshot, if the guild has been refreshed at least once.
    pub async fn current(&self, guild_id: &str) -> Option<GuildSnapshot> {
        let entry = self.guilds.get(guild_id)?.clone();
        let slot = entry.lock().await;
        Some(slot.clone())
    }

    /// Inviter of `code` in the current snapshot. Used by the invite-delete
    /// handler, which must read before the deletion is folded in.
    pub async fn inviter_of(&self, guild_id: &str, code: &str) -> Option<String> {
        let snapshot = self.current(guild_id).await?;
        snapshot.get(code)?.inviter_id.clone()
    }

    pub async fn contains_code(&self, guild_id: &str, code: &str) -> bool {
        match self.current(guild_id).await {
            Some(snapshot) => snapshot.contains(code),
            None => false,
        }
    }

    pub async fn invite_count(&self, guild_id: &str) -> usize {
        match self.current(guild_id).await {
            Some(snapshot) => snapshot.len(),
            None => 0,
        }
    }

    /// Drops a guild's snapshot, e.g. when monitoring is disabled.
    pub fn forget(&self, guild_id: &str) {
        self.guilds.remove(guild_id);
    }
}
