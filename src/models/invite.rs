use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One invite as reported by the platform at fetch time.
///
/// Immutable except `uses`, which only grows until the invite is removed
/// (deleted by hand or consumed past `max_uses`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteRecord {
    pub code: String,
    pub uses: i64,
    /// 0 means unlimited.
    pub max_uses: i64,
    /// Seconds; 0 means the invite never expires.
    pub max_age: i64,
    pub inviter_id: Option<String>,
    pub channel_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// The full set of invites known for one guild at one point in time.
///
/// Records keep the order the platform returned them in; the diff uses that
/// order as its tie-break, so it must never be re-sorted. Snapshots are
/// replaced wholesale on refresh, never patched record by record.
#[derive(Debug, Clone, Default)]
pub struct GuildSnapshot {
    pub guild_id: String,
    pub records: Vec<InviteRecord>,
}

impl GuildSnapshot {
    pub fn new(guild_id: &str, records: Vec<InviteRecord>) -> Self {
        Self {
            guild_id: guild_id.to_string(),
            records,
        }
    }

    pub fn get(&self, code: &str) -> Option<&InviteRecord> {
        self.records.iter().find(|r| r.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.get(code).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
