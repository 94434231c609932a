use serde::{Deserialize, Serialize};

/// Maximum triggers of one kind per guild.
pub const TRIGGER_LIMIT: usize = 5;
/// Maximum roles one trigger may grant.
pub const ROLE_LIMIT: usize = 5;

/// What a trigger matches a join against: the invite code that was used,
/// or the user who created the invite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerKind {
    Code,
    Inviter,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Code => "code",
            TriggerKind::Inviter => "inviter",
        }
    }
}

/// A stored rule: members attributed to `key` get `role_ids`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trigger {
    pub guild_id: String,
    pub kind: TriggerKind,
    pub key: String,
    pub role_ids: Vec<String>,
}
