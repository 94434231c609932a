use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::invite::InviteRecord;

/// What the bot is allowed to do in the guild an event came from, as
/// reported alongside the event. Handlers gate on these before touching
/// invites or roles.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct BotPermissions {
    #[serde(default)]
    pub manage_guild: bool,
    #[serde(default)]
    pub manage_roles: bool,
}

/// A platform event relevant to invite tracking. The platform may redeliver
/// or drop events; handlers degrade to unknown attribution rather than fail.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GatewayEvent {
    InviteCreate {
        guild_id: String,
        invite: InviteRecord,
        #[serde(default)]
        permissions: BotPermissions,
    },
    InviteDelete {
        guild_id: String,
        code: String,
        #[serde(default)]
        permissions: BotPermissions,
    },
    MemberJoin {
        guild_id: String,
        member_id: String,
        /// Account creation time, for the join report's account-age field.
        created_at: Option<DateTime<Utc>>,
        #[serde(default)]
        permissions: BotPermissions,
    },
    MemberLeave {
        guild_id: String,
        member_id: String,
        joined_at: Option<DateTime<Utc>>,
        #[serde(default)]
        permissions: BotPermissions,
    },
}

impl GatewayEvent {
    pub fn guild_id(&self) -> &str {
        match self {
            GatewayEvent::InviteCreate { guild_id, .. }
            | GatewayEvent::InviteDelete { guild_id, .. }
            | GatewayEvent::MemberJoin { guild_id, .. }
            | GatewayEvent::MemberLeave { guild_id, .. } => guild_id,
        }
    }
}
