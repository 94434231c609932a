use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::models::attribution::Attribution;
use crate::models::identity::Identity;
use crate::models::invite::InviteRecord;
use crate::models::trigger::TriggerKind;

/// Everything the notification layer needs to render a join report.
#[derive(Debug, Clone)]
pub struct JoinReport {
    pub guild_id: String,
    pub member_id: String,
    pub attribution: Attribution,
    pub inviter: Identity,
    /// Account creation time of the joiner, for account-age display.
    pub account_created_at: Option<DateTime<Utc>>,
}

impl JoinReport {
    /// Age of the joiner's account at `now`. Renderers use this to flag
    /// freshly created accounts.
    pub fn account_age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.account_created_at.map(|created| now - created)
    }
}

#[derive(Debug, Clone)]
pub struct LeaveReport {
    pub guild_id: String,
    pub member_id: String,
    pub inviter: Identity,
    pub code: Option<String>,
    pub joined_at: Option<DateTime<Utc>>,
}

impl LeaveReport {
    /// How long the member stayed before leaving.
    pub fn stay_duration(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.joined_at.map(|joined| now - joined)
    }
}

/// Sink for human-facing reports. The engine hands over structured data
/// only; rendering (embeds, mentions, channels) lives entirely behind this
/// trait.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn invite_created(&self, channel_id: &str, invite: &InviteRecord, inviter: &Identity);

    async fn invite_deleted(&self, channel_id: &str, code: &str, inviter: &Identity);

    async fn member_joined(&self, channel_id: &str, report: &JoinReport);

    async fn member_left(&self, channel_id: &str, report: &LeaveReport);

    async fn roles_granted(
        &self,
        channel_id: &str,
        member_id: &str,
        kind: TriggerKind,
        key: &str,
        role_ids: &[String],
    );

    /// A trigger whose roles (or invite) are gone was removed.
    async fn trigger_unavailable(&self, channel_id: &str, kind: TriggerKind, key: &str);

    async fn grant_failed(
        &self,
        channel_id: &str,
        member_id: &str,
        kind: TriggerKind,
        key: &str,
        reason: &str,
    );
}

/// Notifier that writes reports to the log. Used when no richer
/// notification backend is wired in.
#[derive(Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn invite_created(&self, channel_id: &str, invite: &InviteRecord, inviter: &Identity) {
        tracing::info!(
            channel_id,
            code = %invite.code,
            inviter = %inviter.display(),
            "invite created"
        );
    }

    async fn invite_deleted(&self, channel_id: &str, code: &str, inviter: &Identity) {
        tracing::info!(channel_id, code, inviter = %inviter.display(), "invite deleted");
    }

    async fn member_joined(&self, channel_id: &str, report: &JoinReport) {
        let account_age_hours = report.account_age(Utc::now()).map(|age| age.num_hours());
        tracing::info!(
            channel_id,
            member_id = %report.member_id,
            code = report.attribution.code.as_deref().unwrap_or("Unknown"),
            inviter = %report.inviter.display(),
            account_age_hours,
            "member joined"
        );
    }

    async fn member_left(&self, channel_id: &str, report: &LeaveReport) {
        let stayed_hours = report.stay_duration(Utc::now()).map(|d| d.num_hours());
        tracing::info!(
            channel_id,
            member_id = %report.member_id,
            code = report.code.as_deref().unwrap_or("Unknown"),
            inviter = %report.inviter.display(),
            stayed_hours,
            "member left"
        );
    }

    async fn roles_granted(
        &self,
        channel_id: &str,
        member_id: &str,
        kind: TriggerKind,
        key: &str,
        role_ids: &[String],
    ) {
        tracing::info!(
            channel_id,
            member_id,
            kind = kind.as_str(),
            key,
            roles = role_ids.len(),
            "trigger roles granted"
        );
    }

    async fn trigger_unavailable(&self, channel_id: &str, kind: TriggerKind, key: &str) {
        tracing::warn!(
            channel_id,
            kind = kind.as_str(),
            key,
            "trigger is no longer available and was removed"
        );
    }

    async fn grant_failed(
        &self,
        channel_id: &str,
        member_id: &str,
        kind: TriggerKind,
        key: &str,
        reason: &str,
    ) {
        tracing::warn!(
            channel_id,
            member_id,
            kind = kind.as_str(),
            key,
            reason,
            "failed to grant trigger roles"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn account_age_spans_from_creation_to_now() {
        let report = JoinReport {
            guild_id: "g1".to_string(),
            member_id: "m1".to_string(),
            attribution: Attribution::unknown(),
            inviter: Identity::Unknown,
            account_created_at: Some(ts("2024-01-01T00:00:00Z")),
        };
        let age = report.account_age(ts("2024-01-08T00:00:00Z")).unwrap();
        assert_eq!(age.num_days(), 7);
    }

    #[test]
    fn account_age_is_none_without_creation_time() {
        let report = JoinReport {
            guild_id: "g1".to_string(),
            member_id: "m1".to_string(),
            attribution: Attribution::unknown(),
            inviter: Identity::Unknown,
            account_created_at: None,
        };
        assert!(report.account_age(Utc::now()).is_none());
    }

    #[test]
    fn stay_duration_spans_from_join_to_now() {
        let report = LeaveReport {
            guild_id: "g1".to_string(),
            member_id: "m1".to_string(),
            inviter: Identity::Unknown,
            code: None,
            joined_at: Some(ts("2024-03-01T00:00:00Z")),
        };
        let stayed = report.stay_duration(ts("2024-03-01T12:00:00Z")).unwrap();
        assert_eq!(stayed.num_hours(), 12);
    }
}
