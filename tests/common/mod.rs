#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use invistat::db;
use invistat::engine::Engine;
use invistat::error::AppError;
use invistat::models::event::{BotPermissions, GatewayEvent};
use invistat::models::identity::{Identity, User};
use invistat::models::invite::InviteRecord;
use invistat::models::role::Role;
use invistat::models::trigger::TriggerKind;
use invistat::notify::{JoinReport, LeaveReport, Notifier};
use invistat::platform::PlatformGateway;

pub fn invite(code: &str, uses: i64, inviter: &str) -> InviteRecord {
    InviteRecord {
        code: code.to_string(),
        uses,
        max_uses: 0,
        max_age: 0,
        inviter_id: Some(inviter.to_string()),
        channel_id: Some("c1".to_string()),
        created_at: None,
    }
}

pub fn perms(manage_guild: bool, manage_roles: bool) -> BotPermissions {
    BotPermissions {
        manage_guild,
        manage_roles,
    }
}

/// In-memory platform stand-in. Invite lists are mutated by tests to
/// simulate joins and deletions; grants are recorded instead of applied.
#[derive(Default)]
pub struct FakeGateway {
    invites: Mutex<HashMap<String, Vec<InviteRecord>>>,
    roles: Mutex<HashMap<String, Role>>,
    users: Mutex<HashMap<String, User>>,
    pub granted: Mutex<Vec<(String, String, Vec<String>)>>,
    pub fail_grants: AtomicBool,
    pub fail_list: AtomicBool,
}

impl FakeGateway {
    pub fn set_invites(&self, guild_id: &str, records: Vec<InviteRecord>) {
        self.invites
            .lock()
            .unwrap()
            .insert(guild_id.to_string(), records);
    }

    pub fn bump_use(&self, guild_id: &str, code: &str) {
        let mut invites = self.invites.lock().unwrap();
        if let Some(records) = invites.get_mut(guild_id) {
            if let Some(record) = records.iter_mut().find(|r| r.code == code) {
                record.uses += 1;
            }
        }
    }

    pub fn remove_invite(&self, guild_id: &str, code: &str) {
        let mut invites = self.invites.lock().unwrap();
        if let Some(records) = invites.get_mut(guild_id) {
            records.retain(|r| r.code != code);
        }
    }

    pub fn add_role(&self, role_id: &str, name: &str) {
        self.roles.lock().unwrap().insert(
            role_id.to_string(),
            Role {
                id: role_id.to_string(),
                name: name.to_string(),
                position: 1,
            },
        );
    }

    pub fn add_user(&self, user_id: &str, username: &str) {
        self.users.lock().unwrap().insert(
            user_id.to_string(),
            User {
                id: user_id.to_string(),
                username: username.to_string(),
            },
        );
    }
}

#[async_trait]
impl PlatformGateway for FakeGateway {
    async fn list_invites(&self, guild_id: &str) -> Result<Vec<InviteRecord>, AppError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(AppError::Platform("invite fetch unavailable".to_string()));
        }
        Ok(self
            .invites
            .lock()
            .unwrap()
            .get(guild_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_role(&self, _guild_id: &str, role_id: &str) -> Result<Option<Role>, AppError> {
        Ok(self.roles.lock().unwrap().get(role_id).cloned())
    }

    async fn grant_roles(
        &self,
        guild_id: &str,
        member_id: &str,
        role_ids: &[String],
    ) -> Result<(), AppError> {
        if self.fail_grants.load(Ordering::SeqCst) {
            return Err(AppError::Platform(
                "role is higher than the bot's top role".to_string(),
            ));
        }
        self.granted.lock().unwrap().push((
            guild_id.to_string(),
            member_id.to_string(),
            role_ids.to_vec(),
        ));
        Ok(())
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        Ok(self.users.lock().unwrap().get(user_id).cloned())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    InviteCreated {
        code: String,
    },
    InviteDeleted {
        code: String,
    },
    MemberJoined {
        member_id: String,
        code: Option<String>,
        inviter: String,
    },
    MemberLeft {
        member_id: String,
        code: Option<String>,
        inviter: String,
    },
    RolesGranted {
        member_id: String,
        kind: TriggerKind,
        key: String,
        role_ids: Vec<String>,
    },
    TriggerUnavailable {
        kind: TriggerKind,
        key: String,
    },
    GrantFailed {
        kind: TriggerKind,
        key: String,
        reason: String,
    },
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn take(&self) -> Vec<Notice> {
        std::mem::take(&mut self.notices.lock().unwrap())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn invite_created(&self, _channel_id: &str, invite: &InviteRecord, _inviter: &Identity) {
        self.notices.lock().unwrap().push(Notice::InviteCreated {
            code: invite.code.clone(),
        });
    }

    async fn invite_deleted(&self, _channel_id: &str, code: &str, _inviter: &Identity) {
        self.notices.lock().unwrap().push(Notice::InviteDeleted {
            code: code.to_string(),
        });
    }

    async fn member_joined(&self, _channel_id: &str, report: &JoinReport) {
        self.notices.lock().unwrap().push(Notice::MemberJoined {
            member_id: report.member_id.clone(),
            code: report.attribution.code.clone(),
            inviter: report.inviter.display(),
        });
    }

    async fn member_left(&self, _channel_id: &str, report: &LeaveReport) {
        self.notices.lock().unwrap().push(Notice::MemberLeft {
            member_id: report.member_id.clone(),
            code: report.code.clone(),
            inviter: report.inviter.display(),
        });
    }

    async fn roles_granted(
        &self,
        _channel_id: &str,
        member_id: &str,
        kind: TriggerKind,
        key: &str,
        role_ids: &[String],
    ) {
        self.notices.lock().unwrap().push(Notice::RolesGranted {
            member_id: member_id.to_string(),
            kind,
            key: key.to_string(),
            role_ids: role_ids.to_vec(),
        });
    }

    async fn trigger_unavailable(&self, _channel_id: &str, kind: TriggerKind, key: &str) {
        self.notices.lock().unwrap().push(Notice::TriggerUnavailable {
            kind,
            key: key.to_string(),
        });
    }

    async fn grant_failed(
        &self,
        _channel_id: &str,
        _member_id: &str,
        kind: TriggerKind,
        key: &str,
        reason: &str,
    ) {
        self.notices.lock().unwrap().push(Notice::GrantFailed {
            kind,
            key: key.to_string(),
            reason: reason.to_string(),
        });
    }
}

/// Engine over an in-memory store, fake gateway and recording notifier.
/// Each instance is isolated, safe for parallel tests.
pub struct TestEngine {
    pub engine: Arc<Engine<FakeGateway, RecordingNotifier>>,
    pub gateway: Arc<FakeGateway>,
    pub notifier: Arc<RecordingNotifier>,
}

impl TestEngine {
    pub async fn new() -> Self {
        let pool = db::create_pool("sqlite::memory:")
            .await
            .expect("failed to create test pool");
        let gateway = Arc::new(FakeGateway::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let engine = Arc::new(Engine::new(
            pool,
            Arc::clone(&gateway),
            Arc::clone(&notifier),
        ));
        Self {
            engine,
            gateway,
            notifier,
        }
    }

    /// Enables monitoring for a guild and primes its snapshot from the
    /// fake gateway's current invite list.
    pub async fn enable(&self, guild_id: &str) {
        self.engine
            .enable(guild_id, "log-channel")
            .await
            .expect("enable failed");
    }

    pub fn join(&self, guild_id: &str, member_id: &str) -> GatewayEvent {
        GatewayEvent::MemberJoin {
            guild_id: guild_id.to_string(),
            member_id: member_id.to_string(),
            created_at: Some("2024-01-01T00:00:00Z".parse().unwrap()),
            permissions: perms(true, true),
        }
    }

    pub fn leave(&self, guild_id: &str, member_id: &str) -> GatewayEvent {
        GatewayEvent::MemberLeave {
            guild_id: guild_id.to_string(),
            member_id: member_id.to_string(),
            joined_at: Some("2024-01-02T00:00:00Z".parse().unwrap()),
            permissions: perms(true, true),
        }
    }
}
