use super::trigger::TriggerKind;

/// Outcome of diffing two snapshots: the invite we believe was consumed.
///
/// `None` fields mean attribution failed; downstream code renders that as
/// "Unknown" and must not treat it as an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attribution {
    pub inviter_id: Option<String>,
    pub code: Option<String>,
}

impl Attribution {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_known(&self) -> bool {
        self.code.is_some()
    }
}

/// What the grant orchestrator did for one join. Always a value, never an
/// error raised past the orchestrator boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GrantOutcome {
    /// No trigger matched the attribution.
    NotApplicable,
    Applied {
        kind: TriggerKind,
        key: String,
        role_ids: Vec<String>,
    },
    /// Every configured role was gone; the trigger was removed.
    SelfHealed { kind: TriggerKind, key: String },
    /// The platform refused the grant. Reported once, not retried.
    Failed {
        kind: TriggerKind,
        key: String,
        reason: String,
    },
}
