use crate::models::attribution::Attribution;
use crate::models::invite::GuildSnapshot;

/// Infers which invite was consumed between two snapshots.
///
/// Walks `previous` in platform order and returns the first code whose
/// `uses` rose or which disappeared (typically because it hit `max_uses`).
/// Best-effort over two point-in-time snapshots: correct when exactly one
/// invite changed, and may mis-attribute when several changed at once
/// (simultaneous joins in a busy guild). First-in-order wins when more than
/// one code qualifies; that tie-break is part of the contract.
pub fn attribute(previous: &GuildSnapshot, current: &GuildSnapshot) -> Attribution {
    for old in &previous.records {
        match current.get(&old.code) {
            Some(new) => {
                if new.uses > old.uses {
                    return Attribution {
                        inviter_id: old.inviter_id.clone(),
                        code: Some(old.code.clone()),
                    };
                }
            }
            None => {
                return Attribution {
                    inviter_id: old.inviter_id.clone(),
                    code: Some(old.code.clone()),
                };
            }
        }
    }
    Attribution::unknown()
}
