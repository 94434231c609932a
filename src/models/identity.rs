use serde::{Deserialize, Serialize};

/// A user as returned by the platform's user lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
}

/// Display identity for an opaque user id. `Unknown` is the sentinel used
/// whenever a lookup fails or attribution produced no inviter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identity {
    Known(UserDisplay),
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDisplay {
    pub id: String,
    pub username: String,
}

impl Identity {
    pub fn display(&self) -> String {
        match self {
            Identity::Known(u) => u.username.clone(),
            Identity::Unknown => "Unknown".to_string(),
        }
    }
}

impl From<User> for Identity {
    fn from(u: User) -> Self {
        Identity::Known(UserDisplay {
            id: u.id,
            username: u.username,
        })
    }
}
