use serde::{Deserialize, Serialize};

/// A guild role as resolved through the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub position: i64,
}
