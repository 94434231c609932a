use dashmap::DashMap;

use crate::models::identity::{Identity, UserDisplay};
use crate::platform::PlatformGateway;

/// Resolves opaque user ids to display identities: local cache first, then
/// a platform lookup. Any failure yields the Unknown sentinel — callers
/// never see an error from here.
#[derive(Default)]
pub struct IdentityResolver {
    cache: DashMap<String, UserDisplay>,
}

impl IdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve<G: PlatformGateway + ?Sized>(
        &self,
        gateway: &G,
        user_id: Option<&str>,
    ) -> Identity {
        let Some(user_id) = user_id else {
            return Identity::Unknown;
        };
        if let Some(cached) = self.cache.get(user_id) {
            return Identity::Known(cached.clone());
        }
        match gateway.fetch_user(user_id).await {
            Ok(Some(user)) => {
                let display = UserDisplay {
                    id: user.id,
                    username: user.username,
                };
                self.cache.insert(user_id.to_string(), display.clone());
                Identity::Known(display)
            }
            Ok(None) => Identity::Unknown,
            Err(e) => {
                tracing::debug!("user lookup failed for {user_id}: {e}");
                Identity::Unknown
            }
        }
    }
}
