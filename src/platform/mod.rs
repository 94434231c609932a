pub mod feed;
pub mod rest;

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::identity::User;
use crate::models::invite::InviteRecord;
use crate::models::role::Role;

/// The platform surface the engine needs. The REST client implements it for
/// production; tests inject fakes.
#[async_trait]
pub trait PlatformGateway: Send + Sync {
    /// Authoritative invite list for a guild, in platform order.
    async fn list_invites(&self, guild_id: &str) -> Result<Vec<InviteRecord>, AppError>;

    async fn get_role(&self, guild_id: &str, role_id: &str) -> Result<Option<Role>, AppError>;

    async fn grant_roles(
        &self,
        guild_id: &str,
        member_id: &str,
        role_ids: &[String],
    ) -> Result<(), AppError>;

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, AppError>;
}
