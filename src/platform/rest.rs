use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::PlatformGateway;
use crate::error::AppError;
use crate::models::identity::User;
use crate::models::invite::InviteRecord;
use crate::models::role::Role;

/// REST client for the platform API, authenticated with the bot token.
pub struct RestClient {
    client: Client,
    base_url: String,
    token: String,
}

impl RestClient {
    pub fn new(base_url: &str, token: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        }
    }

    fn apply_auth(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder.header("Authorization", format!("Bot {}", self.token))
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, AppError> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(AppError::Platform(format!("platform returned {status}: {body}")));
        }
        Ok(resp)
    }
}

#[async_trait]
impl PlatformGateway for RestClient {
    async fn list_invites(&self, guild_id: &str) -> Result<Vec<InviteRecord>, AppError> {
        let url = format!("{}/guilds/{guild_id}/invites", self.base_url);
        let resp = self.apply_auth(self.client.get(&url)).send().await?;
        let invites = Self::check(resp).await?.json::<Vec<InviteRecord>>().await?;
        Ok(invites)
    }

    async fn get_role(&self, guild_id: &str, role_id: &str) -> Result<Option<Role>, AppError> {
        let url = format!("{}/guilds/{guild_id}/roles/{role_id}", self.base_url);
        let resp = self.apply_auth(self.client.get(&url)).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let role = Self::check(resp).await?.json::<Role>().await?;
        Ok(Some(role))
    }

    async fn grant_roles(
        &self,
        guild_id: &str,
        member_id: &str,
        role_ids: &[String],
    ) -> Result<(), AppError> {
        let url = format!("{}/guilds/{guild_id}/members/{member_id}/roles", self.base_url);
        let builder = self
            .client
            .put(&url)
            .json(&json!({ "role_ids": role_ids }));
        let resp = self.apply_auth(builder).send().await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn fetch_user(&self, user_id: &str) -> Result<Option<User>, AppError> {
        let url = format!("{}/users/{user_id}", self.base_url);
        let resp = self.apply_auth(self.client.get(&url)).send().await?;
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let user = Self::check(resp).await?.json::<User>().await?;
        Ok(Some(user))
    }
}
