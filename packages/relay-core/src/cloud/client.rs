//! HTTP client for the Sonos Control API.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::{CloudError, CloudFavorites, Favorite, Group, Household};
use crate::auth::OAuthSession;
use crate::protocol_constants::SONOS_CLOUD_API_BASE;

#[derive(Debug, Deserialize)]
struct HouseholdsResponse {
    #[serde(default)]
    households: Vec<Household>,
}

#[derive(Debug, Deserialize)]
struct GroupsResponse {
    #[serde(default)]
    groups: Vec<Group>,
}

#[derive(Debug, Deserialize)]
struct FavoritesResponse {
    #[serde(default)]
    items: Vec<Favorite>,
}

/// Sonos Control API client authenticated through an [`OAuthSession`].
#[derive(Clone)]
pub struct SonosCloudClient {
    http: Client,
    session: Arc<OAuthSession>,
    api_base: String,
}

impl SonosCloudClient {
    #[must_use]
    pub fn new(http: Client, session: Arc<OAuthSession>) -> Self {
        Self::with_base_url(http, session, SONOS_CLOUD_API_BASE)
    }

    #[must_use]
    pub fn with_base_url(http: Client, session: Arc<OAuthSession>, api_base: &str) -> Self {
        Self {
            http,
            session,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CloudError> {
        let url = format!("{}{}", self.api_base, path);
        let response = self
            .session
            .send_authorized(|| self.http.get(&url))
            .await?;
        Ok(check(response).await?.json().await?)
    }

    async fn post_json(&self, path: &str, body: serde_json::Value) -> Result<(), CloudError> {
        let url = format!("{}{}", self.api_base, path);
        let response = self
            .session
            .send_authorized(|| self.http.post(&url).json(&body))
            .await?;
        check(response).await?;
        Ok(())
    }
}

async fn check(response: Response) -> Result<Response, CloudError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    log::warn!("[Cloud] Request failed with {}: {}", status, body);
    Err(CloudError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl CloudFavorites for SonosCloudClient {
    async fn households(&self) -> Result<Vec<Household>, CloudError> {
        let body: HouseholdsResponse = self.get_json("/households").await?;
        Ok(body.households)
    }

    async fn groups(&self, household_id: &str) -> Result<Vec<Group>, CloudError> {
        let path = format!("/households/{}/groups", urlencoding::encode(household_id));
        let body: GroupsResponse = self.get_json(&path).await?;
        Ok(body.groups)
    }

    async fn favorites(&self, household_id: &str) -> Result<Vec<Favorite>, CloudError> {
        let path = format!("/households/{}/favorites", urlencoding::encode(household_id));
        let body: FavoritesResponse = self.get_json(&path).await?;
        Ok(body.items)
    }

    async fn load_favorite(&self, group_id: &str, favorite_id: &str) -> Result<(), CloudError> {
        log::info!("[Cloud] Loading favorite {} on group {}", favorite_id, group_id);
        let path = format!("/groups/{}/favorites", urlencoding::encode(group_id));
        self.post_json(
            &path,
            json!({
                "favoriteId": favorite_id,
                "playOnCompletion": true,
                "action": "REPLACE",
            }),
        )
        .await
    }

    async fn set_group_volume(&self, group_id: &str, volume: u8) -> Result<(), CloudError> {
        log::info!("[Cloud] Setting group {} volume to {}", group_id, volume);
        let path = format!("/groups/{}/groupVolume", urlencoding::encode(group_id));
        self.post_json(&path, json!({ "volume": volume.min(100) }))
            .await
    }
}
