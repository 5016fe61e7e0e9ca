//! Sonos Control API (cloud) collaborator.
//!
//! Favorites are account-level objects only reachable through the cloud API,
//! so the named-favorite flow goes through here rather than the speaker's
//! local SOAP services.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::OAuthError;

pub mod client;

pub use client::SonosCloudClient;

/// Errors from the Sonos Control API and favorite resolution.
#[derive(Debug, Error)]
pub enum CloudError {
    #[error("Sonos Cloud request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Auth(OAuthError),

    #[error("Sonos Cloud API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("No Sonos household available for this account")]
    NoHousehold,

    #[error("Group not found: {0}")]
    GroupNotFound(String),

    #[error("Favorite not found: {0}")]
    FavoriteNotFound(String),
}

impl From<OAuthError> for CloudError {
    fn from(err: OAuthError) -> Self {
        match err {
            OAuthError::Http(e) => Self::Http(e),
            other => Self::Auth(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A playback group (one or more bonded players).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub coordinator_id: Option<String>,
    #[serde(default)]
    pub playback_state: Option<String>,
    #[serde(default)]
    pub player_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Household, group and favorite operations the relay needs.
#[async_trait]
pub trait CloudFavorites: Send + Sync {
    async fn households(&self) -> Result<Vec<Household>, CloudError>;

    async fn groups(&self, household_id: &str) -> Result<Vec<Group>, CloudError>;

    async fn favorites(&self, household_id: &str) -> Result<Vec<Favorite>, CloudError>;

    /// Replaces the group's queue with the favorite and starts playback.
    async fn load_favorite(&self, group_id: &str, favorite_id: &str) -> Result<(), CloudError>;

    /// Sets the group volume (0-100).
    async fn set_group_volume(&self, group_id: &str, volume: u8) -> Result<(), CloudError>;
}

/// Case-insensitive favorite lookup by display name.
#[must_use]
pub fn find_favorite<'a>(favorites: &'a [Favorite], name: &str) -> Option<&'a Favorite> {
    let wanted = name.trim().to_lowercase();
    favorites
        .iter()
        .find(|f| f.name.trim().to_lowercase() == wanted)
}

/// Picks the group named `name` (case-insensitive), or the first group when
/// no name is configured.
pub fn select_group<'a>(groups: &'a [Group], name: Option<&str>) -> Result<&'a Group, CloudError> {
    match name {
        Some(name) => {
            let wanted = name.trim().to_lowercase();
            groups
                .iter()
                .find(|g| g.name.trim().to_lowercase() == wanted)
                .ok_or_else(|| CloudError::GroupNotFound(name.to_string()))
        }
        None => groups
            .first()
            .ok_or_else(|| CloudError::GroupNotFound("(any)".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn favorite(id: &str, name: &str) -> Favorite {
        Favorite {
            id: id.into(),
            name: name.into(),
            description: None,
            image_url: None,
        }
    }

    fn group(id: &str, name: &str) -> Group {
        Group {
            id: id.into(),
            name: name.into(),
            coordinator_id: None,
            playback_state: None,
            player_ids: vec![],
        }
    }

    #[test]
    fn favorite_lookup_ignores_case_and_padding() {
        let favorites = [favorite("1", "Morning Jazz"), favorite("2", "Focus")];
        assert_eq!(find_favorite(&favorites, " morning JAZZ").unwrap().id, "1");
        assert!(find_favorite(&favorites, "Evening").is_none());
    }

    #[test]
    fn group_defaults_to_first() {
        let groups = [group("g1", "Kitchen"), group("g2", "Living Room")];
        assert_eq!(select_group(&groups, None).unwrap().id, "g1");
        assert_eq!(select_group(&groups, Some("living room")).unwrap().id, "g2");
        assert!(matches!(
            select_group(&groups, Some("Garage")),
            Err(CloudError::GroupNotFound(_))
        ));
        assert!(select_group(&[], None).is_err());
    }

    #[test]
    fn groups_deserialize_from_api_shape() {
        let json = r#"{"id":"RINCON_1:0","name":"Kitchen","coordinatorId":"RINCON_1","playbackState":"PLAYBACK_STATE_IDLE","playerIds":["RINCON_1"]}"#;
        let g: Group = serde_json::from_str(json).unwrap();
        assert_eq!(g.coordinator_id.as_deref(), Some("RINCON_1"));
        assert_eq!(g.player_ids.len(), 1);
    }
}
