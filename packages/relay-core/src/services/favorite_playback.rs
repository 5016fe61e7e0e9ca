//! Named-favorite playback through the Sonos Control API.

use std::sync::Arc;

use serde::Serialize;

use crate::cloud::{find_favorite, select_group, CloudError, CloudFavorites, Favorite, Group};
use crate::spotify::PlaybackPauser;

/// Result of a favorite playback request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteOutcome {
    pub success: bool,
    pub favorite: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Resolves household, group and favorite, then replaces the group's queue.
#[derive(Clone)]
pub struct FavoritePlayer {
    cloud: Arc<dyn CloudFavorites>,
    pauser: Option<Arc<dyn PlaybackPauser>>,
    group_name: Option<String>,
}

impl FavoritePlayer {
    /// # Arguments
    /// * `group_name` - Target group; `None` picks the household's first group
    pub fn new(
        cloud: Arc<dyn CloudFavorites>,
        pauser: Option<Arc<dyn PlaybackPauser>>,
        group_name: Option<String>,
    ) -> Self {
        Self {
            cloud,
            pauser,
            group_name,
        }
    }

    async fn household_id(&self) -> Result<String, CloudError> {
        self.cloud
            .households()
            .await?
            .into_iter()
            .next()
            .map(|h| h.id)
            .ok_or(CloudError::NoHousehold)
    }

    /// Lists favorites of the first household.
    pub async fn list_favorites(&self) -> Result<Vec<Favorite>, CloudError> {
        let household = self.household_id().await?;
        self.cloud.favorites(&household).await
    }

    /// Plays the favorite called `name` (case-insensitive).
    pub async fn play_favorite(&self, name: &str, volume: Option<u8>) -> FavoriteOutcome {
        let mut outcome = FavoriteOutcome {
            success: false,
            favorite: name.to_string(),
            favorite_id: None,
            group: None,
            error: None,
        };

        match self.run(name, volume, &mut outcome).await {
            Ok(()) => {
                log::info!(
                    "[Favorite] Playing {:?} on {}",
                    name,
                    outcome.group.as_deref().unwrap_or("?")
                );
                outcome.success = true;
            }
            Err(e) => {
                log::warn!("[Favorite] Could not play {:?}: {}", name, e);
                outcome.error = Some(e.to_string());
            }
        }
        outcome
    }

    async fn run(
        &self,
        name: &str,
        volume: Option<u8>,
        outcome: &mut FavoriteOutcome,
    ) -> Result<(), CloudError> {
        if let Some(pauser) = &self.pauser {
            if let Err(e) = pauser.pause_playback().await {
                log::warn!("[Favorite] Could not pause Spotify, continuing: {}", e);
            }
        }

        let household = self.household_id().await?;
        let groups = self.cloud.groups(&household).await?;
        let group: &Group = select_group(&groups, self.group_name.as_deref())?;
        outcome.group = Some(group.name.clone());

        let favorites = self.cloud.favorites(&household).await?;
        let favorite = find_favorite(&favorites, name)
            .ok_or_else(|| CloudError::FavoriteNotFound(name.to_string()))?;
        outcome.favorite_id = Some(favorite.id.clone());

        if let Some(level) = volume {
            self.cloud.set_group_volume(&group.id, level).await?;
        }

        self.cloud.load_favorite(&group.id, &favorite.id).await
    }
}
