//! Background task that refreshes provider tokens on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::session::OAuthSession;

/// Periodically refreshes every authorized session.
pub struct TokenRefresher {
    sessions: Vec<Arc<OAuthSession>>,
    interval: Duration,
}

impl TokenRefresher {
    #[must_use]
    pub fn new(sessions: Vec<Arc<OAuthSession>>, interval: Duration) -> Self {
        Self { sessions, interval }
    }

    /// Runs one refresh round. Sessions without a token are skipped.
    pub async fn refresh_all(&self) {
        let due = self.sessions.iter().filter(|session| {
            let status = session.status();
            status.configured && status.authorized
        });
        let refreshes = due.map(|session| async move {
            if let Err(e) = session.refresh().await {
                log::warn!(
                    "[OAuth] Scheduled refresh of {} failed: {}",
                    session.provider(),
                    e
                );
            }
        });
        join_all(refreshes).await;
    }

    /// Spawns the refresh loop; it exits when `cancel` fires.
    pub fn spawn(self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // First tick completes immediately; tokens were just loaded.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = cancel.cancelled() => {
                        log::debug!("[OAuth] Token refresher stopped");
                        break;
                    }
                    _ = ticker.tick() => self.refresh_all().await,
                }
            }
        })
    }
}
