//! Fire-and-forget playback queue.
//!
//! HTTP handlers hand playback intents to a single worker task and return
//! immediately. The worker runs intents one at a time, so two triggers
//! arriving together cannot interleave their SOAP calls on the speaker.

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::services::favorite_playback::{FavoriteOutcome, FavoritePlayer};
use crate::services::search_and_play::{SearchPlayResult, SearchPlayer, SearchTerms};
use crate::services::track_playback::{PlaybackOutcome, PlaybackRequest};

/// Something a trigger asked the relay to play.
#[derive(Debug, Clone)]
pub enum PlaybackIntent {
    /// A named Sonos favorite, via the cloud API.
    Favorite { name: String, volume: Option<u8> },
    /// Best search match, via the speaker.
    Search {
        terms: SearchTerms,
        continuous: bool,
        volume: Option<u8>,
    },
    /// A known track, via the speaker.
    Track(PlaybackRequest),
}

impl PlaybackIntent {
    fn kind(&self) -> &'static str {
        match self {
            Self::Favorite { .. } => "favorite",
            Self::Search { .. } => "search",
            Self::Track(_) => "track",
        }
    }
}

/// Result of running an intent.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum IntentResult {
    Favorite(FavoriteOutcome),
    Search(SearchPlayResult),
    Track(PlaybackOutcome),
}

impl IntentResult {
    #[must_use]
    pub fn success(&self) -> bool {
        match self {
            Self::Favorite(o) => o.success,
            Self::Search(r) => r.success,
            Self::Track(o) => o.success,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Favorite(o) => o.error.as_deref(),
            Self::Search(r) => r.error.as_deref(),
            Self::Track(o) => o.error.as_deref(),
        }
    }
}

/// The worker has stopped; nothing more can be queued.
#[derive(Debug, Clone, Copy, Error)]
#[error("Playback queue is closed")]
pub struct QueueClosed;

struct QueuedIntent {
    id: Uuid,
    intent: PlaybackIntent,
    reply: Option<oneshot::Sender<IntentResult>>,
}

/// Runs intents against the playback services.
#[derive(Clone)]
pub struct PlaybackExecutor {
    favorites: FavoritePlayer,
    search: SearchPlayer,
}

impl PlaybackExecutor {
    pub fn new(favorites: FavoritePlayer, search: SearchPlayer) -> Self {
        Self { favorites, search }
    }

    pub async fn execute(&self, intent: PlaybackIntent) -> IntentResult {
        match intent {
            PlaybackIntent::Favorite { name, volume } => {
                IntentResult::Favorite(self.favorites.play_favorite(&name, volume).await)
            }
            PlaybackIntent::Search {
                terms,
                continuous,
                volume,
            } => IntentResult::Search(self.search.search_and_play(terms, continuous, volume).await),
            PlaybackIntent::Track(request) => {
                self.search.pause_source().await;
                IntentResult::Track(self.search.player().play(&request).await)
            }
        }
    }
}

/// Sending half of the playback queue. Cheap to clone.
#[derive(Clone)]
pub struct PlaybackQueue {
    tx: mpsc::UnboundedSender<QueuedIntent>,
}

impl PlaybackQueue {
    /// Starts the worker. It stops when `cancel` fires or every queue handle
    /// is dropped.
    pub fn start(executor: PlaybackExecutor, cancel: CancellationToken) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(rx, executor, cancel));
        (Self { tx }, handle)
    }

    /// Queues `intent` and returns its id without waiting.
    pub fn enqueue(&self, intent: PlaybackIntent) -> Result<Uuid, QueueClosed> {
        let id = Uuid::new_v4();
        log::info!("[Queue] Accepted {} intent {}", intent.kind(), id);
        self.tx
            .send(QueuedIntent {
                id,
                intent,
                reply: None,
            })
            .map_err(|_| QueueClosed)?;
        Ok(id)
    }

    /// Queues `intent` and waits for its result. The intent still runs in
    /// queue order.
    pub async fn submit(&self, intent: PlaybackIntent) -> Result<IntentResult, QueueClosed> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(QueuedIntent {
                id: Uuid::new_v4(),
                intent,
                reply: Some(reply_tx),
            })
            .map_err(|_| QueueClosed)?;
        reply_rx.await.map_err(|_| QueueClosed)
    }
}

async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<QueuedIntent>,
    executor: PlaybackExecutor,
    cancel: CancellationToken,
) {
    log::debug!("[Queue] Worker started");
    loop {
        let job = tokio::select! {
            _ = cancel.cancelled() => break,
            job = rx.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let kind = job.intent.kind();
        log::debug!("[Queue] Running {} intent {}", kind, job.id);
        let result = executor.execute(job.intent).await;
        if result.success() {
            log::info!("[Queue] {} intent {} succeeded", kind, job.id);
        } else {
            log::warn!(
                "[Queue] {} intent {} failed: {}",
                kind,
                job.id,
                result.error().unwrap_or("unknown error")
            );
        }

        if let Some(reply) = job.reply {
            // Waiter may have gone away; the intent has run either way.
            let _ = reply.send(result);
        }
    }
    log::debug!("[Queue] Worker stopped");
}
