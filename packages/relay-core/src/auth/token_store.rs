//! Token persistence in the data directory.
//!
//! Tokens survive restarts in `tokens.json`; without a data directory they
//! live in memory only.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use super::credentials::AccessToken;
use super::Provider;

const TOKENS_FILE: &str = "tokens.json";
const TOKENS_TEMP_FILE: &str = "tokens.json.tmp";

/// Global mutex serializing token file read-modify-write cycles, since the
/// Spotify and Sonos sessions refresh independently.
static TOKENS_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn tokens_lock() -> &'static Mutex<()> {
    TOKENS_LOCK.get_or_init(|| Mutex::new(()))
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
struct StoredTokens {
    spotify: Option<AccessToken>,
    sonos: Option<AccessToken>,
}

impl StoredTokens {
    fn slot(&mut self, provider: Provider) -> &mut Option<AccessToken> {
        match provider {
            Provider::Spotify => &mut self.spotify,
            Provider::Sonos => &mut self.sonos,
        }
    }

    fn read(dir: &Path) -> Self {
        match std::fs::read_to_string(dir.join(TOKENS_FILE)) {
            Ok(contents) => serde_json::from_str(&contents).unwrap_or_else(|e| {
                log::warn!("[OAuth] Ignoring unreadable {}: {}", TOKENS_FILE, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Uses atomic write (temp file + rename) to prevent corruption on crash.
    fn write(&self, dir: &Path) -> std::io::Result<()> {
        std::fs::create_dir_all(dir)?;
        let temp_path = dir.join(TOKENS_TEMP_FILE);
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(&temp_path, contents)?;
        std::fs::rename(&temp_path, dir.join(TOKENS_FILE))
    }
}

/// Reads and writes provider tokens.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    dir: Option<PathBuf>,
}

impl TokenStore {
    /// Store backed by `dir`, or memory-only when `None`.
    #[must_use]
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.dir.is_some()
    }

    /// Loads the persisted token for `provider`.
    #[must_use]
    pub fn load(&self, provider: Provider) -> Option<AccessToken> {
        let dir = self.dir.as_deref()?;
        let _guard = tokens_lock().lock();
        StoredTokens::read(dir).slot(provider).take()
    }

    /// Persists `token` for `provider`, keeping the other provider's entry.
    pub fn save(&self, provider: Provider, token: &AccessToken) -> std::io::Result<()> {
        let Some(dir) = self.dir.as_deref() else {
            return Ok(());
        };
        let _guard = tokens_lock().lock();
        let mut tokens = StoredTokens::read(dir);
        *tokens.slot(provider) = Some(token.clone());
        tokens.write(dir)
    }
}
