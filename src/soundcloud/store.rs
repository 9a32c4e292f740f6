use std::path::PathBuf;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::token::Credential;

/// Durable tier beneath the in-memory credential cache. Advisory only: load
/// and save failures degrade to "absent" / no-op and never reach callers.
#[async_trait]
pub trait TokenStore: Send + Sync {
    async fn load(&self) -> Option<Credential>;
    async fn save(&self, credential: &Credential);
}

/// Single serialized JSON record at a scratch path. Survives process
/// restarts in environments that lose memory but share a filesystem.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Option<Credential> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) => {
                debug!("Token store not readable at {}: {}", self.path.display(), e);
                return None;
            }
        };
        match serde_json::from_str::<Credential>(&raw) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warn!("Discarding corrupt token store record: {}", e);
                None
            }
        }
    }

    async fn save(&self, credential: &Credential) {
        let raw = match serde_json::to_string(credential) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("Failed to serialize token record: {}", e);
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&self.path, raw).await {
            warn!("Failed to persist token to {}: {}", self.path.display(), e);
        }
    }
}
