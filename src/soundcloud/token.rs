use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::config::SoundCloudConfig;

use super::error::AuthError;
use super::store::TokenStore;

/// Subtracted from the upstream-reported lifetime so a token is never handed
/// out moments before it expires mid-use.
const EXPIRY_SAFETY_MARGIN_MS: u64 = 300_000;

/// Lifetime assigned to a statically configured token, which carries no
/// upstream expiry of its own.
const STATIC_TOKEN_TTL_MS: u64 = 600_000;

pub(crate) fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// One cached bearer token. Replaced wholesale on refresh, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    pub expires_at_ms: u64,
}

impl Credential {
    pub fn is_valid(&self) -> bool {
        now_ms() < self.expires_at_ms
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

type RefreshFuture = Shared<BoxFuture<'static, Result<Credential, AuthError>>>;

struct TokenState {
    current: Option<Credential>,
    in_flight: Option<RefreshFuture>,
}

struct Inner {
    client: reqwest::Client,
    config: SoundCloudConfig,
    store: Option<Arc<dyn TokenStore>>,
    state: Mutex<TokenState>,
}

/// Produces a valid bearer token for upstream calls: in-memory fast path,
/// secondary-store warm-restart path, then a single-flight refresh shared by
/// every concurrent caller.
#[derive(Clone)]
pub struct TokenKeeper {
    inner: Arc<Inner>,
}

impl TokenKeeper {
    pub fn new(
        client: reqwest::Client,
        config: SoundCloudConfig,
        store: Option<Arc<dyn TokenStore>>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                config,
                store,
                state: Mutex::new(TokenState {
                    current: None,
                    in_flight: None,
                }),
            }),
        }
    }

    /// Returns a currently valid bearer token, refreshing at most once no
    /// matter how many callers arrive concurrently.
    pub async fn token(&self) -> Result<String, AuthError> {
        {
            let state = self.inner.state.lock().await;

            if let Some(credential) = &state.current {
                if credential.is_valid() {
                    return Ok(credential.access_token.clone());
                }
            }

            if let Some(pending) = state.in_flight.clone() {
                drop(state);
                return pending.await.map(|credential| credential.access_token);
            }
        }

        // Warm-restart path: a previous life of this process (or a sibling
        // instance sharing the scratch area) may have left a usable token
        // behind. Read with the lock released so fast-path callers never
        // queue behind a slow store.
        let stored = match &self.inner.store {
            Some(store) => store.load().await.filter(Credential::is_valid),
            None => None,
        };

        let refresh = {
            let mut state = self.inner.state.lock().await;

            // Another caller may have installed a token or started a refresh
            // while the store was being read.
            if let Some(credential) = &state.current {
                if credential.is_valid() {
                    return Ok(credential.access_token.clone());
                }
            }

            if let Some(pending) = state.in_flight.clone() {
                pending
            } else if let Some(credential) = stored {
                debug!(
                    "Adopting token from secondary store (expires_at_ms={})",
                    credential.expires_at_ms
                );
                let token = credential.access_token.clone();
                state.current = Some(credential);
                return Ok(token);
            } else {
                let refresh = Self::start_refresh(self.inner.clone());
                state.in_flight = Some(refresh.clone());
                refresh
            }
        };

        refresh.await.map(|credential| credential.access_token)
    }

    /// Builds the shared refresh future. Its body runs once; every waiter
    /// polls the same `Shared` handle and receives a clone of the outcome.
    fn start_refresh(inner: Arc<Inner>) -> RefreshFuture {
        async move {
            let outcome = Self::exchange(&inner).await;

            {
                let mut state = inner.state.lock().await;
                state.in_flight = None;
                match &outcome {
                    Ok(credential) => state.current = Some(credential.clone()),
                    Err(e) => warn!("Token refresh failed: {}", e),
                }
            }

            // Best-effort durability; failures are logged inside the store.
            if let (Ok(credential), Some(store)) = (&outcome, &inner.store) {
                store.save(credential).await;
            }

            outcome
        }
        .boxed()
        .shared()
    }

    async fn exchange(inner: &Inner) -> Result<Credential, AuthError> {
        if let Some(token) = &inner.config.access_token {
            debug!("Using statically configured access token");
            return Ok(Credential {
                access_token: token.clone(),
                expires_at_ms: now_ms() + STATIC_TOKEN_TTL_MS,
            });
        }

        let (client_id, client_secret) =
            match (&inner.config.client_id, &inner.config.client_secret) {
                (Some(id), Some(secret)) => (id, secret),
                _ => return Err(AuthError::MissingCredentials),
            };

        debug!("Exchanging client credentials at {}", inner.config.token_url);
        let resp = inner
            .client
            .post(&inner.config.token_url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| AuthError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Exchange {
                status: status.as_u16(),
                body,
            });
        }

        let payload: TokenResponse = resp
            .json()
            .await
            .map_err(|e| AuthError::Malformed(e.to_string()))?;

        let lifetime_ms = payload
            .expires_in
            .saturating_mul(1000)
            .saturating_sub(EXPIRY_SAFETY_MARGIN_MS);
        let credential = Credential {
            access_token: payload.access_token,
            expires_at_ms: now_ms() + lifetime_ms,
        };
        debug!(
            "Obtained fresh token (expires_at_ms={})",
            credential.expires_at_ms
        );
        Ok(credential)
    }

    #[cfg(test)]
    pub(crate) async fn seed(&self, credential: Credential) {
        self.inner.state.lock().await.current = Some(credential);
    }

    #[cfg(test)]
    pub(crate) async fn current(&self) -> Option<Credential> {
        self.inner.state.lock().await.current.clone()
    }
}
