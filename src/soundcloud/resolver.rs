use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::common::HttpClient;
use crate::config::SoundCloudConfig;

use super::error::ResolveError;
use super::token::TokenKeeper;

/// Rendition keys in selection order: adaptive opus, adaptive mp3,
/// progressive mp3, then the short preview as a last resort. Adaptive formats
/// start faster and adapt to network conditions; the preview is a degraded
/// but non-empty experience.
const RENDITION_PRIORITY: [&str; 4] = [
    "hls_opus_64_url",
    "hls_mp3_128_url",
    "http_mp3_128_url",
    "preview_mp3_128_url",
];

/// Final playable CDN URL. Short-lived upstream-side; callers must resolve
/// again for every playback attempt instead of caching it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedStream {
    pub stream_url: String,
}

/// Turns a track identifier into a playable URL, or a precise failure reason.
pub struct StreamResolver {
    client: reqwest::Client,
    /// Separate client with redirects disabled: the final hop's 3xx target is
    /// the answer, and following it would fetch the audio payload itself.
    final_hop_client: reqwest::Client,
    keeper: TokenKeeper,
    api_base: String,
    urn_re: Regex,
}

impl StreamResolver {
    pub fn new(
        client: reqwest::Client,
        keeper: TokenKeeper,
        config: &SoundCloudConfig,
    ) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client,
            final_hop_client: HttpClient::new_no_redirect()?,
            keeper,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            urn_re: Regex::new(r"^[A-Za-z0-9_-]+:[A-Za-z0-9_-]+:(\d+)$").unwrap(),
        })
    }

    pub async fn resolve(&self, id_or_urn: &str) -> Result<ResolvedStream, ResolveError> {
        let id = self.canonical_id(id_or_urn);
        let token = self.keeper.token().await?;

        let renditions = self.fetch_renditions(&id, &token).await?;
        let (kind, lookup_url) =
            Self::select_rendition(&renditions).ok_or(ResolveError::NoPlayableRendition)?;
        debug!("SoundCloud: Selected rendition {} for track {}", kind, id);

        let stream_url = self.fetch_final_url(&lookup_url, &token).await?;
        Ok(ResolvedStream { stream_url })
    }

    /// Reduce a raw id or `namespace:kind:number` urn to the numeric track
    /// id. Anything else passes through untouched; the upstream response is
    /// the authoritative verdict on whether it was usable.
    fn canonical_id(&self, input: &str) -> String {
        let input = input.trim();
        if let Some(caps) = self.urn_re.captures(input) {
            return caps[1].to_string();
        }
        if input.is_empty() || !input.chars().all(|c| c.is_ascii_digit()) {
            warn!(
                "SoundCloud: Track id '{}' is neither numeric nor a urn, passing through as-is",
                input
            );
        }
        input.to_string()
    }

    async fn fetch_renditions(&self, id: &str, token: &str) -> Result<Value, ResolveError> {
        let url = format!("{}/tracks/{}/streams", self.api_base, id);
        debug!("SoundCloud: Listing renditions: {}", url);

        let resp = self
            .client
            .get(&url)
            .header("Authorization", format!("OAuth {}", token))
            .send()
            .await
            .map_err(|e| ResolveError::Transport(e.to_string()))?;

        let status = resp.status();
        match status.as_u16() {
            404 => return Err(ResolveError::NotFound),
            401 | 403 => return Err(ResolveError::Forbidden),
            _ if !status.is_success() => {
                let body = resp.text().await.unwrap_or_default();
                return Err(ResolveError::Upstream {
                    status: status.as_u16(),
                    body,
                });
            }
            _ => {}
        }

        resp.json::<Value>().await.map_err(|e| ResolveError::Upstream {
            status: status.as_u16(),
            body: format!("unparseable rendition listing: {}", e),
        })
    }

    /// Pick the best rendition by fixed priority. Returns the winning key and
    /// its resolver URL; `None` when nothing recognizable is present.
    fn select_rendition(renditions: &Value) -> Option<(&'static str, String)> {
        for key in RENDITION_PRIORITY {
            if let Some(url) = renditions.get(key).and_then(|v| v.as_str()) {
                return Some((key, url.to_string()));
            }
        }
        None
    }

    /// Fetch the chosen rendition's resolver URL without following redirects.
    /// The final URL arrives either as a JSON `url` field or as a 3xx
    /// `Location` header.
    async fn fetch_final_url(&self, lookup_url: &str, token: &str) -> Result<String, ResolveError> {
        let resp = self
            .final_hop_client
            .get(lookup_url)
            .header("Authorization", format!("OAuth {}", token))
            .send()
            .await
            .map_err(|e| ResolveError::Transport(e.to_string()))?;

        let status = resp.status();

        if status.is_redirection() {
            return resp
                .headers()
                .get(reqwest::header::LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    ResolveError::Resolution("redirect without a Location header".to_string())
                });
        }

        if status.is_success() {
            let payload: Value = resp.json().await.map_err(|e| {
                ResolveError::Resolution(format!("unparseable resolver response: {}", e))
            })?;
            return payload
                .get("url")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string())
                .ok_or_else(|| {
                    ResolveError::Resolution("no url field in resolver response".to_string())
                });
        }

        let body = resp.text().await.unwrap_or_default();
        Err(ResolveError::Upstream {
            status: status.as_u16(),
            body,
        })
    }
}
