use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use tracing::{debug, error};

use crate::common::GatewayError;
use crate::server::AppState;
use crate::soundcloud::ResolveError;

/// GET /v1/streams/{id}
pub async fn get_stream(
    Path(id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    debug!("Resolve stream: '{}'", id);

    match state.resolver.resolve(&id).await {
        Ok(stream) => (StatusCode::OK, Json(stream)).into_response(),
        Err(e) => {
            let path = format!("/v1/streams/{}", id);
            let (status, payload) = match &e {
                ResolveError::NotFound => (
                    StatusCode::NOT_FOUND,
                    GatewayError::not_found("Track not found", path),
                ),
                ResolveError::Forbidden => (
                    StatusCode::FORBIDDEN,
                    GatewayError::forbidden("This track can't be played", path),
                ),
                ResolveError::NoPlayableRendition => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    GatewayError::unprocessable("This track offers no playable format", path),
                ),
                // Auth, upstream and resolution failures are not the
                // caller's fault.
                _ => {
                    error!("Stream resolution failed for '{}': {}", id, e);
                    (
                        StatusCode::BAD_GATEWAY,
                        GatewayError::bad_gateway("Service unavailable, try again", path),
                    )
                }
            };
            (status, Json(payload)).into_response()
        }
    }
}

/// GET /version
pub async fn get_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use axum::{Router, http::header, routing::get};
    use serde_json::Value;

    use crate::config::SoundCloudConfig;
    use crate::server::AppState;
    use crate::soundcloud::{StreamResolver, TokenKeeper, testing};
    use crate::transport::http_server;

    use super::*;

    async fn spawn_gateway(upstream_base: &str) -> String {
        let config = SoundCloudConfig {
            access_token: Some("t".to_string()),
            api_base: upstream_base.to_string(),
            ..SoundCloudConfig::default()
        };
        let client = crate::common::HttpClient::new().unwrap();
        let keeper = TokenKeeper::new(client.clone(), config.clone(), None);
        let resolver = StreamResolver::new(client, keeper, &config).unwrap();
        let state = Arc::new(AppState { resolver });
        testing::serve(http_server::router(state)).await
    }

    #[tokio::test]
    async fn success_serves_camel_case_stream_url() {
        let upstream = testing::serve_with(|base| {
            let body = format!(r#"{{ "http_mp3_128_url": "{}/r" }}"#, base);
            Router::new()
                .route(
                    "/tracks/{id}/streams",
                    get(move || {
                        let body = body.clone();
                        async move { ([(header::CONTENT_TYPE, "application/json")], body) }
                    }),
                )
                .route(
                    "/r",
                    get(|| async { Json(serde_json::json!({ "url": "https://cdn.example/x" })) }),
                )
        })
        .await;
        let gateway = spawn_gateway(&upstream).await;

        let resp = reqwest::get(format!("{}/v1/streams/123", gateway))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 200);
        let payload: Value = resp.json().await.unwrap();
        assert_eq!(
            payload.get("streamUrl").and_then(|v| v.as_str()),
            Some("https://cdn.example/x")
        );
    }

    #[tokio::test]
    async fn unknown_track_maps_to_404_payload() {
        let upstream = testing::serve(Router::new().route(
            "/tracks/{id}/streams",
            get(|| async { StatusCode::NOT_FOUND }),
        ))
        .await;
        let gateway = spawn_gateway(&upstream).await;

        let resp = reqwest::get(format!("{}/v1/streams/999", gateway))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 404);
        let payload: Value = resp.json().await.unwrap();
        assert_eq!(
            payload.get("error").and_then(|v| v.as_str()),
            Some("Not Found")
        );
        assert_eq!(
            payload.get("path").and_then(|v| v.as_str()),
            Some("/v1/streams/999")
        );
    }

    #[tokio::test]
    async fn upstream_failures_map_to_bad_gateway() {
        let upstream = testing::serve(Router::new().route(
            "/tracks/{id}/streams",
            get(|| async { StatusCode::INTERNAL_SERVER_ERROR }),
        ))
        .await;
        let gateway = spawn_gateway(&upstream).await;

        let resp = reqwest::get(format!("{}/v1/streams/1", gateway))
            .await
            .unwrap();
        assert_eq!(resp.status().as_u16(), 502);
    }
}
