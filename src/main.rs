use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;
use tunegate::common::{AnyResult, HttpClient};
use tunegate::config::Config;
use tunegate::server::AppState;
use tunegate::soundcloud::{FileTokenStore, StreamResolver, TokenKeeper, TokenStore};
use tunegate::transport;

#[tokio::main]
async fn main() -> AnyResult<()> {
    let config = Config::load()?;

    let default_level = config
        .logging
        .as_ref()
        .and_then(|l| l.level.clone())
        .unwrap_or_else(|| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let client = HttpClient::new()?;
    let store: Option<Arc<dyn TokenStore>> = config
        .soundcloud
        .token_cache_path
        .as_ref()
        .map(|path| Arc::new(FileTokenStore::new(path.clone())) as Arc<dyn TokenStore>);
    let keeper = TokenKeeper::new(client.clone(), config.soundcloud.clone(), store);
    let resolver = StreamResolver::new(client, keeper, &config.soundcloud)?;

    let state = Arc::new(AppState { resolver });
    let app = transport::http_server::router(state);

    let address: SocketAddr = format!("{}:{}", config.server.host, config.server.port).parse()?;
    info!("Tunegate listening on {}", address);

    let listener = tokio::net::TcpListener::bind(address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
