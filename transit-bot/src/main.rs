use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use transit_bot::bot::Bot;
use transit_bot::catalog::{CatalogCache, CatalogClient, CatalogLoader, CatalogRegistry};
use transit_bot::config::BotConfig;
use transit_bot::feedback::FeedbackLog;
use transit_bot::live::HttpLiveSource;
use transit_bot::menu::Navigator;
use transit_bot::pending::PendingInputStore;
use transit_bot::store::UserStore;
use transit_bot::web::{AppState, create_router};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,transit_bot=debug")),
        )
        .init();

    let config = BotConfig::from_env().expect("Invalid configuration");
    if config.live.api_key.is_none() {
        warn!("TRANSIT_API_KEY not set, upstream calls may be rejected");
    }

    let client = CatalogClient::new(config.catalog.clone()).expect("Failed to create catalog client");
    let loader = CatalogLoader::new(client, CatalogCache::new(config.cache_config()));
    let catalogs = CatalogRegistry::new(config.build_rules());

    info!("Loading stop catalogs...");
    catalogs.warm_start(&loader).await;

    // Refresh every catalog on a fixed interval; failures keep the old one
    let refresh = catalogs.clone();
    let interval = config.refresh_interval;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.tick().await; // First tick is immediate, skip it
        loop {
            ticker.tick().await;
            refresh.refresh_all(&loader).await;
        }
    });

    let store = UserStore::open(&config.store_path)
        .await
        .expect("Failed to open user store");
    info!(path = %config.store_path.display(), "opened user store");

    let live = HttpLiveSource::new(config.live.clone()).expect("Failed to create live client");
    let nav = Navigator::new(
        catalogs,
        Arc::new(store),
        Arc::new(live),
        PendingInputStore::new(&config.pending),
    );
    let mut bot = Bot::new(nav, Arc::new(FeedbackLog::new(&config.feedback_dir)));
    if let Some(url) = &config.donate_url {
        bot = bot.with_donate_url(url);
    }
    let app = create_router(AppState::new(bot));

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .expect("Failed to bind");
    info!(addr = %config.bind_addr, "transit bot listening");
    info!("  GET  /health   - Health check");
    info!("  POST /updates  - Chat gateway updates");

    if let Err(e) = axum::serve(listener, app).await {
        error!(error = %e, "server error");
    }
}
