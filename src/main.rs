use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use movie_bot::{
    api::{create_router, AppState},
    bot::{Controller, TelegramTransport},
    config::Config,
    db::{create_pool, DuplicatePolicy, FavoritesStore},
    services::{
        MetadataProvider, Renderer, ReqwestTransport, ResilientFetcher, RetryPolicy, TmdbProvider,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("movie_bot=info,tower_http=info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    let favorites = FavoritesStore::new(pool);

    let http = ReqwestTransport::new(config.request_timeout())?;
    let fetcher = ResilientFetcher::new(
        Arc::new(http),
        RetryPolicy {
            max_retries: config.max_retries,
            retry_delay: config.retry_delay(),
        },
    );
    let provider = TmdbProvider::new(
        fetcher,
        config.tmdb_api_key.clone(),
        config.tmdb_api_url.clone(),
        config.tmdb_language.clone(),
    );
    tracing::info!(provider = provider.name(), language = %config.tmdb_language, "Metadata provider ready");

    let transport = TelegramTransport::new(
        &config.telegram_api_url,
        &config.telegram_bot_token,
        config.request_timeout(),
    )?;

    let duplicate_policy = if config.favorites_allow_duplicates {
        DuplicatePolicy::InsertAlways
    } else {
        DuplicatePolicy::SkipExisting
    };

    let controller = Controller::new(
        Arc::new(provider),
        favorites,
        Arc::new(transport),
        Renderer::new(config.tmdb_image_url.clone()),
        duplicate_policy,
    );

    let state = AppState::new(Arc::new(controller), config.webhook_secret.clone());
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, ?duplicate_policy, "Movie bot listening");
    axum::serve(listener, app).await?;

    Ok(())
}
