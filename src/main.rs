use std::sync::Arc;

use cinematch_api::{
    api::{create_router, AppState, RequestLimits},
    config::{CacheBackend, Config},
    db::{create_pool, create_redis_client, run_migrations, PgCatalog, RedisSimilarityCache},
    recommender::ItemBasedRecommender,
    services::{FileSimilarityCache, SimilarityCache},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("cinematch_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    if config.run_migrations {
        run_migrations(&pool).await?;
    }
    let catalog = Arc::new(PgCatalog::new(pool));

    let recommender = match similarity_cache(&config)? {
        Some(cache) => ItemBasedRecommender::with_cache(cache),
        None => ItemBasedRecommender::new(),
    };
    let recommender = Arc::new(recommender);

    recommender.build(catalog.as_ref(), catalog.as_ref()).await?;

    let state = AppState::new(recommender, catalog).with_limits(RequestLimits::from(&config));
    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn similarity_cache(config: &Config) -> anyhow::Result<Option<Arc<dyn SimilarityCache>>> {
    let cache: Arc<dyn SimilarityCache> = match config.similarity_cache {
        CacheBackend::Disabled => return Ok(None),
        CacheBackend::File => Arc::new(FileSimilarityCache::new(&config.similarity_cache_path)),
        CacheBackend::Redis => Arc::new(RedisSimilarityCache::new(
            create_redis_client(&config.redis_url)?,
            config.similarity_cache_key.clone(),
            config.similarity_cache_ttl_secs,
        )),
    };

    tracing::info!(backend = cache.name(), "Similarity cache enabled");
    Ok(Some(cache))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
}
