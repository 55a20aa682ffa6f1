use std::sync::Arc;

use reelmatch_api::{
    config::Config,
    db::DatasetCache,
    routes::{create_router, AppState},
    services::{
        PlaceholderPosterResolver, PosterResolver, PosterService, Recommender, TmdbPosterResolver,
    },
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("reelmatch_api=info,tower_http=info")),
        )
        .init();

    // No dataset, no service
    let dataset = DatasetCache::new(&config.snapshot_path)
        .get()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load snapshot: {}", e))?;

    let resolver: Arc<dyn PosterResolver> = match config.tmdb_api_key() {
        Some(api_key) => Arc::new(TmdbPosterResolver::new(
            api_key.to_string(),
            config.tmdb_api_url.clone(),
            config.poster_base_url.clone(),
            config.poster_timeout(),
            config.poster_retries(),
        )?),
        None => {
            tracing::warn!("TMDB_API_KEY not set; serving placeholder posters");
            Arc::new(PlaceholderPosterResolver)
        }
    };

    let state = Arc::new(AppState {
        recommender: Recommender::with_threshold(dataset, config.match_threshold),
        posters: PosterService::new(
            resolver,
            &config.fallback_poster_url,
            config.poster_lookup_budget(),
        ),
        default_recommendations: config.default_recommendations,
        max_recommendations: config.max_recommendations,
    });

    let app = create_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server running");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutdown signal received");
}
