use std::sync::Arc;

use guessthecraft::{
    build_router,
    render::JsonGridRenderer,
    stats::{InMemoryStatsRepository, PostgresStatsRepository, StatsRepository},
    AppConfig, AppState, ChannelHub, RecipeCatalog, StatsAggregator,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "guessthecraft=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting GuessTheCraft game server");

    let config = AppConfig::from_env()?;
    let catalog = RecipeCatalog::load(&config.data_dir, config.images_dir.clone()).await?;

    let stats_repository: Arc<dyn StatsRepository> = match &config.database_url {
        Some(database_url) => {
            let pool = sqlx::PgPool::connect(database_url).await?;
            let repository = PostgresStatsRepository::new(pool);
            repository.ensure_schema().await?;
            info!("Stats stored in PostgreSQL");
            Arc::new(repository)
        }
        None => {
            info!("DATABASE_URL not set, stats kept in memory");
            Arc::new(InMemoryStatsRepository::new())
        }
    };

    let app_state = AppState::new(
        Arc::new(catalog),
        Arc::new(JsonGridRenderer::new()),
        ChannelHub::new(),
        Arc::new(StatsAggregator::new(stats_repository)),
        config.timing,
        config.default_duel_rounds,
    );

    let app = build_router(app_state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!(bind_addr = %config.bind_addr, "Server running");
    axum::serve(listener, app).await?;

    Ok(())
}
