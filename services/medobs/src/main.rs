use anyhow::Context as _;
use sea_orm::Database;
use tracing::info;

use medobs::config::MedobsConfig;
use medobs::infra::storage::LocalMediaStorage;
use medobs::router::build_router;
use medobs::state::AppState;
use medobs_core::config::Config;
use medobs_core::tracing::init_tracing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = MedobsConfig::from_env().context("failed to load configuration")?;

    let db = Database::connect(&config.database_url)
        .await
        .context("failed to connect to database")?;

    let state = AppState {
        db,
        storage: LocalMediaStorage::new(&config.media_root),
        max_upload_bytes: config.max_upload_bytes,
    };

    let router = build_router(state);
    let http_addr = format!("0.0.0.0:{}", config.medobs_port);
    let listener = tokio::net::TcpListener::bind(&http_addr)
        .await
        .with_context(|| format!("failed to bind {http_addr}"))?;

    info!(media_root = %config.media_root, "medobs service listening on {http_addr}");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
