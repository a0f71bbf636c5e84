use slot_log::{router, AppConfig, AppState, RecordStore, SettingsStore};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = AppConfig::from_env();
    let settings_store = SettingsStore::new(&config.settings_path);
    let settings = settings_store.load().await?;
    info!(
        settings = %config.settings_path.display(),
        records = %config.records_path.display(),
        shops = settings.shops.len(),
        "settings loaded"
    );

    let state = AppState::new(settings_store, settings, RecordStore::new(&config.records_path));
    let app = router(state);

    let addr = config.addr();
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutting down");
    }
}
