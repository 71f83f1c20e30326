use tally_server::api;
use tally_server::config::Config;
use tally_server::services::upload_session::SWEEP_INTERVAL;
use tally_server::state::AppState;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tally_server=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;
    let port = config.port;
    let state = AppState::new(config).await?;

    // Daily backup check; a failure here should not stop the server
    {
        let backups = state.backups.clone();
        if let Err(e) = tokio::task::spawn_blocking(move || backups.check_and_backup()).await? {
            tracing::error!("startup backup failed: {e}");
        }
    }

    // Periodic upload-session sweep
    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(SWEEP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = sessions.sweep().await;
            if removed > 0 {
                tracing::info!(removed, "expired upload sessions swept");
            }
        }
    });

    let app = api::router(state);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("tally-server listening on {addr}");
    axum::serve(listener, app).await?;

    Ok(())
}
