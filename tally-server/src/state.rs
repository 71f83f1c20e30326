//! Application state

use std::sync::Arc;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::Config;
use crate::db;
use crate::services::backup::BackupScheduler;
use crate::services::upload_session::UploadSessionStore;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Shared application state
///
/// All process-wide mutable state (session map, backup config/marker)
/// lives behind explicit handles constructed here, not ambient globals.
#[derive(Clone)]
pub struct AppState {
    /// SQLite connection pool (single connection; SQLite is single-writer)
    pub pool: SqlitePool,
    /// In-memory upload sessions for cross-device photo capture
    pub sessions: UploadSessionStore,
    /// Daily backup scheduler and its persisted config
    pub backups: Arc<BackupScheduler>,
    pub config: Arc<Config>,
}

impl AppState {
    pub async fn new(config: Config) -> Result<Self, BoxError> {
        std::fs::create_dir_all(&config.data_dir)?;
        std::fs::create_dir_all(&config.upload_dir)?;

        let options = SqliteConnectOptions::new()
            .filename(&config.db_path)
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        db::MIGRATOR.run(&pool).await?;
        tracing::info!(db = %config.db_path.display(), "database ready");

        let backups = Arc::new(BackupScheduler::new(
            config.data_dir.clone(),
            config.backup_dir.clone(),
            config.db_path.clone(),
        )?);

        Ok(Self {
            pool,
            sessions: UploadSessionStore::new(),
            backups,
            config: Arc::new(config),
        })
    }
}
