//! Server configuration, loaded from environment variables

use std::path::PathBuf;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP port
    pub port: u16,
    /// SQLite database file
    pub db_path: PathBuf,
    /// Directory holding the database, backup config and marker files
    pub data_dir: PathBuf,
    /// Directory holding timestamped database copies
    pub backup_dir: PathBuf,
    /// Directory holding processed upload images
    pub upload_dir: PathBuf,
    /// Maximum accepted upload size in bytes
    pub max_file_size: usize,
    /// Allowed CORS origin, `*` for any
    pub cors_origin: String,
    /// Public base URL override for uploaded-file links (reverse proxy setups)
    pub external_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, BoxError> {
        let data_dir = PathBuf::from(std::env::var("DATA_DIR").unwrap_or_else(|_| "data".into()));
        let db_path = std::env::var("DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("tally.db"));

        Ok(Self {
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            db_path,
            data_dir,
            backup_dir: PathBuf::from(
                std::env::var("BACKUP_DIR").unwrap_or_else(|_| "backups".into()),
            ),
            upload_dir: PathBuf::from(
                std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".into()),
            ),
            max_file_size: std::env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20 * 1024 * 1024),
            cors_origin: std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".into()),
            external_url: std::env::var("EXTERNAL_URL")
                .ok()
                .filter(|s| !s.is_empty())
                .map(|s| s.trim_end_matches('/').to_string()),
        })
    }

    /// Absolute URL for a server-relative path, honoring `EXTERNAL_URL`
    pub fn public_url(&self, path: &str) -> String {
        match &self.external_url {
            Some(base) => format!("{base}{path}"),
            None => path.to_string(),
        }
    }
}
