//! Daily database backups with retention
//!
//! One automatic backup per calendar day, tracked by a marker file so a
//! restart on the same day does not back up twice. Automatic backups age
//! out after `retention_days`; manual backups are never cleaned up.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use shared::AppError;

const CONFIG_FILE: &str = "backup-config.json";
const MARKER_FILE: &str = "last-backup-date.txt";

pub const AUTO_PREFIX: &str = "tally_auto_";
pub const MANUAL_PREFIX: &str = "tally_backup_";

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupConfig {
    pub enabled: bool,
    pub retention_days: u32,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            retention_days: 14,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BackupInfo {
    pub filename: String,
    pub size: u64,
    pub created: String,
}

fn file_info(path: &Path) -> std::io::Result<BackupInfo> {
    let meta = fs::metadata(path)?;
    let created: DateTime<Local> = meta.modified()?.into();
    Ok(BackupInfo {
        filename: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
        size: meta.len(),
        created: created.to_rfc3339(),
    })
}

/// A backup filename must be a bare `.db` name, no path components
fn check_filename(name: &str) -> Result<(), AppError> {
    if name.is_empty()
        || !name.ends_with(".db")
        || name.contains('/')
        || name.contains('\\')
        || name.contains("..")
    {
        return Err(AppError::validation("invalid backup filename"));
    }
    Ok(())
}

pub struct BackupScheduler {
    data_dir: PathBuf,
    backup_dir: PathBuf,
    db_path: PathBuf,
    config: Mutex<BackupConfig>,
}

impl BackupScheduler {
    pub fn new(data_dir: PathBuf, backup_dir: PathBuf, db_path: PathBuf) -> std::io::Result<Self> {
        fs::create_dir_all(&data_dir)?;
        fs::create_dir_all(&backup_dir)?;

        let config_path = data_dir.join(CONFIG_FILE);
        let config = fs::read_to_string(&config_path)
            .ok()
            .and_then(|text| serde_json::from_str(&text).ok())
            .unwrap_or_default();

        Ok(Self {
            data_dir,
            backup_dir,
            db_path,
            config: Mutex::new(config),
        })
    }

    pub fn config(&self) -> BackupConfig {
        *self.config.lock().unwrap()
    }

    pub fn update_config(&self, new: BackupConfig) -> Result<BackupConfig, AppError> {
        if new.retention_days < 1 || new.retention_days > 365 {
            return Err(AppError::validation(
                "retentionDays must be between 1 and 365",
            ));
        }
        let text = serde_json::to_string_pretty(&new)
            .map_err(|e| AppError::internal(format!("serialize backup config: {e}")))?;
        fs::write(self.data_dir.join(CONFIG_FILE), text)?;
        *self.config.lock().unwrap() = new;
        Ok(new)
    }

    fn last_backup_date(&self) -> Option<String> {
        fs::read_to_string(self.data_dir.join(MARKER_FILE))
            .ok()
            .map(|s| s.trim().to_string())
    }

    fn record_backup_date(&self, date: &str) -> std::io::Result<()> {
        fs::write(self.data_dir.join(MARKER_FILE), date)
    }

    fn timestamp() -> String {
        Local::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string().replace('.', "-")
    }

    /// Copy the live database to `{prefix}{timestamp}.db`. A failed copy
    /// removes the partial target before returning the error.
    fn copy_db(&self, prefix: &str) -> Result<BackupInfo, AppError> {
        let filename = format!("{prefix}{}.db", Self::timestamp());
        let target = self.backup_dir.join(&filename);
        if let Err(e) = fs::copy(&self.db_path, &target) {
            let _ = fs::remove_file(&target);
            return Err(e.into());
        }
        Ok(file_info(&target)?)
    }

    /// Startup hook: back up once per day when enabled, then prune
    pub fn check_and_backup(&self) -> Result<(), AppError> {
        let config = self.config();
        if !config.enabled {
            tracing::info!("automatic backup disabled");
            return Ok(());
        }
        let today = Local::now().format("%Y-%m-%d").to_string();
        if self.last_backup_date().as_deref() == Some(today.as_str()) {
            tracing::info!("already backed up today");
            return Ok(());
        }
        if !self.db_path.exists() {
            tracing::warn!("database file missing, skipping backup");
            return Ok(());
        }

        let info = self.copy_db(AUTO_PREFIX)?;
        self.record_backup_date(&today)?;
        tracing::info!(file = %info.filename, "automatic backup created");
        self.clean_old_backups()?;
        Ok(())
    }

    /// Delete automatic backups older than the retention window.
    /// Manual backups are exempt.
    pub fn clean_old_backups(&self) -> Result<usize, AppError> {
        let retention = Duration::from_secs(u64::from(self.config().retention_days) * 24 * 60 * 60);
        let now = SystemTime::now();
        let mut deleted = 0;

        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !name.starts_with(AUTO_PREFIX) || !name.ends_with(".db") {
                continue;
            }
            let modified = entry.metadata()?.modified()?;
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age > retention {
                fs::remove_file(entry.path())?;
                tracing::info!(file = %name, "expired backup deleted");
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// All backups on disk, newest first
    pub fn list(&self) -> Result<Vec<BackupInfo>, AppError> {
        let mut backups = Vec::new();
        for entry in fs::read_dir(&self.backup_dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.ends_with(".db") {
                backups.push(file_info(&entry.path())?);
            }
        }
        backups.sort_by(|a, b| b.created.cmp(&a.created));
        Ok(backups)
    }

    pub fn create_manual(&self) -> Result<BackupInfo, AppError> {
        self.copy_db(MANUAL_PREFIX)
    }

    /// Overwrite the live database with a backup. The current database is
    /// snapshotted as an automatic backup first. Takes effect on restart.
    pub fn restore(&self, filename: &str) -> Result<(), AppError> {
        let source = self.backup_path(filename)?;
        self.copy_db(AUTO_PREFIX)?;
        fs::copy(&source, &self.db_path)?;
        tracing::info!(file = %filename, "backup restored, restart required");
        Ok(())
    }

    pub fn delete(&self, filename: &str) -> Result<(), AppError> {
        let path = self.backup_path(filename)?;
        fs::remove_file(path)?;
        Ok(())
    }

    /// Resolve a backup filename to its on-disk path, or NotFound
    pub fn backup_path(&self, filename: &str) -> Result<PathBuf, AppError> {
        check_filename(filename)?;
        let path = self.backup_dir.join(filename);
        if !path.is_file() {
            return Err(AppError::not_found("backup file not found"));
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn scheduler() -> (tempfile::TempDir, BackupScheduler) {
        let dir = tempfile::tempdir().unwrap();
        let data_dir = dir.path().join("data");
        let backup_dir = dir.path().join("backups");
        let db_path = data_dir.join("tally.db");
        fs::create_dir_all(&data_dir).unwrap();
        fs::write(&db_path, b"database bytes").unwrap();
        let s = BackupScheduler::new(data_dir, backup_dir, db_path).unwrap();
        (dir, s)
    }

    fn backdate(path: &Path, days: u64) {
        let when = SystemTime::now() - Duration::from_secs(days * 24 * 60 * 60);
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(when)
            .unwrap();
    }

    #[test]
    fn first_run_creates_one_backup_and_marker() {
        let (_dir, s) = scheduler();
        s.check_and_backup().unwrap();
        let backups = s.list().unwrap();
        assert_eq!(backups.len(), 1);
        assert!(backups[0].filename.starts_with(AUTO_PREFIX));

        // same day: no second backup
        s.check_and_backup().unwrap();
        assert_eq!(s.list().unwrap().len(), 1);
    }

    #[test]
    fn disabled_config_skips_backup() {
        let (_dir, s) = scheduler();
        s.update_config(BackupConfig {
            enabled: false,
            retention_days: 14,
        })
        .unwrap();
        s.check_and_backup().unwrap();
        assert!(s.list().unwrap().is_empty());
    }

    #[test]
    fn retention_bounds_rejected() {
        let (_dir, s) = scheduler();
        for days in [0, 366] {
            let err = s
                .update_config(BackupConfig {
                    enabled: true,
                    retention_days: days,
                })
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[test]
    fn config_survives_reload() {
        let (dir, s) = scheduler();
        s.update_config(BackupConfig {
            enabled: false,
            retention_days: 30,
        })
        .unwrap();

        let reloaded = BackupScheduler::new(
            dir.path().join("data"),
            dir.path().join("backups"),
            dir.path().join("data").join("tally.db"),
        )
        .unwrap();
        let config = reloaded.config();
        assert!(!config.enabled);
        assert_eq!(config.retention_days, 30);
    }

    #[test]
    fn cleanup_deletes_only_old_auto_backups() {
        let (dir, s) = scheduler();
        let backups = dir.path().join("backups");

        let old_auto = backups.join(format!("{AUTO_PREFIX}old.db"));
        let young_auto = backups.join(format!("{AUTO_PREFIX}young.db"));
        let old_manual = backups.join(format!("{MANUAL_PREFIX}old.db"));
        for p in [&old_auto, &young_auto, &old_manual] {
            fs::write(p, b"x").unwrap();
        }
        backdate(&old_auto, 15);
        backdate(&young_auto, 13);
        backdate(&old_manual, 200);

        assert_eq!(s.clean_old_backups().unwrap(), 1);
        assert!(!old_auto.exists());
        assert!(young_auto.exists());
        assert!(old_manual.exists());
    }

    #[test]
    fn restore_snapshots_current_db_first() {
        let (_dir, s) = scheduler();
        let backup = s.create_manual().unwrap();
        fs::write(&s.db_path, b"changed since backup").unwrap();

        s.restore(&backup.filename).unwrap();
        assert_eq!(fs::read(&s.db_path).unwrap(), b"database bytes");
        // safety snapshot of the pre-restore state exists
        let autos: Vec<_> = s
            .list()
            .unwrap()
            .into_iter()
            .filter(|b| b.filename.starts_with(AUTO_PREFIX))
            .collect();
        assert_eq!(autos.len(), 1);
    }

    #[test]
    fn restore_of_missing_file_is_not_found() {
        let (_dir, s) = scheduler();
        let err = s.restore("tally_backup_nope.db").unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn path_traversal_rejected() {
        let (_dir, s) = scheduler();
        for name in ["../tally.db", "a/b.db", "plain.txt", ""] {
            assert!(matches!(
                s.backup_path(name).unwrap_err(),
                AppError::Validation(_)
            ));
        }
    }
}
