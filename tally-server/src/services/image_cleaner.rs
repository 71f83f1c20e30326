//! Orphaned upload cleanup
//!
//! Uploads referenced by a product photo are "used"; anything else in the
//! upload directory is fair game. Stats are read-only; clean deletes.

use std::collections::HashSet;
use std::path::Path;

use serde::Serialize;
use shared::AppError;
use sqlx::SqlitePool;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanerStats {
    pub total_images: usize,
    pub used_images: usize,
    pub unused_images: usize,
    pub unused_size: u64,
    pub unused_size_mb: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanReport {
    pub deleted_count: usize,
    pub deleted_size: u64,
    pub deleted_size_mb: String,
    pub unused_images: Vec<String>,
}

fn mb(bytes: u64) -> String {
    format!("{:.2}", bytes as f64 / (1024.0 * 1024.0))
}

/// Filenames referenced by product photos (basename of the stored URL)
async fn used_images(pool: &SqlitePool) -> sqlx::Result<HashSet<String>> {
    let photos: Vec<String> =
        sqlx::query_scalar("SELECT photo FROM products WHERE photo IS NOT NULL AND photo != ''")
            .fetch_all(pool)
            .await?;
    Ok(photos
        .iter()
        .filter_map(|p| p.rsplit('/').next())
        .map(str::to_owned)
        .collect())
}

fn uploaded_images(upload_dir: &Path) -> std::io::Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(upload_dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(files)
}

async fn unused(pool: &SqlitePool, upload_dir: &Path) -> Result<(usize, usize, Vec<String>), AppError> {
    let used = used_images(pool).await?;
    let uploaded = uploaded_images(upload_dir)?;
    let total = uploaded.len();
    let orphans: Vec<String> = uploaded
        .into_iter()
        .filter(|f| !used.contains(f))
        .collect();
    Ok((total, used.len(), orphans))
}

pub async fn stats(pool: &SqlitePool, upload_dir: &Path) -> Result<CleanerStats, AppError> {
    let (total, used, orphans) = unused(pool, upload_dir).await?;
    let unused_size: u64 = orphans
        .iter()
        .filter_map(|f| std::fs::metadata(upload_dir.join(f)).ok())
        .map(|m| m.len())
        .sum();
    Ok(CleanerStats {
        total_images: total,
        used_images: used,
        unused_images: orphans.len(),
        unused_size,
        unused_size_mb: mb(unused_size),
    })
}

pub async fn clean(pool: &SqlitePool, upload_dir: &Path) -> Result<CleanReport, AppError> {
    let (_, _, orphans) = unused(pool, upload_dir).await?;
    let mut deleted_count = 0;
    let mut deleted_size = 0;
    let mut deleted = Vec::new();

    for name in orphans {
        let path = upload_dir.join(&name);
        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if std::fs::remove_file(&path).is_ok() {
            deleted_count += 1;
            deleted_size += size;
            deleted.push(name);
        }
    }

    tracing::info!(count = deleted_count, bytes = deleted_size, "orphaned uploads removed");
    Ok(CleanReport {
        deleted_count,
        deleted_size,
        deleted_size_mb: mb(deleted_size),
        unused_images: deleted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MIGRATOR;
    use sqlx::sqlite::SqlitePoolOptions;

    async fn pool() -> SqlitePool {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        MIGRATOR.run(&pool).await.unwrap();
        pool
    }

    #[tokio::test]
    async fn clean_removes_only_unreferenced_files() {
        let pool = pool().await;
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("product_used.jpg"), b"used").unwrap();
        std::fs::write(dir.path().join("product_orphan.jpg"), b"orphan").unwrap();

        sqlx::query("INSERT INTO products (name, photo) VALUES ('rope', '/uploads/product_used.jpg')")
            .execute(&pool)
            .await
            .unwrap();

        let before = stats(&pool, dir.path()).await.unwrap();
        assert_eq!(before.total_images, 2);
        assert_eq!(before.unused_images, 1);

        let report = clean(&pool, dir.path()).await.unwrap();
        assert_eq!(report.deleted_count, 1);
        assert_eq!(report.unused_images, vec!["product_orphan.jpg".to_string()]);
        assert!(dir.path().join("product_used.jpg").exists());
        assert!(!dir.path().join("product_orphan.jpg").exists());
    }
}
