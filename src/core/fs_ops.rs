// src/core/fs_ops.rs
//! File system helpers shared by the fetcher and the exporters

use crate::app_log;
use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            app_log!(info, "Created directory: {}", path.display());
        }
        Ok(())
    }

    pub async fn read_file_safe(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Write `content`, creating parent directories as needed.
    pub async fn write_file_safe(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;

        app_log!(info, "Written file: {}", path.display());
        Ok(())
    }

    pub fn normalize_path(base: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            base.join(relative)
        }
    }

    /// Lowercase, dash-separated, filesystem-safe form of free text.
    pub fn slug(value: &str) -> String {
        value
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-")
    }

    /// `YYYYMMDD_HHMMSS` stamp used in artifact file names.
    pub fn run_timestamp(at: DateTime<Local>) -> String {
        at.format("%Y%m%d_%H%M%S").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_slug() {
        assert_eq!(FsOps::slug("  Android Developer "), "android-developer");
        assert_eq!(FsOps::slug("C++ / Qt"), "c-qt");
        assert_eq!(FsOps::slug("São Paulo"), "são-paulo");
        assert_eq!(FsOps::slug(""), "");
    }

    #[test]
    fn test_run_timestamp_format() {
        let at = Local.with_ymd_and_hms(2025, 3, 1, 9, 5, 7).unwrap();
        assert_eq!(FsOps::run_timestamp(at), "20250301_090507");
    }

    #[test]
    fn test_normalize_path() {
        let base = Path::new("/srv/job-hunter");
        assert_eq!(
            FsOps::normalize_path(base, Path::new("results")),
            PathBuf::from("/srv/job-hunter/results")
        );
        assert_eq!(
            FsOps::normalize_path(base, Path::new("/tmp/x")),
            PathBuf::from("/tmp/x")
        );
    }

    #[tokio::test]
    async fn test_write_file_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/deeper/out.json");
        FsOps::write_file_safe(&path, "[]").await.unwrap();
        assert_eq!(FsOps::read_file_safe(&path).await.unwrap(), "[]");
    }
}
