// src/core/config_manager.rs
//! Runtime settings from the environment (after `.env` is loaded)

use crate::core::FsOps;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

pub const DEFAULT_JSEARCH_URL: &str = "https://jsearch.p.rapidapi.com";
pub const DEFAULT_PAGES_PER_REGION: u32 = 1;
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ConfigManager {
    pub paths: PathConfig,
    pub service: ServiceConfig,
}

#[derive(Debug, Clone)]
pub struct PathConfig {
    pub base_dir: PathBuf,
    pub debug_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub api_response_dir: PathBuf,
    pub results_dir: PathBuf,
    pub mock_file: PathBuf,
    pub log_file: PathBuf,
    pub default_preferences: PathBuf,
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// `None` means no live source; the mock file is used instead.
    pub api_key: Option<String>,
    pub api_url: String,
    pub timeout_seconds: u64,
    pub pages_per_region: u32,
    pub mock_filter_location: bool,
}

impl ConfigManager {
    pub fn load() -> Result<Self> {
        let base_dir = Self::base_dir_from_env()?;
        Ok(Self::load_from(&base_dir))
    }

    /// `JOB_HUNTER_HOME`, else the current directory.
    pub fn base_dir_from_env() -> Result<PathBuf> {
        match std::env::var("JOB_HUNTER_HOME") {
            Ok(home) if !home.trim().is_empty() => Ok(PathBuf::from(home.trim())),
            _ => std::env::current_dir().context("Failed to get current directory"),
        }
    }

    /// Layout under `base_dir` plus the service settings from the environment.
    pub fn load_from(base_dir: &Path) -> Self {
        info!("Loading configuration with base directory: {}", base_dir.display());

        let mut config = Self::from_base_dir(base_dir);
        if let Some(mock) = env_non_empty("JOB_HUNTER_MOCK_FILE") {
            config.paths.mock_file = FsOps::normalize_path(base_dir, Path::new(&mock));
        }
        config.service = Self::load_service();
        config
    }

    /// Log file location for `base_dir`, known before anything else is loaded.
    pub fn log_file_for(base_dir: &Path) -> PathBuf {
        Self::from_base_dir(base_dir).paths.log_file
    }

    /// Layout under `base_dir` with default service settings and no API key.
    pub fn from_base_dir(base_dir: &Path) -> Self {
        let debug_dir = base_dir.join("debug");
        Self {
            paths: PathConfig {
                base_dir: base_dir.to_path_buf(),
                cache_dir: debug_dir.join("cache"),
                api_response_dir: debug_dir.join("api-response"),
                log_file: debug_dir.join("job-hunter.log"),
                debug_dir,
                results_dir: base_dir.join("results"),
                mock_file: base_dir.join("docs").join("RapidAPIResponse.txt"),
                default_preferences: base_dir.join("config.yaml"),
            },
            service: ServiceConfig {
                api_key: None,
                api_url: DEFAULT_JSEARCH_URL.to_string(),
                timeout_seconds: DEFAULT_TIMEOUT_SECS,
                pages_per_region: DEFAULT_PAGES_PER_REGION,
                mock_filter_location: false,
            },
        }
    }

    fn load_service() -> ServiceConfig {
        let api_key = env_non_empty("RAPID_API_KEY");
        if api_key.is_none() {
            info!("RAPID_API_KEY not set; live fetching disabled");
        }

        ServiceConfig {
            api_key,
            api_url: env_non_empty("JSEARCH_API_URL")
                .unwrap_or_else(|| DEFAULT_JSEARCH_URL.to_string()),
            timeout_seconds: env_parse("JOB_HUNTER_TIMEOUT_SECS").unwrap_or(DEFAULT_TIMEOUT_SECS),
            pages_per_region: env_parse::<u32>("JOB_HUNTER_PAGES_PER_REGION")
                .filter(|p| *p > 0)
                .unwrap_or(DEFAULT_PAGES_PER_REGION),
            mock_filter_location: env_non_empty("JOB_HUNTER_MOCK_FILTER_LOCATION")
                .map(|v| is_truthy(&v))
                .unwrap_or(false),
        }
    }

    pub async fn ensure_directories(&self) -> Result<()> {
        FsOps::ensure_dir_exists(&self.paths.debug_dir).await?;
        FsOps::ensure_dir_exists(&self.paths.cache_dir).await?;
        FsOps::ensure_dir_exists(&self.paths.api_response_dir).await?;
        FsOps::ensure_dir_exists(&self.paths.results_dir).await?;
        Ok(())
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    let raw = env_non_empty(name)?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("Ignoring invalid {}={}", name, raw);
            None
        }
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_from_base_dir() {
        let config = ConfigManager::from_base_dir(Path::new("/srv/jh"));
        assert_eq!(config.paths.cache_dir, PathBuf::from("/srv/jh/debug/cache"));
        assert_eq!(
            config.paths.api_response_dir,
            PathBuf::from("/srv/jh/debug/api-response")
        );
        assert_eq!(config.paths.results_dir, PathBuf::from("/srv/jh/results"));
        assert_eq!(
            config.paths.mock_file,
            PathBuf::from("/srv/jh/docs/RapidAPIResponse.txt")
        );
        assert!(config.service.api_key.is_none());
        assert_eq!(config.service.pages_per_region, 1);
    }

    #[test]
    fn test_truthy_values() {
        assert!(is_truthy("1"));
        assert!(is_truthy("TRUE"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("nope"));
    }

    #[test]
    fn test_log_file_matches_loaded_layout() {
        let base = Path::new("/srv/jh");
        let log_file = ConfigManager::log_file_for(base);
        assert_eq!(log_file, PathBuf::from("/srv/jh/debug/job-hunter.log"));
        assert_eq!(ConfigManager::load_from(base).paths.log_file, log_file);
    }

    #[tokio::test]
    async fn test_ensure_directories() {
        let dir = tempfile::tempdir().unwrap();
        let config = ConfigManager::from_base_dir(dir.path());
        config.ensure_directories().await.unwrap();
        assert!(config.paths.cache_dir.is_dir());
        assert!(config.paths.results_dir.is_dir());
    }
}
