// src/cache.rs
//! Time-boxed storage of raw upstream payloads, keyed by query parameters

use crate::core::FsOps;
use crate::preferences::SearchPreferences;
use crate::types::{DatePosted, RawPayload};
use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::{debug, info, warn};

pub const CACHE_TTL_MINUTES: i64 = 60;

const MAX_FILE_STEM_LEN: usize = 150;

pub fn cache_ttl() -> Duration {
    Duration::minutes(CACHE_TTL_MINUTES)
}

/// An entry is valid while `now - stored_at < TTL`.
pub fn is_fresh(stored_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    now.signed_duration_since(stored_at) < cache_ttl()
}

/// Deterministic key built from the query-relevant preferences.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(role: &str, location: &str, date_posted: DatePosted, regions: &[String]) -> Self {
        let role = normalize_component(role);
        let location = match normalize_component(location) {
            l if l.is_empty() => "any".to_string(),
            l => l,
        };

        let mut key = format!(
            "role={}|location={}|date_posted={}",
            role,
            location,
            date_posted.as_str()
        );

        let mut regions: Vec<String> = regions
            .iter()
            .map(|r| r.trim().to_lowercase())
            .filter(|r| !r.is_empty())
            .collect();
        regions.sort();
        regions.dedup();
        if !regions.is_empty() {
            key.push_str("|regions=");
            key.push_str(&regions.join(","));
        }

        Self(key)
    }

    pub fn from_preferences(prefs: &SearchPreferences) -> Self {
        Self::new(&prefs.role, &prefs.location, prefs.date_posted, &prefs.regions)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name for the on-disk entry. Collisions are caught by the key
    /// stored inside the entry.
    pub fn file_name(&self) -> String {
        let stem: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .take(MAX_FILE_STEM_LEN)
            .collect();
        format!("{}.json", stem)
    }
}

fn normalize_component(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub timestamp: DateTime<Utc>,
    pub raw_response: RawPayload,
}

/// Storage for raw payloads. Stale and missing entries look the same.
#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn lookup(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<RawPayload>;

    /// Persist `payload` under `key`, replacing whatever was there.
    async fn store(&self, key: &CacheKey, payload: &RawPayload, now: DateTime<Utc>) -> Result<()>;
}

/// One JSON file per key under a cache directory.
#[derive(Debug, Clone)]
pub struct FileCache {
    dir: PathBuf,
}

impl FileCache {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    async fn read_entry(&self, key: &CacheKey) -> Option<CacheEntry> {
        let path = self.entry_path(key);
        let content = match FsOps::read_file_safe(&path).await {
            Ok(content) => content,
            Err(e) => {
                debug!("No readable cache entry at {}: {:#}", path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<CacheEntry>(&content) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Ignoring corrupt cache entry {}: {}", path.display(), e);
                None
            }
        }
    }
}

#[async_trait]
impl CacheStore for FileCache {
    async fn lookup(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<RawPayload> {
        let entry = self.read_entry(key).await?;

        if entry.key != key.as_str() {
            debug!("Cache file holds a different key ({}); treating as miss", entry.key);
            return None;
        }
        if !is_fresh(entry.timestamp, now) {
            debug!("Cache entry for {} is stale", key.as_str());
            return None;
        }

        info!("Cache hit for {}", key.as_str());
        Some(entry.raw_response)
    }

    async fn store(&self, key: &CacheKey, payload: &RawPayload, now: DateTime<Utc>) -> Result<()> {
        let entry = CacheEntry {
            key: key.as_str().to_string(),
            timestamp: now,
            raw_response: payload.clone(),
        };
        let content =
            serde_json::to_string_pretty(&entry).context("Failed to serialize cache entry")?;

        let path = self.entry_path(key);
        FsOps::write_file_safe(&path, &content)
            .await
            .context("Failed to write cache entry")?;

        info!("Cached payload for {} at {}", key.as_str(), path.display());
        Ok(())
    }
}

/// Process-local cache, used where no disk state is wanted.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<CacheKey, (DateTime<Utc>, RawPayload)>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheStore for MemoryCache {
    async fn lookup(&self, key: &CacheKey, now: DateTime<Utc>) -> Option<RawPayload> {
        let entries = self.entries.lock().ok()?;
        entries
            .get(key)
            .filter(|(stored_at, _)| is_fresh(*stored_at, now))
            .map(|(_, payload)| payload.clone())
    }

    async fn store(&self, key: &CacheKey, payload: &RawPayload, now: DateTime<Utc>) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("Memory cache lock poisoned"))?;
        entries.insert(key.clone(), (now, payload.clone()));
        Ok(())
    }
}
