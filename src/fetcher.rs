// src/fetcher.rs
//! Obtain the raw payload for a run: cache, live upstream or mock file

use crate::app_log;
use crate::cache::{CacheKey, CacheStore};
use crate::core::FsOps;
use crate::geo;
use crate::mock::MockSource;
use crate::normalize::REGION_TAG_FIELD;
use crate::preferences::SearchPreferences;
use crate::types::{DatePosted, RawPayload};
use async_trait::async_trait;
use chrono::{DateTime, Local, Utc};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::path::PathBuf;
use thiserror::Error;

/// One page request to the upstream listing API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamQuery {
    pub role: String,
    pub location: Option<String>,
    /// Lower-case country code hint.
    pub country: Option<String>,
    pub date_posted: DatePosted,
    pub page: u32,
}

#[async_trait]
pub trait JobSource: Send + Sync {
    async fn fetch_page(&self, query: &UpstreamQuery) -> anyhow::Result<Value>;
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error(
        "No job data source: RAPID_API_KEY is not set and mock file {} is not present",
        .mock_path.display()
    )]
    NoDataSource { mock_path: PathBuf },

    #[error("Upstream fetch failed for {context}: {message}")]
    Upstream { context: String, message: String },

    #[error("Could not read mock file {}: {message}", .path.display())]
    MockRead { path: PathBuf, message: String },

    #[error("Could not parse mock file {}: {message}", .path.display())]
    MockParse { path: PathBuf, message: String },
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub payload: RawPayload,
    pub fetched_at: DateTime<Utc>,
    /// `YYYYMMDD_HHMMSS` in local time, shared with the export file names.
    pub timestamp: String,
    pub used_cache: bool,
    pub api_called: bool,
}

pub struct Fetcher<C, S> {
    cache: C,
    live: Option<S>,
    mock: MockSource,
    debug_dir: Option<PathBuf>,
    pages_per_region: u32,
}

impl<C, S> Fetcher<C, S>
where
    C: CacheStore,
    S: JobSource,
{
    pub fn new(cache: C, live: Option<S>, mock: MockSource) -> Self {
        Self {
            cache,
            live,
            mock,
            debug_dir: None,
            pages_per_region: 1,
        }
    }

    /// Write each run's payload under `dir` as `<timestamp>_response.json`.
    pub fn with_debug_dir(mut self, dir: PathBuf) -> Self {
        self.debug_dir = Some(dir);
        self
    }

    pub fn with_pages_per_region(mut self, pages: u32) -> Self {
        self.pages_per_region = pages.max(1);
        self
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub async fn fetch(
        &self,
        prefs: &SearchPreferences,
        now: DateTime<Utc>,
    ) -> Result<FetchOutcome, FetchError> {
        let timestamp = FsOps::run_timestamp(now.with_timezone(&Local));
        let key = CacheKey::from_preferences(prefs);

        let cached = self.cache.lookup(&key, now).await;
        let (payload, used_cache, api_called) = if let Some(payload) = cached {
            app_log!(info, "Using cached payload for {}", key.as_str());
            (payload, true, false)
        } else if let Some(live) = &self.live {
            let payload = if prefs.is_multi_region() {
                self.fetch_regions(live, prefs).await?
            } else {
                fetch_single(live, prefs).await?
            };
            if let Err(e) = self.cache.store(&key, &payload, now).await {
                app_log!(warn, "Failed to cache payload for {}: {:#}", key.as_str(), e);
            }
            (payload, false, true)
        } else {
            app_log!(info, "No API key configured; reading mock file {}", self.mock.path().display());
            (self.mock.load(prefs).await?, false, false)
        };

        self.write_debug_artifact(&payload, &timestamp).await;

        Ok(FetchOutcome {
            payload,
            fetched_at: now,
            timestamp,
            used_cache,
            api_called,
        })
    }

    async fn fetch_regions(&self, live: &S, prefs: &SearchPreferences) -> Result<RawPayload, FetchError> {
        let location = upstream_location(prefs);
        let mut pages = Vec::with_capacity(prefs.regions.len() * self.pages_per_region as usize);

        for region in &prefs.regions {
            for page in 1..=self.pages_per_region {
                let query = UpstreamQuery {
                    role: prefs.role.trim().to_string(),
                    location: location.clone(),
                    country: Some(region.to_lowercase()),
                    date_posted: prefs.date_posted,
                    page,
                };
                let body = live.fetch_page(&query).await.map_err(|e| FetchError::Upstream {
                    context: format!("region {} page {}", region, page),
                    message: format!("{:#}", e),
                })?;
                pages.push((region.clone(), body));
            }
        }

        let merged = merge_region_payloads(pages);
        app_log!(
            info,
            "Merged {} jobs from {} region(s)",
            merged["data"].as_array().map(Vec::len).unwrap_or(0),
            prefs.regions.len()
        );
        Ok(RawPayload::Merged(merged))
    }

    async fn write_debug_artifact(&self, payload: &RawPayload, timestamp: &str) {
        let Some(dir) = &self.debug_dir else {
            return;
        };
        let path = dir.join(format!("{}_response.json", timestamp));
        let result = match serde_json::to_string_pretty(payload.body()) {
            Ok(content) => FsOps::write_file_safe(&path, &content).await,
            Err(e) => Err(e.into()),
        };
        if let Err(e) = result {
            app_log!(warn, "Could not write debug response {}: {:#}", path.display(), e);
        }
    }
}

async fn fetch_single<S: JobSource>(live: &S, prefs: &SearchPreferences) -> Result<RawPayload, FetchError> {
    let location = upstream_location(prefs);
    let country = location
        .as_deref()
        .and_then(geo::infer_country)
        .map(str::to_lowercase);

    let query = UpstreamQuery {
        role: prefs.role.trim().to_string(),
        location,
        country,
        date_posted: prefs.date_posted,
        page: 1,
    };

    let body = live.fetch_page(&query).await.map_err(|e| FetchError::Upstream {
        context: format!("role '{}' in '{}'", prefs.role, prefs.display_location()),
        message: format!("{:#}", e),
    })?;
    Ok(RawPayload::Api(body))
}

/// The location sent upstream; "europe"-style triggers only select regions.
fn upstream_location(prefs: &SearchPreferences) -> Option<String> {
    let location = prefs.location.trim();
    if location.is_empty() || geo::is_europe_trigger(location) {
        None
    } else {
        Some(location.to_string())
    }
}

/// Union of per-region pages. Jobs are deduplicated by `job_id` (first
/// occurrence wins, in the given order) and tagged with their region.
pub fn merge_region_payloads(pages: Vec<(String, Value)>) -> Value {
    let mut seen: HashSet<String> = HashSet::new();
    let mut merged = Vec::new();

    for (region, body) in pages {
        let Some(Value::Array(jobs)) = body.get("data").cloned() else {
            app_log!(warn, "Region {} returned no job list", region);
            continue;
        };

        for mut job in jobs {
            if let Some(id) = job.get("job_id").and_then(Value::as_str) {
                if !seen.insert(id.to_string()) {
                    continue;
                }
            }
            if let Some(record) = job.as_object_mut() {
                record.insert(REGION_TAG_FIELD.to_string(), Value::String(region.clone()));
            }
            merged.push(job);
        }
    }

    json!({ "status": "OK", "data": merged })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use chrono::TimeZone;
    use std::sync::Mutex;

    /// Records queries and answers with one job per (country, page).
    #[derive(Default)]
    struct FakeSource {
        queries: Mutex<Vec<UpstreamQuery>>,
        fail_country: Option<String>,
        shared_id: bool,
    }

    impl FakeSource {
        fn calls(&self) -> Vec<UpstreamQuery> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl JobSource for FakeSource {
        async fn fetch_page(&self, query: &UpstreamQuery) -> anyhow::Result<Value> {
            self.queries.lock().unwrap().push(query.clone());
            let country = query.country.clone().unwrap_or_default();
            if self.fail_country.as_deref() == Some(country.as_str()) {
                anyhow::bail!("HTTP 429 error: quota exceeded");
            }
            let id = if self.shared_id {
                "shared".to_string()
            } else {
                format!("{}-{}", country, query.page)
            };
            Ok(json!({"status": "OK", "data": [
                {"job_id": id, "job_title": format!("Dev {}", country)}
            ]}))
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn missing_mock() -> MockSource {
        MockSource::new(PathBuf::from("/nonexistent/RapidAPIResponse.txt"))
    }

    fn multi_prefs(regions: &[&str]) -> SearchPreferences {
        SearchPreferences {
            regions: regions.iter().map(|r| r.to_string()).collect(),
            ..SearchPreferences::new("Android Developer", "Europe")
        }
    }

    #[tokio::test]
    async fn test_cache_hit_skips_upstream() {
        let cache = MemoryCache::new();
        let prefs = SearchPreferences::new("Android Developer", "Berlin");
        let cached = RawPayload::Api(json!({"data": [{"job_title": "cached"}]}));
        cache
            .store(&CacheKey::from_preferences(&prefs), &cached, now())
            .await
            .unwrap();

        let fetcher = Fetcher::new(cache, Some(FakeSource::default()), missing_mock());
        let outcome = fetcher.fetch(&prefs, now() + chrono::Duration::minutes(30)).await.unwrap();

        assert_eq!(outcome.payload, cached);
        assert!(outcome.used_cache);
        assert!(!outcome.api_called);
        assert!(fetcher.live.as_ref().unwrap().calls().is_empty());
    }

    #[tokio::test]
    async fn test_single_region_request_and_store() {
        let fetcher = Fetcher::new(MemoryCache::new(), Some(FakeSource::default()), missing_mock());
        let prefs = SearchPreferences::new("Android Developer", "Berlin");
        let outcome = fetcher.fetch(&prefs, now()).await.unwrap();

        assert!(outcome.api_called);
        assert!(matches!(outcome.payload, RawPayload::Api(_)));
        let calls = fetcher.live.as_ref().unwrap().calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].location.as_deref(), Some("Berlin"));
        assert_eq!(calls[0].country.as_deref(), Some("de"));
        assert_eq!(fetcher.cache().len(), 1);

        // second run within the TTL is served from the cache
        let again = fetcher.fetch(&prefs, now() + chrono::Duration::minutes(5)).await.unwrap();
        assert!(again.used_cache);
        assert_eq!(fetcher.live.as_ref().unwrap().calls().len(), 1);
    }

    #[tokio::test]
    async fn test_multi_region_request_count_and_tags() {
        let fetcher = Fetcher::new(MemoryCache::new(), Some(FakeSource::default()), missing_mock())
            .with_pages_per_region(2);
        let outcome = fetcher.fetch(&multi_prefs(&["DE", "FR", "ES"]), now()).await.unwrap();

        let calls = fetcher.live.as_ref().unwrap().calls();
        assert_eq!(calls.len(), 6);
        assert!(calls.iter().all(|q| q.location.is_none()));
        let order: Vec<(String, u32)> = calls
            .iter()
            .map(|q| (q.country.clone().unwrap(), q.page))
            .collect();
        assert_eq!(order[0], ("de".to_string(), 1));
        assert_eq!(order[1], ("de".to_string(), 2));
        assert_eq!(order[2], ("fr".to_string(), 1));

        let RawPayload::Merged(body) = &outcome.payload else {
            panic!("expected merged payload");
        };
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 6);
        assert_eq!(data[0][REGION_TAG_FIELD], "DE");
        assert_eq!(data[5][REGION_TAG_FIELD], "ES");
    }

    #[tokio::test]
    async fn test_multi_region_dedup_keeps_first_region() {
        let source = FakeSource {
            shared_id: true,
            ..Default::default()
        };
        let fetcher = Fetcher::new(MemoryCache::new(), Some(source), missing_mock());
        let outcome = fetcher.fetch(&multi_prefs(&["FR", "DE"]), now()).await.unwrap();

        let data = outcome.payload.job_entries().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0][REGION_TAG_FIELD], "FR");
        assert_eq!(data[0]["job_title"], "Dev fr");
    }

    #[tokio::test]
    async fn test_failed_region_aborts_run() {
        let source = FakeSource {
            fail_country: Some("fr".to_string()),
            ..Default::default()
        };
        let fetcher = Fetcher::new(MemoryCache::new(), Some(source), missing_mock());
        let err = fetcher.fetch(&multi_prefs(&["DE", "FR"]), now()).await.unwrap_err();

        match err {
            FetchError::Upstream { context, message } => {
                assert_eq!(context, "region FR page 1");
                assert!(message.contains("429"));
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(fetcher.cache().is_empty());
    }

    #[tokio::test]
    async fn test_no_source_at_all() {
        let fetcher: Fetcher<MemoryCache, FakeSource> =
            Fetcher::new(MemoryCache::new(), None, missing_mock());
        let err = fetcher.fetch(&SearchPreferences::default(), now()).await.unwrap_err();
        assert!(matches!(err, FetchError::NoDataSource { .. }));
        assert!(err.to_string().contains("RAPID_API_KEY"));
    }

    #[tokio::test]
    async fn test_mock_payload_is_not_cached_and_debug_written() {
        let dir = tempfile::tempdir().unwrap();
        let mock_path = dir.path().join("mock.txt");
        std::fs::write(&mock_path, "[{'job_title': 'Mock Dev'}]").unwrap();

        let debug_dir = dir.path().join("debug");
        let fetcher: Fetcher<MemoryCache, FakeSource> =
            Fetcher::new(MemoryCache::new(), None, MockSource::new(mock_path))
                .with_debug_dir(debug_dir.clone());
        let outcome = fetcher.fetch(&SearchPreferences::default(), now()).await.unwrap();

        assert!(matches!(outcome.payload, RawPayload::Fixture(_)));
        assert!(!outcome.used_cache);
        assert!(!outcome.api_called);
        assert!(fetcher.cache().is_empty());

        let artifact = debug_dir.join(format!("{}_response.json", outcome.timestamp));
        let written: Value = serde_json::from_str(&std::fs::read_to_string(artifact).unwrap()).unwrap();
        assert_eq!(written[0]["job_title"], "Mock Dev");
    }

    #[test]
    fn test_merge_keeps_jobs_without_id() {
        let merged = merge_region_payloads(vec![
            ("DE".to_string(), json!({"data": [{"job_title": "a"}, {"job_title": "b"}]})),
            ("FR".to_string(), json!({"status": "ERROR"})),
        ]);
        assert_eq!(merged["data"].as_array().unwrap().len(), 2);
    }
}
