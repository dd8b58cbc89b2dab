// src/runner.rs
//! One search run: fetch, normalize, extract, filter, report and export

use crate::app_log;
use crate::cache::{CacheStore, FileCache};
use crate::core::{ConfigManager, ServiceClient};
use crate::export::{exported_message, write_exports};
use crate::extract::Extractor;
use crate::fetcher::{Fetcher, JobSource};
use crate::filter::{filter_jobs, FilterCriteria};
use crate::mock::MockSource;
use crate::normalize::{normalize_with_stats, NormalizeStats};
use crate::preferences::SearchPreferences;
use crate::summary::{build_recap, print_summaries};
use crate::types::{ExtractedJob, RawPayload};
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::Instrument;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RunReport {
    pub run_id: Uuid,
    pub timestamp: String,
    pub used_cache: bool,
    pub api_called: bool,
    /// Jobs that survived normalization, before filtering.
    pub total_before: usize,
    /// Malformed records skipped by the normalizer.
    pub dropped: usize,
    pub jobs: Vec<ExtractedJob>,
    pub exported: Vec<PathBuf>,
}

impl RunReport {
    pub fn total_after(&self) -> usize {
        self.jobs.len()
    }
}

/// The pure part of a run. Returns the matching jobs in payload order.
pub fn process_payload(
    payload: &RawPayload,
    criteria: &FilterCriteria,
    extractor: &Extractor,
) -> (Vec<ExtractedJob>, NormalizeStats) {
    let (normalized, stats) = normalize_with_stats(payload);
    let extracted = extractor.extract_all(normalized);
    (filter_jobs(extracted, criteria), stats)
}

pub struct JobHunter<C, S> {
    fetcher: Fetcher<C, S>,
    extractor: Extractor,
    results_dir: PathBuf,
    allow_launch: bool,
}

impl JobHunter<FileCache, ServiceClient> {
    /// Disk cache, live client when an API key is set, mock file otherwise.
    pub fn from_config(config: &ConfigManager) -> Result<Self> {
        let cache = FileCache::new(config.paths.cache_dir.clone());
        let live = ServiceClient::from_config(&config.service)?;
        let mock = MockSource::new(config.paths.mock_file.clone())
            .with_location_filter(config.service.mock_filter_location);

        let fetcher = Fetcher::new(cache, live, mock)
            .with_debug_dir(config.paths.api_response_dir.clone())
            .with_pages_per_region(config.service.pages_per_region);

        Ok(Self::new(fetcher, config.paths.results_dir.clone()))
    }
}

impl<C, S> JobHunter<C, S>
where
    C: CacheStore,
    S: JobSource,
{
    pub fn new(fetcher: Fetcher<C, S>, results_dir: PathBuf) -> Self {
        Self {
            fetcher,
            extractor: Extractor::default(),
            results_dir,
            allow_launch: true,
        }
    }

    pub fn with_extractor(mut self, extractor: Extractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Whether `*_LAUNCH` outputs may open a viewer.
    pub fn with_launch(mut self, allow: bool) -> Self {
        self.allow_launch = allow;
        self
    }

    pub async fn run(&self, prefs: &SearchPreferences) -> Result<RunReport> {
        self.run_at(prefs, Utc::now()).await
    }

    pub async fn run_at(&self, prefs: &SearchPreferences, now: DateTime<Utc>) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let span = tracing::info_span!("run", %run_id);
        self.execute(run_id, prefs, now).instrument(span).await
    }

    async fn execute(
        &self,
        run_id: Uuid,
        prefs: &SearchPreferences,
        now: DateTime<Utc>,
    ) -> Result<RunReport> {
        prefs.validate()?;
        app_log!(
            info,
            "Searching '{}' in '{}' (regions: [{}], posted: {})",
            prefs.role,
            prefs.display_location(),
            prefs.regions.join(", "),
            prefs.date_posted.as_str()
        );

        let outcome = self.fetcher.fetch(prefs, now).await?;
        let (jobs, stats) = process_payload(&outcome.payload, &prefs.filters, &self.extractor);
        if stats.dropped > 0 {
            app_log!(warn, "Skipped {} malformed job records", stats.dropped);
        }
        app_log!(info, "{} of {} jobs passed the filters", jobs.len(), stats.kept);

        let mut report = RunReport {
            run_id,
            timestamp: outcome.timestamp,
            used_cache: outcome.used_cache,
            api_called: outcome.api_called,
            total_before: stats.kept,
            dropped: stats.dropped,
            jobs,
            exported: Vec::new(),
        };

        if report.jobs.is_empty() {
            println!("No jobs matched your filters.");
        } else {
            print_summaries(&report.jobs);
            report.exported = write_exports(
                &report.jobs,
                prefs,
                &self.results_dir,
                &report.timestamp,
                self.allow_launch,
            )
            .await?;
            if let Some(message) = exported_message(&report.exported) {
                println!("{}", message);
            }
        }

        println!("\n{}", build_recap(prefs, &report));
        Ok(report)
    }
}
