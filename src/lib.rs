//! Personal job-search assistant: fetch postings, normalize them, extract
//! structured attributes, filter by preference and export the results.

/// Level-tagged logging shorthand used across the crate.
///
/// `app_log!(info, "Fetched {} jobs", n)` expands to `tracing::info!(...)`.
#[macro_export]
macro_rules! app_log {
    ($level:ident, $($arg:tt)+) => {
        ::tracing::$level!($($arg)+)
    };
}

pub mod cache;
pub mod cli;
pub mod core;
pub mod export;
pub mod extract;
pub mod fetcher;
pub mod filter;
pub mod geo;
pub mod mock;
pub mod normalize;
pub mod preferences;
pub mod runner;
pub mod summary;
pub mod types;

pub use cache::{CacheKey, CacheStore, FileCache, MemoryCache};
pub use extract::{extract_all, Extractor};
pub use fetcher::{FetchError, FetchOutcome, Fetcher, JobSource, UpstreamQuery};
pub use filter::{filter_jobs, FilterCriteria};
pub use normalize::normalize_response;
pub use preferences::SearchPreferences;
pub use runner::{process_payload, JobHunter, RunReport};
pub use types::{ExtractedJob, NormalizedJob, RawPayload};
