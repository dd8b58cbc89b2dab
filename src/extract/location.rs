// src/extract/location.rs
use crate::types::{LocationType, NormalizedJob};
use once_cell::sync::Lazy;
use regex::Regex;

static REMOTE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(remote|fully[- ]remote|remote[- ]first|work from home|wfh|remoto|teletrabajo|t[ée]l[ée]travail|homeoffice|home[- ]office|100% remote)\b",
    )
    .expect("valid regex")
});

static HYBRID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(hybrid|hybride|h[íi]brido|ibrido)\b").expect("valid regex")
});

static ON_SITE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(on[- ]?site|in[- ]office|in[- ]person|presencial|vor ort|sur site|en pr[ée]sentiel|in sede)\b",
    )
    .expect("valid regex")
});

/// Structured flag first, then keywords over title, location and
/// description with remote > hybrid > on-site.
///
/// An explicit `is_remote = false` rules out `remote` but still lets the
/// keywords decide between hybrid and on-site.
pub fn location_type(job: &NormalizedJob) -> LocationType {
    if job.is_remote == Some(true) {
        return LocationType::Remote;
    }

    let text = format!("{}\n{}\n{}", job.title, job.location, job.description);
    let remote_ruled_out = job.is_remote == Some(false);

    if !remote_ruled_out && REMOTE.is_match(&text) {
        LocationType::Remote
    } else if HYBRID.is_match(&text) {
        LocationType::Hybrid
    } else if ON_SITE.is_match(&text) {
        LocationType::OnSite
    } else {
        LocationType::Unknown
    }
}
