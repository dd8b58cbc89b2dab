// src/normalize.rs
//! Raw upstream payloads into source-agnostic job records

use crate::app_log;
use crate::types::{NormalizedJob, RawPayload, SalaryFields};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Field the fetcher adds to each job in a merged multi-region payload.
pub const REGION_TAG_FIELD: &str = "_job_hunter_region";

static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[a-zA-Z][a-zA-Z0-9]*(\s[^>]*)?/?>").expect("valid regex"));
static BLOCK_BREAK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)<br\s*/?>|</(p|div|li|ul|ol|h[1-6]|tr|section)\s*>").expect("valid regex")
});
static LIST_ITEM_OPEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<li(\s[^>]*)?>").expect("valid regex"));

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeStats {
    pub total: usize,
    pub kept: usize,
    pub dropped: usize,
}

/// Normalize every usable record, preserving source order.
pub fn normalize_response(payload: &RawPayload) -> Vec<NormalizedJob> {
    normalize_with_stats(payload).0
}

pub fn normalize_with_stats(payload: &RawPayload) -> (Vec<NormalizedJob>, NormalizeStats) {
    let Some(entries) = payload.job_entries() else {
        app_log!(warn, "{} payload has no job list; nothing to normalize", payload.shape());
        return (Vec::new(), NormalizeStats::default());
    };

    let mut jobs = Vec::with_capacity(entries.len());
    let mut stats = NormalizeStats {
        total: entries.len(),
        ..NormalizeStats::default()
    };

    for (index, entry) in entries.iter().enumerate() {
        let Some(record) = entry.as_object() else {
            app_log!(debug, "Skipping non-object job entry at index {}", index);
            stats.dropped += 1;
            continue;
        };

        let job = normalize_jsearch_job(record, entry);
        if job.title.is_empty() && job.apply_link.is_none() && job.listing_link.is_none() {
            app_log!(debug, "Skipping job at index {}: no title and no link", index);
            stats.dropped += 1;
            continue;
        }
        jobs.push(job);
    }

    stats.kept = jobs.len();
    if stats.dropped > 0 {
        app_log!(info, "Dropped {} of {} malformed job records", stats.dropped, stats.total);
    }
    (jobs, stats)
}

/// Adapter for JSearch-shaped job objects (API, merged and fixture payloads).
fn normalize_jsearch_job(record: &Map<String, Value>, raw: &Value) -> NormalizedJob {
    let city = text(record, "job_city");
    let state = text(record, "job_state");
    let country = text(record, "job_country");

    let location = match text(record, "job_location") {
        l if !l.is_empty() => l,
        _ => [city.as_str(), state.as_str(), country.as_str()]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(", "),
    };

    let employment_types = match record.get("job_employment_types") {
        Some(Value::Array(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(other) => scalar_text(other).into_iter().collect(),
        None => Vec::new(),
    };

    let industry = ["job_industry", "employer_company_type", "industry"]
        .iter()
        .map(|key| text(record, key))
        .find(|value| !value.is_empty());

    NormalizedJob {
        job_id: opt_text(record, "job_id"),
        title: text(record, "job_title"),
        company: text(record, "employer_name"),
        description: description_text(&text(record, "job_description")),
        location,
        city,
        state,
        country,
        is_remote: record.get("job_is_remote").and_then(flag),
        employment_type: text(record, "job_employment_type"),
        employment_types,
        apply_link: opt_text(record, "job_apply_link"),
        listing_link: opt_text(record, "job_google_link"),
        industry,
        salary: salary_fields(record),
        highlights: highlights(record.get("job_highlights")),
        source_region: opt_text(record, REGION_TAG_FIELD),
        raw: raw.clone(),
    }
}

fn salary_fields(record: &Map<String, Value>) -> SalaryFields {
    let mut salary = SalaryFields {
        min: record.get("job_min_salary").and_then(number),
        max: record.get("job_max_salary").and_then(number),
        period: opt_text(record, "job_salary_period"),
        currency: opt_text(record, "job_salary_currency"),
    };

    let nested = ["job_salary", "salary"]
        .iter()
        .find_map(|key| record.get(*key).and_then(Value::as_object));
    if let Some(nested) = nested {
        salary.min = salary.min.or_else(|| nested.get("min").and_then(number));
        salary.max = salary.max.or_else(|| nested.get("max").and_then(number));
        salary.period = salary.period.or_else(|| opt_text(nested, "period"));
        salary.currency = salary.currency.or_else(|| opt_text(nested, "currency"));
    }
    salary
}

fn highlights(value: Option<&Value>) -> BTreeMap<String, Vec<String>> {
    let mut sections = BTreeMap::new();
    let Some(Value::Object(map)) = value else {
        return sections;
    };
    for (name, items) in map {
        let items: Vec<String> = match items {
            Value::Array(list) => list
                .iter()
                .filter_map(scalar_text)
                .filter(|s| !s.is_empty())
                .collect(),
            other => scalar_text(other).into_iter().collect(),
        };
        if !items.is_empty() {
            sections.insert(name.clone(), items);
        }
    }
    sections
}

/// Plain-text description. HTML is reduced to its text with line breaks
/// kept at block boundaries.
pub fn description_text(description: &str) -> String {
    if !HTML_TAG.is_match(description) {
        return description.trim().to_string();
    }

    let with_breaks = BLOCK_BREAK.replace_all(description, "\n");
    let with_bullets = LIST_ITEM_OPEN.replace_all(&with_breaks, "\n• ");
    let fragment = Html::parse_fragment(&with_bullets);
    let text: String = fragment.root_element().text().collect();

    text.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|line| !line.is_empty() && line != "•")
        .collect::<Vec<_>>()
        .join("\n")
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text(record: &Map<String, Value>, key: &str) -> String {
    record.get(key).and_then(scalar_text).unwrap_or_default()
}

fn opt_text(record: &Map<String, Value>, key: &str) -> Option<String> {
    Some(text(record, key)).filter(|s| !s.is_empty())
}

/// Numbers may arrive as JSON numbers or numeric strings ("60,000").
fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',' && *c != '_').collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    parsed.filter(|n| n.is_finite())
}

fn flag(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => n.as_i64().map(|n| n != 0),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        },
        _ => None,
    }
}
