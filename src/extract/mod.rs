// src/extract/mod.rs
//! Derived fields for normalized jobs. Every field defaults on its own;
//! a miss in one never affects another.

pub mod language;
pub mod location;
pub mod position;
pub mod requirements;
pub mod salary;
pub mod tech_stack;

pub use tech_stack::TechVocabulary;

use crate::geo;
use crate::types::{ExtractedJob, NormalizedJob, UNKNOWN};

const GOOGLE_JOBS_URL: &str = "https://www.google.com/search?ibp=htl;jobs";
const INDUSTRY_SCAN_CHARS: usize = 2000;

/// Keyword groups for the industry heuristic, checked in order.
const INDUSTRY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "Finance / Insurance",
        &["fintech", "finance", "bank", "payment", "insurance"],
    ),
    ("Retail", &["retail", "ecommerce", "e-commerce"]),
    (
        "Defense / Government",
        &["defense", "defence", "security clearance", "ts/sci", "government"],
    ),
    ("Healthcare", &["healthcare", "health", "medical"]),
];

#[derive(Debug, Clone, Default)]
pub struct Extractor {
    vocabulary: TechVocabulary,
}

impl Extractor {
    pub fn new(vocabulary: TechVocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn extract(&self, job: NormalizedJob) -> ExtractedJob {
        ExtractedJob {
            role: job.title.clone(),
            employer_name: job.company.clone(),
            location: job.location.clone(),
            job_country: job_country(&job),
            location_type: location::location_type(&job),
            position_type: position::position_type(&job),
            minimum_salary: salary::minimum_salary(&job),
            industry: industry(&job),
            job_spec_language: language::detect_language(&job.description),
            tech_stack: tech_stack::tech_stack(&job, &self.vocabulary),
            requirements: requirements::requirements(&job),
            job_link: job_link(&job),
            source: job,
        }
    }

    pub fn extract_all(&self, jobs: Vec<NormalizedJob>) -> Vec<ExtractedJob> {
        jobs.into_iter().map(|job| self.extract(job)).collect()
    }
}

/// Extract with the built-in vocabulary.
pub fn extract_all(jobs: Vec<NormalizedJob>) -> Vec<ExtractedJob> {
    Extractor::default().extract_all(jobs)
}

/// Structured industry field, else keywords in employer and description.
pub fn industry(job: &NormalizedJob) -> String {
    if let Some(industry) = job.industry.as_deref().map(str::trim).filter(|i| !i.is_empty()) {
        return industry.to_string();
    }

    let description: String = job.description.chars().take(INDUSTRY_SCAN_CHARS).collect();
    let text = format!("{} {}", job.company, description).to_lowercase();
    INDUSTRY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| text.contains(k)))
        .map(|(label, _)| label.to_string())
        .unwrap_or_else(|| UNKNOWN.to_string())
}

/// Apply link, else the listing link, else a Google Jobs URL for the id.
pub fn job_link(job: &NormalizedJob) -> Option<String> {
    if let Some(link) = job.apply_link.clone().or_else(|| job.listing_link.clone()) {
        return Some(link);
    }
    let id = job.job_id.as_deref()?;
    let mut url = reqwest::Url::parse(GOOGLE_JOBS_URL).ok()?;
    url.set_fragment(Some(&format!("htidocid={}", id)));
    Some(url.to_string())
}

/// Originating region, else the country field, else the city table.
pub fn job_country(job: &NormalizedJob) -> String {
    job.source_region
        .as_deref()
        .and_then(geo::normalize_region)
        .or_else(|| geo::normalize_country_field(&job.country))
        .or_else(|| geo::infer_country(&job.location).map(str::to_string))
        .unwrap_or_else(|| UNKNOWN.to_string())
}
