// src/summary.rs
//! Console text: one block per job plus the end-of-run recap

use crate::preferences::SearchPreferences;
use crate::runner::RunReport;
use crate::types::ExtractedJob;

const SUMMARY_MAX_REQUIREMENTS: usize = 8;
const SUMMARY_REQUIREMENT_MAX_CHARS: usize = 200;

/// `60000` -> `60,000`
pub fn format_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// First `max` characters, with `...` appended when something was cut.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max).collect();
    cut.push_str("...");
    cut
}

pub fn build_summary(job: &ExtractedJob, index: usize) -> String {
    let mut lines = vec![
        "=".repeat(60),
        format!("Job #{}: {}", index + 1, job.role),
        format!("Company: {}", job.employer_name),
        format!(
            "Location: {}",
            if job.location.is_empty() {
                "Not specified"
            } else {
                &job.location
            }
        ),
        format!("Country: {}", job.job_country),
        format!("Location type: {}", job.location_type),
        format!("Position type: {}", job.position_type),
    ];

    if let Some(salary) = job.minimum_salary {
        lines.push(format!("Minimum salary: {} (annual)", format_thousands(salary)));
    }
    lines.push(format!("Industry: {}", job.industry));
    lines.push(format!("Job ad language: {}", job.job_spec_language));

    if !job.tech_stack.is_empty() {
        lines.push(format!("Tech stack: {}", job.tech_stack.join(", ")));
    }

    if !job.requirements.is_empty() {
        lines.push("Key requirements:".to_string());
        for requirement in job.requirements.iter().take(SUMMARY_MAX_REQUIREMENTS) {
            lines.push(format!(
                "  - {}",
                truncate_chars(requirement, SUMMARY_REQUIREMENT_MAX_CHARS)
            ));
        }
    }

    if let Some(link) = &job.job_link {
        lines.push(format!("Apply: {}", link));
    }
    lines.push(String::new());
    lines.join("\n")
}

pub fn print_summaries(jobs: &[ExtractedJob]) {
    for (i, job) in jobs.iter().enumerate() {
        println!("{}", build_summary(job, i));
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn build_recap(prefs: &SearchPreferences, report: &RunReport) -> String {
    let mut lines = vec![
        "Run recap".to_string(),
        "-".repeat(40),
        format!("Role: {}", prefs.role),
        format!("Location: {}", prefs.display_location()),
    ];
    if prefs.is_multi_region() {
        lines.push(format!("Regions: {}", prefs.regions.join(", ")));
    }
    lines.extend([
        format!("API called: {}", yes_no(report.api_called)),
        format!("Used cache: {}", yes_no(report.used_cache)),
        format!("Jobs before filtering: {}", report.total_before),
        format!("Jobs after filtering: {}", report.total_after()),
    ]);
    if report.dropped > 0 {
        lines.push(format!("Malformed records skipped: {}", report.dropped));
    }
    lines.join("\n")
}
