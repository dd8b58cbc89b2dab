// src/export.rs
//! Result files: JSON, CSV and a self-contained HTML page

use crate::app_log;
use crate::core::FsOps;
use crate::preferences::SearchPreferences;
use crate::summary::{format_thousands, truncate_chars};
use crate::types::ExtractedJob;
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};

const CSV_REQUIREMENT_MAX_CHARS: usize = 100;
const HTML_REQUIREMENT_MAX_CHARS: usize = 200;
const HTML_MAX_REQUIREMENTS: usize = 8;

const CSV_COLUMNS: [&str; 12] = [
    "role",
    "employer_name",
    "location",
    "job_country",
    "location_type",
    "position_type",
    "minimum_salary",
    "industry",
    "job_spec_language",
    "tech_stack",
    "requirements",
    "job_link",
];

/// Requested output. `*_LAUNCH` also opens the written file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputFormat {
    Json,
    JsonLaunch,
    Csv,
    CsvLaunch,
    Html,
    HtmlLaunch,
}

/// File kind behind an output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    Json,
    Csv,
    Html,
}

impl ExportKind {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Html => "html",
        }
    }
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        Self::Json,
        Self::JsonLaunch,
        Self::Csv,
        Self::CsvLaunch,
        Self::Html,
        Self::HtmlLaunch,
    ];

    pub fn defaults() -> Vec<Self> {
        vec![Self::Json, Self::Csv]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "JSON",
            Self::JsonLaunch => "JSON_LAUNCH",
            Self::Csv => "CSV",
            Self::CsvLaunch => "CSV_LAUNCH",
            Self::Html => "HTML",
            Self::HtmlLaunch => "HTML_LAUNCH",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let wanted = value.trim().to_uppercase();
        Self::ALL.iter().copied().find(|f| f.as_str() == wanted)
    }

    pub fn kind(&self) -> ExportKind {
        match self {
            Self::Json | Self::JsonLaunch => ExportKind::Json,
            Self::Csv | Self::CsvLaunch => ExportKind::Csv,
            Self::Html | Self::HtmlLaunch => ExportKind::Html,
        }
    }

    pub fn extension(&self) -> &'static str {
        self.kind().extension()
    }

    pub fn launches(&self) -> bool {
        matches!(self, Self::JsonLaunch | Self::CsvLaunch | Self::HtmlLaunch)
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `<role>-<location|europe>-<date_posted>-<timestamp>`
pub fn export_prefix(prefs: &SearchPreferences, timestamp: &str) -> String {
    let location = if prefs.is_multi_region() {
        "europe".to_string()
    } else {
        match FsOps::slug(&prefs.location) {
            slug if slug.is_empty() => "any".to_string(),
            slug => slug,
        }
    };
    let role = match FsOps::slug(&prefs.role) {
        slug if slug.is_empty() => "any".to_string(),
        slug => slug,
    };
    format!("{}-{}-{}-{}", role, location, prefs.date_posted.as_str(), timestamp)
}

pub fn render_json(jobs: &[ExtractedJob]) -> Result<String> {
    serde_json::to_string_pretty(jobs).context("Failed to serialize jobs to JSON")
}

pub fn render_csv(jobs: &[ExtractedJob]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(CSV_COLUMNS)
        .context("Failed to write CSV header")?;

    for job in jobs {
        let requirements: Vec<String> = job
            .requirements
            .iter()
            .map(|r| r.chars().take(CSV_REQUIREMENT_MAX_CHARS).collect())
            .collect();
        let salary = job.minimum_salary.map(|s| s.to_string()).unwrap_or_default();
        let tech_stack = job.tech_stack.join("; ");
        let requirements = requirements.join("; ");

        writer
            .write_record([
                job.role.as_str(),
                job.employer_name.as_str(),
                job.location.as_str(),
                job.job_country.as_str(),
                job.location_type.as_str(),
                job.position_type.as_str(),
                salary.as_str(),
                job.industry.as_str(),
                job.job_spec_language.as_str(),
                tech_stack.as_str(),
                requirements.as_str(),
                job.job_link.as_deref().unwrap_or(""),
            ])
            .with_context(|| format!("Failed to write CSV row for '{}'", job.role))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("Failed to flush CSV writer: {}", e.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

fn row(label: &str, value: &str) -> String {
    format!("<tr><th>{}</th><td>{}</td></tr>", label, value)
}

fn criteria_rows(prefs: &SearchPreferences) -> String {
    let filters = &prefs.filters;
    let mut rows = vec![
        row("Role", &escape_html(&prefs.role)),
        row("Location", &escape_html(prefs.display_location())),
        row("Date posted", prefs.date_posted.as_str()),
    ];

    if prefs.is_multi_region() {
        rows.push(row("Countries", &escape_html(&prefs.regions.join(", "))));
    }
    if !filters.location_types.is_empty() {
        let names: Vec<&str> = filters.location_types.iter().map(|t| t.as_str()).collect();
        rows.push(row("Location type", &names.join(", ")));
    }
    if !filters.position_types.is_empty() {
        let names: Vec<&str> = filters.position_types.iter().map(|t| t.as_str()).collect();
        rows.push(row("Position type", &names.join(", ")));
    }
    if let Some(salary) = filters.minimum_salary {
        rows.push(row("Min. salary", &format!("{} (annual)", format_thousands(salary))));
    }
    if let Some(industry) = filters.industry.as_deref().filter(|i| !i.trim().is_empty()) {
        rows.push(row("Industry", &escape_html(industry)));
    }
    if filters.language != crate::filter::ANY_LANGUAGE {
        rows.push(row("Job ad language", &escape_html(&filters.language)));
    }
    rows.join("\n        ")
}

fn job_card(job: &ExtractedJob, index: usize) -> String {
    let location = if job.location.is_empty() {
        "Not specified"
    } else {
        job.location.as_str()
    };

    let mut meta = vec![
        row("Location", &escape_html(location)),
        row("Country", &escape_html(&job.job_country)),
        row("Location type", job.location_type.as_str()),
        row("Position type", job.position_type.as_str()),
    ];
    if let Some(salary) = job.minimum_salary {
        meta.push(row("Min. salary", &format!("{} (annual)", format_thousands(salary))));
    }
    meta.push(row("Industry", &escape_html(&job.industry)));
    meta.push(row("Job ad language", &escape_html(&job.job_spec_language)));
    if !job.tech_stack.is_empty() {
        let tags: String = job
            .tech_stack
            .iter()
            .map(|t| format!("<span class=\"tag\">{}</span>", escape_html(t)))
            .collect();
        meta.push(format!("<tr><th>Tech stack</th><td class=\"tags\">{}</td></tr>", tags));
    }

    let requirements = if job.requirements.is_empty() {
        String::new()
    } else {
        let items: String = job
            .requirements
            .iter()
            .take(HTML_MAX_REQUIREMENTS)
            .map(|r| {
                let text = truncate_chars(r, HTML_REQUIREMENT_MAX_CHARS);
                format!("<li>{}</li>", escape_html(&text))
            })
            .collect();
        format!(
            "<div class=\"reqs\"><strong>Key requirements</strong><ul>{}</ul></div>",
            items
        )
    };

    let apply = job
        .job_link
        .as_deref()
        .map(|link| {
            format!(
                "<a class=\"apply-btn\" href=\"{}\" target=\"_blank\" rel=\"noopener\">Apply</a>",
                escape_html(link)
            )
        })
        .unwrap_or_default();

    format!(
        r#"
    <div class="card">
      <div class="card-header">
        <span class="job-num">#{num}</span>
        <div>
          <div class="job-title">{title}</div>
          <div class="company">{company}</div>
        </div>
      </div>
      <table class="meta">
        {meta}
      </table>
      {requirements}
      {apply}
    </div>"#,
        num = index + 1,
        title = escape_html(&job.role),
        company = escape_html(&job.employer_name),
        meta = meta.join("\n        "),
        requirements = requirements,
        apply = apply,
    )
}

const HTML_STYLE: &str = r#"
    *, *::before, *::after { box-sizing: border-box; margin: 0; padding: 0; }
    body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif; background: #f4f6f9; color: #222; padding: 2rem 1rem; }
    header, .cards, footer { max-width: 860px; margin: 0 auto; }
    header { margin-bottom: 2rem; }
    header h1 { font-size: 1.7rem; color: #1a1a2e; margin-bottom: 1rem; }
    .criteria, .card { background: #fff; border-radius: 10px; box-shadow: 0 2px 8px rgba(0,0,0,.08); padding: 1.2rem 1.5rem; }
    .criteria th, table.meta th { text-align: left; width: 140px; padding: 0.25rem 0.6rem 0.25rem 0; color: #666; vertical-align: top; }
    .run-meta { font-size: 0.8rem; color: #888; margin-top: 0.5rem; }
    .cards { display: flex; flex-direction: column; gap: 1.25rem; }
    .card-header { display: flex; gap: 1rem; margin-bottom: 1rem; }
    .job-num { background: #e8edf5; color: #3a5a8c; font-weight: 700; font-size: 0.8rem; padding: 0.25rem 0.55rem; border-radius: 6px; }
    .job-title { font-size: 1.15rem; font-weight: 700; color: #1a1a2e; }
    .company { color: #555; }
    table.meta { border-collapse: collapse; width: 100%; font-size: 0.88rem; margin-bottom: 0.9rem; }
    td.tags { display: flex; flex-wrap: wrap; gap: 0.35rem; }
    .tag { background: #e8f0fe; color: #2a5aad; font-size: 0.78rem; padding: 0.18rem 0.55rem; border-radius: 20px; }
    .reqs { font-size: 0.88rem; margin-bottom: 1rem; }
    .reqs ul { padding-left: 1.2rem; }
    .apply-btn { display: inline-block; background: #2a5aad; color: #fff; text-decoration: none; padding: 0.45rem 1.1rem; border-radius: 7px; font-weight: 600; }
    footer { margin-top: 2rem; font-size: 0.8rem; color: #999; text-align: center; }
"#;

pub fn render_html(jobs: &[ExtractedJob], prefs: &SearchPreferences, timestamp: &str) -> String {
    let cards: String = jobs
        .iter()
        .enumerate()
        .map(|(i, job)| job_card(job, i))
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>Job results: {role}</title>
  <style>{style}</style>
</head>
<body>
  <header>
    <h1>Job results: {role}</h1>
    <div class="criteria">
      <table>
        {criteria}
      </table>
    </div>
    <div class="run-meta">{total} job(s) after filtering &middot; Run: {timestamp}</div>
  </header>
  <div class="cards">{cards}
  </div>
  <footer>Generated by job-hunter</footer>
</body>
</html>
"#,
        role = escape_html(&prefs.role),
        style = HTML_STYLE,
        criteria = criteria_rows(prefs),
        total = jobs.len(),
        timestamp = escape_html(timestamp),
        cards = cards,
    )
}

/// Render and write every requested file kind once, then open the
/// `*_LAUNCH` ones when `allow_launch` is set. Returns the written paths.
pub async fn write_exports(
    jobs: &[ExtractedJob],
    prefs: &SearchPreferences,
    results_dir: &Path,
    timestamp: &str,
    allow_launch: bool,
) -> Result<Vec<PathBuf>> {
    let prefix = export_prefix(prefs, timestamp);
    let mut written: Vec<(ExportKind, PathBuf)> = Vec::new();

    for kind in [ExportKind::Json, ExportKind::Csv, ExportKind::Html] {
        if !prefs.output.iter().any(|o| o.kind() == kind) {
            continue;
        }

        let content = match kind {
            ExportKind::Json => render_json(jobs)?,
            ExportKind::Csv => render_csv(jobs)?,
            ExportKind::Html => render_html(jobs, prefs, timestamp),
        };
        let path = results_dir.join(format!("{}_jobs.{}", prefix, kind.extension()));
        FsOps::write_file_safe(&path, &content).await?;
        written.push((kind, path));
    }

    if allow_launch {
        for (kind, path) in &written {
            let wants_launch = prefs
                .output
                .iter()
                .any(|o| o.kind() == *kind && o.launches());
            if wants_launch {
                if let Err(e) = open_in_system(path) {
                    app_log!(warn, "Could not open {}: {:#}", path.display(), e);
                    println!("Warning: could not open '{}': {}", path.display(), e);
                }
            }
        }
    }

    Ok(written.into_iter().map(|(_, path)| path).collect())
}

/// Open a file with the desktop's default handler. The viewer runs detached;
/// its `Child` handle is dropped without waiting so the run can finish.
pub fn open_in_system(path: &Path) -> Result<()> {
    let resolved = path
        .canonicalize()
        .with_context(|| format!("Cannot resolve {}", path.display()))?;

    let mut command = if cfg!(target_os = "windows") {
        let mut c = std::process::Command::new("cmd");
        c.args(["/C", "start", ""]);
        c
    } else if cfg!(target_os = "macos") {
        std::process::Command::new("open")
    } else {
        std::process::Command::new("xdg-open")
    };

    command
        .arg(&resolved)
        .spawn()
        .with_context(|| format!("Failed to launch viewer for {}", resolved.display()))?;
    app_log!(info, "Opened {}", resolved.display());
    Ok(())
}

/// "Exported to a, b and c"
pub fn exported_message(paths: &[PathBuf]) -> Option<String> {
    let names: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
    match names.as_slice() {
        [] => None,
        [only] => Some(format!("Exported to {}", only)),
        [init @ .., last] => Some(format!("Exported to {} and {}", init.join(", "), last)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DatePosted, LocationType, NormalizedJob, PositionType};

    fn job() -> ExtractedJob {
        ExtractedJob {
            role: "Android <Lead>".to_string(),
            employer_name: "Acme & Co".to_string(),
            location: "Berlin".to_string(),
            job_country: "DE".to_string(),
            location_type: LocationType::Remote,
            position_type: PositionType::Permanent,
            minimum_salary: Some(60000),
            industry: "unknown".to_string(),
            job_spec_language: "en".to_string(),
            tech_stack: vec!["Kotlin".to_string(), "Jetpack Compose".to_string()],
            requirements: vec!["x".repeat(150), "Git".to_string()],
            job_link: Some("https://example.com/apply?a=1&b=2".to_string()),
            source: NormalizedJob::default(),
        }
    }

    #[test]
    fn test_output_format_parse() {
        assert_eq!(OutputFormat::parse("json"), Some(OutputFormat::Json));
        assert_eq!(OutputFormat::parse(" html_launch "), Some(OutputFormat::HtmlLaunch));
        assert_eq!(OutputFormat::parse("xml"), None);
        assert!(OutputFormat::CsvLaunch.launches());
        assert_eq!(OutputFormat::CsvLaunch.extension(), "csv");
    }

    #[test]
    fn test_export_prefix() {
        let prefs = SearchPreferences {
            date_posted: DatePosted::Week,
            ..SearchPreferences::new("Android Developer", "")
        };
        assert_eq!(
            export_prefix(&prefs, "20250301_120000"),
            "android-developer-any-week-20250301_120000"
        );

        let multi = SearchPreferences {
            regions: vec!["DE".to_string()],
            ..SearchPreferences::new("Android Developer", "Europe")
        };
        assert!(export_prefix(&multi, "t").starts_with("android-developer-europe-any-"));
    }

    #[test]
    fn test_render_json_omits_source() {
        let text = render_json(&[job()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["employer_name"], "Acme & Co");
        assert!(value[0].get("source").is_none());
    }

    #[test]
    fn test_render_csv() {
        let text = render_csv(&[job()]).unwrap();
        let mut reader = csv::Reader::from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.len(), CSV_COLUMNS.len());

        let record = reader.records().next().unwrap().unwrap();
        assert_eq!(&record[3], "DE");
        assert_eq!(&record[6], "60000");
        assert_eq!(&record[9], "Kotlin; Jetpack Compose");
        assert_eq!(&record[10], format!("{}; Git", "x".repeat(100)));
    }

    #[test]
    fn test_render_html_escapes_text() {
        let prefs = SearchPreferences::new("Android <Dev>", "Berlin");
        let html = render_html(&[job()], &prefs, "20250301_120000");
        assert!(html.contains("Android &lt;Lead&gt;"));
        assert!(html.contains("Acme &amp; Co"));
        assert!(html.contains("a=1&amp;b=2"));
        assert!(html.contains("60,000 (annual)"));
        assert!(!html.contains("<Lead>"));
    }

    #[test]
    fn test_exported_message() {
        assert_eq!(exported_message(&[]), None);
        let paths = vec![PathBuf::from("a.json"), PathBuf::from("a.csv"), PathBuf::from("a.html")];
        assert_eq!(
            exported_message(&paths).unwrap(),
            "Exported to a.json, a.csv and a.html"
        );
    }

    #[tokio::test]
    async fn test_write_exports_dedups_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let prefs = SearchPreferences {
            output: vec![OutputFormat::Json, OutputFormat::JsonLaunch, OutputFormat::Html],
            ..SearchPreferences::new("Android Developer", "Berlin")
        };
        let written = write_exports(&[job()], &prefs, dir.path(), "20250301_120000", false)
            .await
            .unwrap();
        assert_eq!(written.len(), 2);
        assert!(written[0].ends_with("android-developer-berlin-any-20250301_120000_jobs.json"));
        assert!(written[1].extension().is_some_and(|e| e == "html"));
        assert!(written.iter().all(|p| p.exists()));
    }
}
