// src/preferences/mod.rs
//! Search preferences: what to query upstream and how to filter the results

pub mod file;
pub mod prompt;

pub use file::load_preferences;
pub use prompt::collect_preferences;

use crate::export::OutputFormat;
use crate::filter::FilterCriteria;
use crate::geo;
use crate::types::DatePosted;
use anyhow::Result;
use serde::Serialize;

pub const DEFAULT_ROLE: &str = "Android Developer";
pub const DEFAULT_LOCATION: &str = "";

/// Immutable input to one run. Both the prompt and the file paths build this.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchPreferences {
    pub role: String,
    /// Empty means "any location".
    pub location: String,
    /// Upper-case region codes. Non-empty activates multi-region mode.
    pub regions: Vec<String>,
    pub date_posted: DatePosted,
    pub filters: FilterCriteria,
    pub output: Vec<OutputFormat>,
}

impl Default for SearchPreferences {
    fn default() -> Self {
        Self {
            role: DEFAULT_ROLE.to_string(),
            location: DEFAULT_LOCATION.to_string(),
            regions: Vec::new(),
            date_posted: DatePosted::Any,
            filters: FilterCriteria::default(),
            output: OutputFormat::defaults(),
        }
    }
}

impl SearchPreferences {
    pub fn new(role: &str, location: &str) -> Self {
        Self {
            role: role.trim().to_string(),
            location: location.trim().to_string(),
            ..Self::default()
        }
    }

    pub fn is_multi_region(&self) -> bool {
        !self.regions.is_empty()
    }

    pub fn display_location(&self) -> &str {
        if self.location.trim().is_empty() {
            "any"
        } else {
            self.location.trim()
        }
    }

    /// Reject combinations that cannot produce a meaningful run.
    pub fn validate(&self) -> Result<()> {
        if self.role.trim().is_empty() {
            anyhow::bail!("Role must not be empty.");
        }

        if geo::is_europe_trigger(&self.location) && !self.is_multi_region() {
            anyhow::bail!(
                "European search mode requires at least one country code. \
                 Add at least one entry to 'regions' in the config file, \
                 or enter country codes at the prompt."
            );
        }

        if self.output.is_empty() {
            let allowed: Vec<&str> = OutputFormat::ALL.iter().map(|o| o.as_str()).collect();
            anyhow::bail!(
                "Output configuration is empty. Set at least one value in the 'output' \
                 field (allowed values: {}).",
                allowed.join(", ")
            );
        }

        Ok(())
    }
}

/// Keep valid region codes in first-seen order, upper-cased and deduplicated.
pub fn normalize_regions<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut regions = Vec::new();
    for value in values {
        match geo::normalize_region(value.as_ref()) {
            Some(code) if !regions.contains(&code) => regions.push(code),
            Some(_) => {}
            None => {
                if !value.as_ref().trim().is_empty() {
                    tracing::warn!("Ignoring invalid region code: {}", value.as_ref());
                }
            }
        }
    }
    regions
}

/// Parse a comma-separated list of choices, keeping only valid, unique entries.
pub fn parse_choices<T, F>(raw: &str, parse: F) -> Vec<T>
where
    T: PartialEq,
    F: Fn(&str) -> Option<T>,
{
    let mut selected = Vec::new();
    for part in raw.split(',') {
        if let Some(choice) = parse(part) {
            if !selected.contains(&choice) {
                selected.push(choice);
            }
        }
    }
    selected
}
