// src/preferences/file.rs
//! Preferences from a YAML or TOML file

use super::{normalize_regions, SearchPreferences, DEFAULT_ROLE};
use crate::export::OutputFormat;
use crate::filter::{FilterCriteria, DEFAULT_LANGUAGE};
use crate::types::{DatePosted, LocationType, PositionType};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

/// A value that may be a single scalar or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Scalar>),
    One(Scalar),
}

impl OneOrMany {
    fn into_strings(self) -> Vec<String> {
        let items = match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        };
        items.into_iter().filter_map(Scalar::into_text).collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    fn into_text(self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    fn as_display(&self) -> Option<String> {
        match self {
            Self::Bool(_) => None,
            Self::Int(v) => Some(v.to_string()),
            Self::Float(v) => Some(v.to_string()),
            Self::Text(v) => Some(v.clone()),
        }
    }

    fn as_salary(&self) -> Option<u64> {
        match self {
            Self::Bool(_) => None,
            Self::Int(v) => u64::try_from(*v).ok(),
            Self::Float(v) if v.is_finite() && *v >= 0.0 => Some(v.trunc() as u64),
            Self::Float(_) => None,
            Self::Text(v) => {
                let cleaned: String = v
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, ',' | '_' | ' '))
                    .collect();
                cleaned.parse().ok()
            }
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PreferencesFile {
    role: Option<Scalar>,
    location: Option<Scalar>,
    #[serde(alias = "europe_countries")]
    regions: Option<OneOrMany>,
    date_posted: Option<Scalar>,
    location_types: Option<OneOrMany>,
    position_types: Option<OneOrMany>,
    minimum_salary: Option<Scalar>,
    #[serde(alias = "industry_filter")]
    industry: Option<Scalar>,
    #[serde(alias = "language_filter")]
    language: Option<Scalar>,
    output: Option<OneOrMany>,
}

impl PreferencesFile {
    fn into_preferences(self) -> SearchPreferences {
        let role = text_or(self.role, DEFAULT_ROLE);
        let location = text_or(self.location, "");

        let regions = self
            .regions
            .map(|r| normalize_regions(r.into_strings()))
            .unwrap_or_default();

        let date_posted = match self.date_posted.and_then(|d| d.as_display()) {
            None => DatePosted::Any,
            Some(raw) => DatePosted::parse(&raw).unwrap_or_else(|| {
                warn!("Unknown date_posted value '{}', using 'any'", raw);
                DatePosted::Any
            }),
        };

        let location_types = choices(self.location_types, LocationType::parse_choice);
        let position_types = choices(self.position_types, PositionType::parse_choice);
        let minimum_salary = self.minimum_salary.as_ref().and_then(Scalar::as_salary);

        let industry = self
            .industry
            .and_then(|i| i.as_display())
            .map(|i| i.trim().to_string())
            .filter(|i| !i.is_empty());

        let language = self
            .language
            .and_then(|l| l.as_display())
            .map(|l| l.trim().to_lowercase())
            .filter(|l| !l.is_empty())
            .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

        let output = match self.output {
            None => OutputFormat::defaults(),
            Some(values) => choices(Some(values), OutputFormat::parse),
        };

        SearchPreferences {
            role,
            location,
            regions,
            date_posted,
            filters: FilterCriteria {
                location_types,
                position_types,
                minimum_salary,
                industry,
                language,
            },
            output,
        }
    }
}

fn text_or(value: Option<Scalar>, default: &str) -> String {
    value
        .and_then(|v| v.as_display())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn choices<T: PartialEq>(value: Option<OneOrMany>, parse: fn(&str) -> Option<T>) -> Vec<T> {
    let mut selected = Vec::new();
    for raw in value.map(OneOrMany::into_strings).unwrap_or_default() {
        match parse(&raw) {
            Some(choice) if !selected.contains(&choice) => selected.push(choice),
            Some(_) => {}
            None => warn!("Ignoring unsupported value '{}'", raw),
        }
    }
    selected
}

/// Parse preferences from file content; the format follows the extension.
pub fn parse_preferences(content: &str, extension: &str) -> Result<SearchPreferences> {
    let file: PreferencesFile = match extension.to_lowercase().as_str() {
        "toml" => toml::from_str(content).context("Failed to parse TOML preferences")?,
        _ => {
            if content.trim().is_empty() {
                PreferencesFile::default()
            } else {
                let value: serde_yaml::Value =
                    serde_yaml::from_str(content).context("Failed to parse YAML preferences")?;
                if value.is_null() {
                    PreferencesFile::default()
                } else if !value.is_mapping() {
                    anyhow::bail!("Preferences file must define a mapping at the top level.");
                } else {
                    serde_yaml::from_value(value).context("Failed to read YAML preferences")?
                }
            }
        }
    };
    Ok(file.into_preferences())
}

/// Load preferences from `path` (`.yaml`, `.yml` or `.toml`).
pub fn load_preferences(path: &Path) -> Result<SearchPreferences> {
    if !path.exists() {
        anyhow::bail!("Config file not found: {}", path.display());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("yaml");

    let prefs = parse_preferences(&content, extension)
        .with_context(|| format!("Invalid config file: {}", path.display()))?;
    info!("Loaded preferences from {}", path.display());
    Ok(prefs)
}
