// src/types/job.rs
//! Job records as they move through normalization and extraction

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value used for derived text fields that could not be determined.
pub const UNKNOWN: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationType {
    OnSite,
    Hybrid,
    Remote,
    Unknown,
}

impl LocationType {
    /// Choices a user may filter on.
    pub const CHOICES: [LocationType; 3] = [Self::OnSite, Self::Hybrid, Self::Remote];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OnSite => "on-site",
            Self::Hybrid => "hybrid",
            Self::Remote => "remote",
            Self::Unknown => UNKNOWN,
        }
    }

    /// Parse a user-supplied filter choice. `unknown` is not selectable.
    pub fn parse_choice(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "on-site" | "onsite" | "on site" => Some(Self::OnSite),
            "hybrid" => Some(Self::Hybrid),
            "remote" => Some(Self::Remote),
            _ => None,
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionType {
    Permanent,
    Contract,
    Freelance,
    Unknown,
}

impl PositionType {
    pub const CHOICES: [PositionType; 3] = [Self::Permanent, Self::Contract, Self::Freelance];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Permanent => "permanent",
            Self::Contract => "contract",
            Self::Freelance => "freelance",
            Self::Unknown => UNKNOWN,
        }
    }

    pub fn parse_choice(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "permanent" => Some(Self::Permanent),
            "contract" => Some(Self::Contract),
            "freelance" => Some(Self::Freelance),
            _ => None,
        }
    }
}

impl fmt::Display for PositionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Upstream "date posted" restriction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DatePosted {
    #[default]
    #[serde(rename = "any", alias = "all")]
    Any,
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "3days")]
    ThreeDays,
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "month")]
    Month,
}

impl DatePosted {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "any",
            Self::Today => "today",
            Self::ThreeDays => "3days",
            Self::Week => "week",
            Self::Month => "month",
        }
    }

    /// Value of the `date_posted` query parameter.
    pub fn api_value(&self) -> &'static str {
        match self {
            Self::Any => "all",
            other => other.as_str(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "" | "any" | "all" => Some(Self::Any),
            "today" => Some(Self::Today),
            "3days" | "3 days" | "three_days" => Some(Self::ThreeDays),
            "week" => Some(Self::Week),
            "month" => Some(Self::Month),
            _ => None,
        }
    }
}

impl fmt::Display for DatePosted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Salary values exactly as the source gave them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalaryFields {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub period: Option<String>,
    pub currency: Option<String>,
}

/// Source-agnostic job record. Text fields are empty strings when absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizedJob {
    pub job_id: Option<String>,
    pub title: String,
    pub company: String,
    pub description: String,
    pub location: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub is_remote: Option<bool>,
    pub employment_type: String,
    pub employment_types: Vec<String>,
    pub apply_link: Option<String>,
    pub listing_link: Option<String>,
    pub industry: Option<String>,
    pub salary: SalaryFields,
    pub highlights: BTreeMap<String, Vec<String>>,
    /// Region code the record was fetched for in multi-region mode.
    pub source_region: Option<String>,
    #[serde(skip)]
    pub raw: serde_json::Value,
}

impl NormalizedJob {
    pub fn highlight(&self, section: &str) -> &[String] {
        self.highlights
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(section))
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }
}

/// A normalized job enriched with derived fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedJob {
    pub role: String,
    pub employer_name: String,
    pub location: String,
    pub job_country: String,
    pub location_type: LocationType,
    pub position_type: PositionType,
    pub minimum_salary: Option<u64>,
    pub industry: String,
    pub job_spec_language: String,
    pub tech_stack: Vec<String>,
    pub requirements: Vec<String>,
    pub job_link: Option<String>,
    #[serde(skip)]
    pub source: NormalizedJob,
}
