// src/filter.rs
//! Post-fetch filtering of extracted jobs against user criteria

use crate::types::{ExtractedJob, LocationType, PositionType};
use serde::{Deserialize, Serialize};

pub const ANY_LANGUAGE: &str = "any";
pub const DEFAULT_LANGUAGE: &str = "en";

/// Criteria applied after fetching. Empty sets and `None` mean "no filter".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    pub location_types: Vec<LocationType>,
    pub position_types: Vec<PositionType>,
    pub minimum_salary: Option<u64>,
    pub industry: Option<String>,
    /// ISO 639-1 code, or `any`.
    pub language: String,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            location_types: Vec::new(),
            position_types: Vec::new(),
            minimum_salary: None,
            industry: None,
            language: DEFAULT_LANGUAGE.to_string(),
        }
    }
}

impl FilterCriteria {
    /// Criteria that let every job through.
    pub fn pass_all() -> Self {
        Self {
            language: ANY_LANGUAGE.to_string(),
            ..Self::default()
        }
    }

    pub fn matches(&self, job: &ExtractedJob) -> bool {
        self.passes_location_type(job)
            && self.passes_position_type(job)
            && self.passes_minimum_salary(job)
            && self.passes_industry(job)
            && self.passes_language(job)
    }

    fn passes_location_type(&self, job: &ExtractedJob) -> bool {
        self.location_types.is_empty() || self.location_types.contains(&job.location_type)
    }

    fn passes_position_type(&self, job: &ExtractedJob) -> bool {
        self.position_types.is_empty() || self.position_types.contains(&job.position_type)
    }

    /// A job without salary data is never excluded for that reason alone.
    fn passes_minimum_salary(&self, job: &ExtractedJob) -> bool {
        match (self.minimum_salary, job.minimum_salary) {
            (None, _) | (Some(_), None) => true,
            (Some(threshold), Some(salary)) => salary >= threshold,
        }
    }

    fn passes_industry(&self, job: &ExtractedJob) -> bool {
        match self.industry.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(wanted) => job
                .industry
                .to_lowercase()
                .contains(&wanted.to_lowercase()),
        }
    }

    fn passes_language(&self, job: &ExtractedJob) -> bool {
        let wanted = self.language.trim().to_lowercase();
        let wanted = if wanted.is_empty() {
            DEFAULT_LANGUAGE.to_string()
        } else {
            wanted
        };
        wanted == ANY_LANGUAGE || job.job_spec_language.to_lowercase() == wanted
    }
}

/// Keep the jobs matching every criterion, preserving order.
pub fn filter_jobs(jobs: Vec<ExtractedJob>, criteria: &FilterCriteria) -> Vec<ExtractedJob> {
    jobs.into_iter().filter(|job| criteria.matches(job)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{NormalizedJob, UNKNOWN};

    fn job(role: &str) -> ExtractedJob {
        ExtractedJob {
            role: role.to_string(),
            employer_name: "Acme".to_string(),
            location: "Berlin".to_string(),
            job_country: "DE".to_string(),
            location_type: LocationType::Remote,
            position_type: PositionType::Permanent,
            minimum_salary: None,
            industry: UNKNOWN.to_string(),
            job_spec_language: "en".to_string(),
            tech_stack: vec![],
            requirements: vec![],
            job_link: None,
            source: NormalizedJob::default(),
        }
    }

    fn with_salary(salary: Option<u64>) -> ExtractedJob {
        ExtractedJob {
            minimum_salary: salary,
            ..job("salaried")
        }
    }

    #[test]
    fn test_salary_filter_inclusiveness() {
        let criteria = FilterCriteria {
            minimum_salary: Some(50000),
            ..FilterCriteria::pass_all()
        };
        assert!(criteria.matches(&with_salary(None)));
        assert!(!criteria.matches(&with_salary(Some(49999))));
        assert!(criteria.matches(&with_salary(Some(50000))));
    }

    #[test]
    fn test_empty_sets_pass_everything() {
        let mut unknown = job("unknown");
        unknown.location_type = LocationType::Unknown;
        unknown.position_type = PositionType::Unknown;
        assert!(FilterCriteria::pass_all().matches(&unknown));
    }

    #[test]
    fn test_unknown_excluded_by_concrete_filter() {
        let mut unknown = job("unknown");
        unknown.location_type = LocationType::Unknown;
        let criteria = FilterCriteria {
            location_types: vec![LocationType::Remote, LocationType::Hybrid],
            ..FilterCriteria::pass_all()
        };
        assert!(!criteria.matches(&unknown));

        let industry = FilterCriteria {
            industry: Some("fin".to_string()),
            ..FilterCriteria::pass_all()
        };
        assert!(!industry.matches(&job("no industry")));
    }

    #[test]
    fn test_industry_substring_case_insensitive() {
        let mut finance = job("finance");
        finance.industry = "Finance / Insurance".to_string();
        let criteria = FilterCriteria {
            industry: Some("  INSURANCE ".to_string()),
            ..FilterCriteria::pass_all()
        };
        assert!(criteria.matches(&finance));
    }

    #[test]
    fn test_language_exact_and_any() {
        let mut german = job("german");
        german.job_spec_language = "de".to_string();

        let english_only = FilterCriteria::default();
        assert!(!english_only.matches(&german));
        assert!(english_only.matches(&job("english")));
        assert!(FilterCriteria::pass_all().matches(&german));

        let mut unknown = job("empty");
        unknown.job_spec_language = UNKNOWN.to_string();
        assert!(!english_only.matches(&unknown));
    }

    #[test]
    fn test_filter_is_idempotent_and_order_preserving() {
        let mut onsite = job("b");
        onsite.location_type = LocationType::OnSite;
        let jobs = vec![job("a"), onsite, job("c"), with_salary(Some(10))];
        let criteria = FilterCriteria {
            location_types: vec![LocationType::Remote],
            minimum_salary: Some(100),
            ..FilterCriteria::default()
        };

        let once = filter_jobs(jobs, &criteria);
        let roles: Vec<&str> = once.iter().map(|j| j.role.as_str()).collect();
        assert_eq!(roles, vec!["a", "c"]);

        let twice = filter_jobs(once.clone(), &criteria);
        assert_eq!(twice, once);
    }
}
