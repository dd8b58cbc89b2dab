// src/extract/position.rs
use crate::types::{NormalizedJob, PositionType};
use once_cell::sync::Lazy;
use regex::Regex;

static CONTRACT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(contract|contractor|fixed[- ]term|befristet(?:e|en|er)?|cdd|temporal|temporary)\b")
        .expect("valid regex")
});

static FREELANCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(freelance|freelancer|self[- ]employed|freiberuflich|aut[óo]nomo|ind[ée]pendant)\b")
        .expect("valid regex")
});

static PERMANENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(permanent|full[- ]?time|unbefristet(?:e|en|er)?|festanstellung|cdi|indefinido)\b")
        .expect("valid regex")
});

/// Map one employment-type value from the source.
fn lookup(value: &str) -> Option<PositionType> {
    let key: String = value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_uppercase();

    match key.as_str() {
        "FULLTIME" | "PARTTIME" | "PERMANENT" => Some(PositionType::Permanent),
        "CONTRACTOR" | "CONTRACT" | "TEMPORARY" => Some(PositionType::Contract),
        "FREELANCE" | "FREELANCER" => Some(PositionType::Freelance),
        _ => None,
    }
}

/// Contract > freelance > permanent when several types apply.
fn strongest(found: impl IntoIterator<Item = PositionType>) -> Option<PositionType> {
    let found: Vec<PositionType> = found.into_iter().collect();
    [
        PositionType::Contract,
        PositionType::Freelance,
        PositionType::Permanent,
    ]
    .into_iter()
    .find(|candidate| found.contains(candidate))
}

pub fn position_type(job: &NormalizedJob) -> PositionType {
    let listed = std::iter::once(job.employment_type.as_str())
        .chain(job.employment_types.iter().map(String::as_str))
        .flat_map(|value| value.split([',', '/', ';', '|']))
        .filter_map(lookup);

    if let Some(found) = strongest(listed) {
        return found;
    }

    let text = format!("{}\n{}", job.title, job.description);
    let mentioned = [
        (PositionType::Contract, &*CONTRACT),
        (PositionType::Freelance, &*FREELANCE),
        (PositionType::Permanent, &*PERMANENT),
    ]
    .into_iter()
    .filter(|(_, pattern)| pattern.is_match(&text))
    .map(|(kind, _)| kind);

    strongest(mentioned).unwrap_or(PositionType::Unknown)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(employment_type: &str, types: &[&str], description: &str) -> NormalizedJob {
        NormalizedJob {
            employment_type: employment_type.to_string(),
            employment_types: types.iter().map(|t| t.to_string()).collect(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_lookup_table() {
        assert_eq!(position_type(&job("FULLTIME", &[], "")), PositionType::Permanent);
        assert_eq!(position_type(&job("Full-time", &[], "")), PositionType::Permanent);
        assert_eq!(position_type(&job("Freelance", &[], "")), PositionType::Freelance);
        assert_eq!(position_type(&job("CONTRACTOR", &[], "")), PositionType::Contract);
    }

    #[test]
    fn test_several_types_use_priority() {
        let j = job("Full-time, Contractor", &["FULLTIME", "FREELANCE"], "");
        assert_eq!(position_type(&j), PositionType::Contract);
        let j = job("", &["FULLTIME", "FREELANCE"], "");
        assert_eq!(position_type(&j), PositionType::Freelance);
    }

    #[test]
    fn test_description_fallback() {
        let j = job("INTERN", &[], "12 month fixed-term engagement");
        assert_eq!(position_type(&j), PositionType::Contract);
        let j = job("", &[], "Unbefristete Stelle in Berlin");
        assert_eq!(position_type(&j), PositionType::Permanent);
        let j = job("", &[], "Befristete Stelle für 12 Monate");
        assert_eq!(position_type(&j), PositionType::Contract);
        assert_eq!(position_type(&job("", &[], "")), PositionType::Unknown);
    }
}
