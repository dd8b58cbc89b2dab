// src/preferences/prompt.rs
//! Interactive preference collection on a terminal

use super::{normalize_regions, parse_choices, SearchPreferences};
use crate::filter::{FilterCriteria, ANY_LANGUAGE, DEFAULT_LANGUAGE};
use crate::types::{DatePosted, LocationType, PositionType};
use anyhow::{Context, Result};
use std::io::{BufRead, Write};

/// Typed at a list prompt to clear a default.
const CLEAR_TOKEN: &str = "none";

/// Ask for role, location and filters. Blank answers keep the defaults
/// (from `config.yaml` when present, otherwise the built-in ones).
pub fn collect_preferences<R, W>(
    defaults: Option<&SearchPreferences>,
    input: &mut R,
    output: &mut W,
) -> Result<SearchPreferences>
where
    R: BufRead,
    W: Write,
{
    let fallback = SearchPreferences::default();
    let defaults = defaults.unwrap_or(&fallback);
    let mut prompt = Prompter { input, output };

    let role = prompt.ask("Role", &defaults.role)?;
    let role = if role.is_empty() {
        defaults.role.clone()
    } else {
        role
    };

    let location = prompt.ask("Location (leave empty for any)", &defaults.location)?;
    let location = if location.is_empty() {
        defaults.location.clone()
    } else {
        location
    };

    let regions_raw = prompt.ask(
        "Country codes for multi-region search (comma-separated, e.g. de,fr; 'none' to clear)",
        &defaults.regions.join(","),
    )?;
    let regions = match regions_raw.as_str() {
        "" => defaults.regions.clone(),
        CLEAR_TOKEN => Vec::new(),
        raw => normalize_regions(raw.split(',')),
    };

    let date_raw = prompt.ask(
        "Date posted (any, today, 3days, week, month)",
        defaults.date_posted.as_str(),
    )?;
    let date_posted = DatePosted::parse(&date_raw).unwrap_or(defaults.date_posted);

    let location_types = prompt.ask_choices(
        "Location types filter (comma-separated: on-site, hybrid, remote)",
        &defaults.filters.location_types,
        LocationType::parse_choice,
    )?;

    let position_types = prompt.ask_choices(
        "Position types filter (comma-separated: permanent, contract, freelance)",
        &defaults.filters.position_types,
        PositionType::parse_choice,
    )?;

    let salary_default = defaults
        .filters
        .minimum_salary
        .map(|s| s.to_string())
        .unwrap_or_default();
    let salary_raw = prompt.ask("Minimum salary filter (number, 'none' for no minimum)", &salary_default)?;
    let minimum_salary = match salary_raw.as_str() {
        "" => defaults.filters.minimum_salary,
        CLEAR_TOKEN => None,
        raw => raw.replace([',', '_'], "").parse().ok(),
    };

    let industry_default = defaults.filters.industry.clone().unwrap_or_default();
    let industry_raw = prompt.ask("Industry filter (free text, 'none' for no filtering)", &industry_default)?;
    let industry = match industry_raw.as_str() {
        "" => defaults.filters.industry.clone(),
        CLEAR_TOKEN => None,
        raw => Some(raw.to_string()),
    };

    let language_raw = prompt.ask(
        &format!("Job spec language filter [{}/{}]", DEFAULT_LANGUAGE, ANY_LANGUAGE),
        &defaults.filters.language,
    )?;
    let language = if language_raw.is_empty() {
        defaults.filters.language.clone()
    } else {
        language_raw.to_lowercase()
    };

    Ok(SearchPreferences {
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
        output: defaults.output.clone(),
    })
}

struct Prompter<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Prompter<'_, R, W> {
    /// Print `label [default]: ` and return the trimmed answer ("" on EOF).
    fn ask(&mut self, label: &str, default: &str) -> Result<String> {
        write!(self.output, "{} [{}]: ", label, default).context("Failed to write prompt")?;
        self.output.flush().context("Failed to flush prompt")?;

        let mut line = String::new();
        self.input
            .read_line(&mut line)
            .context("Failed to read answer")?;
        Ok(line.trim().to_string())
    }

    fn ask_choices<T>(
        &mut self,
        label: &str,
        defaults: &[T],
        parse: fn(&str) -> Option<T>,
    ) -> Result<Vec<T>>
    where
        T: PartialEq + Clone + std::fmt::Display,
    {
        let shown: Vec<String> = defaults.iter().map(ToString::to_string).collect();
        let raw = self.ask(&format!("{}; 'none' to clear", label), &shown.join(", "))?;
        Ok(match raw.as_str() {
            "" => defaults.to_vec(),
            CLEAR_TOKEN => Vec::new(),
            raw => parse_choices(raw, parse),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn run(answers: &str, defaults: Option<&SearchPreferences>) -> (SearchPreferences, String) {
        let mut input = Cursor::new(answers.as_bytes().to_vec());
        let mut output = Vec::new();
        let prefs = collect_preferences(defaults, &mut input, &mut output).unwrap();
        (prefs, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_blank_answers_use_builtin_defaults() {
        let (prefs, shown) = run("", None);
        assert_eq!(prefs, SearchPreferences::default());
        assert!(shown.starts_with("Role [Android Developer]: "));
    }

    #[test]
    fn test_answers_override_defaults() {
        let answers = "Rust Developer\nBerlin\nde, fr\nweek\nremote,hybrid\ncontract\n55,000\nfintech\nANY\n";
        let (prefs, _) = run(answers, None);
        assert_eq!(prefs.role, "Rust Developer");
        assert_eq!(prefs.location, "Berlin");
        assert_eq!(prefs.regions, vec!["DE", "FR"]);
        assert_eq!(prefs.date_posted, DatePosted::Week);
        assert_eq!(
            prefs.filters.location_types,
            vec![LocationType::Remote, LocationType::Hybrid]
        );
        assert_eq!(prefs.filters.position_types, vec![PositionType::Contract]);
        assert_eq!(prefs.filters.minimum_salary, Some(55000));
        assert_eq!(prefs.filters.industry.as_deref(), Some("fintech"));
        assert_eq!(prefs.filters.language, "any");
    }

    #[test]
    fn test_none_clears_file_defaults() {
        let defaults = SearchPreferences {
            regions: vec!["DE".to_string()],
            filters: FilterCriteria {
                location_types: vec![LocationType::Remote],
                minimum_salary: Some(70000),
                ..FilterCriteria::default()
            },
            ..SearchPreferences::default()
        };
        let (prefs, _) = run("\n\nnone\n\nnone\n\nnone\n\n\n", Some(&defaults));
        assert!(prefs.regions.is_empty());
        assert!(prefs.filters.location_types.is_empty());
        assert_eq!(prefs.filters.minimum_salary, None);
        assert_eq!(prefs.output, defaults.output);
    }
}
