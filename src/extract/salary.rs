// src/extract/salary.rs
//! Annual minimum salary from structured fields or free text

use crate::types::NormalizedJob;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Below this, a figure with no stated period is not taken as a salary.
const MIN_PLAUSIBLE_WITHOUT_PERIOD: f64 = 1000.0;

/// Characters after a figure searched for a period word.
const PERIOD_WINDOW_CHARS: usize = 40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayPeriod {
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl PayPeriod {
    pub fn annual_multiplier(&self) -> f64 {
        match self {
            Self::Hour => 2080.0,
            Self::Day => 260.0,
            Self::Week => 52.0,
            Self::Month => 12.0,
            Self::Year => 1.0,
        }
    }

    /// Structured period values such as `HOUR`, `monthly` or `annual`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "hour" | "hourly" | "hr" | "h" => Some(Self::Hour),
            "day" | "daily" => Some(Self::Day),
            "week" | "weekly" => Some(Self::Week),
            "month" | "monthly" => Some(Self::Month),
            "year" | "yearly" | "annual" | "annually" | "yr" | "annum" => Some(Self::Year),
            _ => None,
        }
    }
}

const CURRENCY: &str = r"(?:[$€£]|usd|eur|gbp|chf)";
/// `45 000` (space or no-break space groups), `60,000`, `60.000`, `60k`.
const AMOUNT: &str = r"(?:\d{1,3}(?:[ \x{a0}]\d{3})+(?:[.,]\d{1,2})?|\d[\d.,]*)(?:\s?[kK]\b)?";

static PREFIX_FIGURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i){cur}\s?(?P<amount>{amt})(?:\s?(?:-|–|to|bis|a)\s?{cur}?\s?{amt})?",
        cur = CURRENCY,
        amt = AMOUNT
    ))
    .expect("valid regex")
});

static SUFFIX_FIGURE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r"(?i)(?P<amount>\b{amt})(?:\s?(?:-|–|to|bis|a)\s?{amt})?\s?(?:[€£$]|\b(?:eur|euros?|gbp|usd|chf)\b)",
        amt = AMOUNT
    ))
    .expect("valid regex")
});

static PERIOD_PATTERNS: Lazy<Vec<(PayPeriod, Regex)>> = Lazy::new(|| {
    [
        (
            PayPeriod::Hour,
            r"(?i)(?:\b(?:per|an|a|pro)\s|/\s?)(?:hour|hr|h|stunde)\b|\bhourly\b|stundenlohn",
        ),
        (
            PayPeriod::Day,
            r"(?i)(?:\b(?:per|a|pro)\s|/\s?)(?:day|tag|jour|d[íi]a)\b|\bdaily\b|\bday rate\b|tagessatz",
        ),
        (
            PayPeriod::Week,
            r"(?i)(?:\b(?:per|a|pro)\s|/\s?)(?:week|woche|semaine|semana)\b|\bweekly\b",
        ),
        (
            PayPeriod::Month,
            r"(?i)(?:\b(?:per|a|pro|par|al)\s|/\s?)(?:month|mo|monat|mois|mes)\b|\bmonthly\b|monatlich|mensuel",
        ),
        (
            PayPeriod::Year,
            r"(?i)(?:\b(?:per|a|pro|par|al)\s|/\s?)(?:year|yr|annum|jahr|an|a[ñn]o)\b|\bannual|\byearly\b|\bp\.a\.|annuel",
        ),
    ]
    .into_iter()
    .map(|(period, pattern)| (period, Regex::new(pattern).expect("valid regex")))
    .collect()
});

/// Structured min (or max alone), else the first currency-anchored figure
/// in the description or highlights, annualized.
pub fn minimum_salary(job: &NormalizedJob) -> Option<u64> {
    if let Some(value) = job.salary.min.or(job.salary.max) {
        let period = job.salary.period.as_deref().and_then(PayPeriod::parse);
        return annualize(value, period);
    }

    let mut text = job.description.clone();
    for items in job.highlights.values() {
        text.push('\n');
        text.push_str(&items.join("\n"));
    }
    salary_from_text(&text)
}

fn annualize(value: f64, period: Option<PayPeriod>) -> Option<u64> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    match period {
        Some(period) => Some((value * period.annual_multiplier()).round() as u64),
        None if value < MIN_PLAUSIBLE_WITHOUT_PERIOD => None,
        None => Some(value.round() as u64),
    }
}

pub fn salary_from_text(text: &str) -> Option<u64> {
    let first = [&*PREFIX_FIGURE, &*SUFFIX_FIGURE]
        .into_iter()
        .filter_map(|pattern| pattern.captures(text))
        .min_by_key(|caps| caps.get(0).map(|m| m.start()).unwrap_or(usize::MAX))?;

    let value = parse_amount(first.name("amount")?.as_str())?;
    let period = period_after(text, &first);
    annualize(value, period)
}

/// The period word nearest to the figure within the window.
fn period_after(text: &str, caps: &Captures<'_>) -> Option<PayPeriod> {
    let end = caps.get(0)?.end();
    let window: String = text[end..].chars().take(PERIOD_WINDOW_CHARS).collect();
    PERIOD_PATTERNS
        .iter()
        .filter_map(|(period, pattern)| pattern.find(&window).map(|m| (m.start(), *period)))
        .min_by_key(|(start, _)| *start)
        .map(|(_, period)| period)
}

/// Parse `60,000`, `60.000`, `60k`, `1.5k` or `55,000.50`.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let (digits, scale) = match compact.strip_suffix(['k', 'K']) {
        Some(rest) => (rest, 1000.0),
        None => (compact.as_str(), 1.0),
    };
    let digits = digits.trim_end_matches(['.', ',']);

    let last_comma = digits.rfind(',');
    let last_dot = digits.rfind('.');
    let normalized = match (last_comma, last_dot) {
        (Some(c), Some(d)) if c > d => digits.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => digits.replace(',', ""),
        (Some(_), None) => separator_as_thousands_or_decimal(digits, ','),
        (None, Some(_)) => separator_as_thousands_or_decimal(digits, '.'),
        (None, None) => digits.to_string(),
    };

    normalized
        .parse::<f64>()
        .ok()
        .map(|v| v * scale)
        .filter(|v| v.is_finite())
}

/// A single separator followed by exactly three digits groups thousands;
/// anything else is a decimal point.
fn separator_as_thousands_or_decimal(digits: &str, sep: char) -> String {
    let groups: Vec<&str> = digits.split(sep).collect();
    let grouped = groups.len() > 2 || groups.last().is_some_and(|g| g.len() == 3);
    if grouped {
        groups.concat()
    } else {
        digits.replace(sep, ".")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SalaryFields;

    fn structured(min: Option<f64>, max: Option<f64>, period: Option<&str>) -> NormalizedJob {
        NormalizedJob {
            salary: SalaryFields {
                min,
                max,
                period: period.map(str::to_string),
                currency: None,
            },
            ..Default::default()
        }
    }

    fn described(text: &str) -> NormalizedJob {
        NormalizedJob {
            description: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_structured_annualization() {
        assert_eq!(minimum_salary(&structured(Some(60000.0), None, Some("YEAR"))), Some(60000));
        assert_eq!(minimum_salary(&structured(Some(50.0), None, Some("HOUR"))), Some(104000));
        assert_eq!(minimum_salary(&structured(Some(4000.0), None, Some("MONTH"))), Some(48000));
        assert_eq!(minimum_salary(&structured(None, Some(500.0), Some("day"))), Some(130000));
        assert_eq!(minimum_salary(&structured(Some(55000.0), Some(70000.0), None)), Some(55000));
    }

    #[test]
    fn test_small_figure_without_period_is_discarded() {
        assert_eq!(minimum_salary(&structured(Some(45.0), None, None)), None);
        assert_eq!(minimum_salary(&described("Budget: €45 for lunch")), None);
    }

    #[test]
    fn test_free_text_figures() {
        assert_eq!(salary_from_text("Salary: $80,000 - $100,000 per year"), Some(80000));
        assert_eq!(salary_from_text("Gehalt 55.000 € bis 65.000 € brutto"), Some(55000));
        assert_eq!(salary_from_text("Rate: £450 per day outside IR35"), Some(117000));
        assert_eq!(salary_from_text("€60k-€75k plus bonus"), Some(60000));
        assert_eq!(salary_from_text("We pay $40/hour"), Some(83200));
        assert_eq!(salary_from_text("3 years of experience with 2 teams"), None);
    }

    #[test]
    fn test_nearest_period_wins() {
        assert_eq!(
            salary_from_text("Salary €60,000 per year, 40 hours per week"),
            Some(60000)
        );
        assert_eq!(
            salary_from_text("$100,000 annually + $500 per day travel"),
            Some(100000)
        );
        assert_eq!(salary_from_text("€400 per day, 5 days per week"), Some(104000));
    }

    #[test]
    fn test_space_grouped_thousands() {
        assert_eq!(salary_from_text("Salaire : 45 000 € par an"), Some(45000));
        assert_eq!(salary_from_text("Sueldo 38\u{a0}000 € al año"), Some(38000));
        assert_eq!(salary_from_text("Founded in 2024 500 € bonus"), None);
    }

    #[test]
    fn test_first_figure_wins() {
        let text = "Budget €70,000 for hardware. Salary from 50.000 EUR per year.";
        assert_eq!(salary_from_text(text), Some(70000));
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("60,000"), Some(60000.0));
        assert_eq!(parse_amount("60.000"), Some(60000.0));
        assert_eq!(parse_amount("1.5k"), Some(1500.0));
        assert_eq!(parse_amount("55,000.50"), Some(55000.5));
        assert_eq!(parse_amount("55.000,50"), Some(55000.5));
        assert_eq!(parse_amount("1,234,567"), Some(1234567.0));
        assert_eq!(parse_amount("12.5"), Some(12.5));
        assert_eq!(parse_amount("45 000"), Some(45000.0));
    }
}
