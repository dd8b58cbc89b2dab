// src/geo.rs
//! Static place-name table used for upstream country hints and job country inference

/// Known cities, matched as whole words in a location string.
const CITY_COUNTRY: &[(&str, &str)] = &[
    ("berlin", "DE"),
    ("munich", "DE"),
    ("münchen", "DE"),
    ("hamburg", "DE"),
    ("frankfurt", "DE"),
    ("cologne", "DE"),
    ("köln", "DE"),
    ("stuttgart", "DE"),
    ("london", "GB"),
    ("manchester", "GB"),
    ("edinburgh", "GB"),
    ("paris", "FR"),
    ("lyon", "FR"),
    ("madrid", "ES"),
    ("barcelona", "ES"),
    ("valencia", "ES"),
    ("amsterdam", "NL"),
    ("rotterdam", "NL"),
    ("dublin", "IE"),
    ("vienna", "AT"),
    ("wien", "AT"),
    ("zurich", "CH"),
    ("zürich", "CH"),
    ("geneva", "CH"),
    ("lisbon", "PT"),
    ("porto", "PT"),
    ("milan", "IT"),
    ("rome", "IT"),
    ("warsaw", "PL"),
    ("krakow", "PL"),
    ("prague", "CZ"),
    ("stockholm", "SE"),
    ("copenhagen", "DK"),
    ("oslo", "NO"),
    ("helsinki", "FI"),
    ("brussels", "BE"),
    ("new york", "US"),
    ("san francisco", "US"),
    ("seattle", "US"),
    ("austin", "US"),
    ("toronto", "CA"),
    ("vancouver", "CA"),
];

/// Country names, checked after cities.
const COUNTRY_NAMES: &[(&str, &str)] = &[
    ("germany", "DE"),
    ("deutschland", "DE"),
    ("united kingdom", "GB"),
    ("uk", "GB"),
    ("england", "GB"),
    ("france", "FR"),
    ("spain", "ES"),
    ("españa", "ES"),
    ("netherlands", "NL"),
    ("ireland", "IE"),
    ("austria", "AT"),
    ("switzerland", "CH"),
    ("portugal", "PT"),
    ("italy", "IT"),
    ("poland", "PL"),
    ("sweden", "SE"),
    ("denmark", "DK"),
    ("belgium", "BE"),
    ("united states", "US"),
    ("usa", "US"),
    ("canada", "CA"),
];

/// Location values that mean "search several European countries".
pub const EUROPE_LOCATION_TRIGGERS: &[&str] = &["europe", "eu"];

pub fn is_europe_trigger(location: &str) -> bool {
    let lowered = location.trim().to_lowercase();
    EUROPE_LOCATION_TRIGGERS.contains(&lowered.as_str())
}

/// Infer an upper-case ISO 3166-1 alpha-2 code from free-form location text.
pub fn infer_country(location: &str) -> Option<&'static str> {
    let padded = word_padded(location);
    if padded.trim().is_empty() {
        return None;
    }

    CITY_COUNTRY
        .iter()
        .chain(COUNTRY_NAMES.iter())
        .find(|(name, _)| padded.contains(&format!(" {} ", name)))
        .map(|(_, code)| *code)
}

/// Accept a two-letter region code in any case; returns it upper-cased.
/// `UK` becomes the ISO code `GB`.
pub fn normalize_region(code: &str) -> Option<String> {
    let trimmed = code.trim();
    if trimmed.chars().count() != 2 || !trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    match trimmed.to_ascii_uppercase().as_str() {
        "UK" => Some("GB".to_string()),
        other => Some(other.to_string()),
    }
}

/// Resolve a country field that may hold either a code or a country name.
pub fn normalize_country_field(value: &str) -> Option<String> {
    normalize_region(value).or_else(|| infer_country(value).map(str::to_string))
}

fn word_padded(text: &str) -> String {
    let words: Vec<String> = text
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect();
    format!(" {} ", words.join(" "))
}
