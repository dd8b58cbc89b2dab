// src/extract/requirements.rs
//! Candidate requirements from structured highlights or a description section

use crate::types::NormalizedJob;
use once_cell::sync::Lazy;
use regex::Regex;

pub const MAX_REQUIREMENTS: usize = 15;

const QUALIFICATIONS_SECTION: &str = "Qualifications";
const MAX_HEADING_CHARS: usize = 60;
const MAX_BARE_HEADING_CHARS: usize = 40;

static REQUIREMENTS_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(requirements?|qualifications?|what you(?:'ll)? (?:bring|need|have)|what we(?:'re| are) looking for|must[- ]haves?|skills(?: required)?|your profile|who you are|anforderungen|ihr profil|dein profil|was du mitbringst|qualifikationen|profil recherch[ée]|comp[ée]tences|exigences|votre profil|requisitos|perfil|lo que buscamos)\b",
    )
    .expect("valid regex")
});

static OTHER_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^(responsibilities|duties|what you(?:'ll)? do|tasks|benefits|perks|what we offer|we offer|about us|about the (?:role|company|team)|how to apply|aufgaben|deine aufgaben|ihre aufgaben|wir bieten|was wir bieten|[üu]ber uns|missions?|avantages|nous offrons|qui sommes-nous|funciones|responsabilidades|ofrecemos|beneficios|sobre nosotros)\b",
    )
    .expect("valid regex")
});

static BULLET_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-*•·▪‣◦]+|\d+[.)])\s*").expect("valid regex"));

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?;]\s+").expect("valid regex"));

pub fn requirements(job: &NormalizedJob) -> Vec<String> {
    let structured: Vec<String> = job
        .highlight(QUALIFICATIONS_SECTION)
        .iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .take(MAX_REQUIREMENTS)
        .collect();
    if !structured.is_empty() {
        return structured;
    }
    requirements_from_description(&job.description)
}

/// Fragments of the first requirements section, ended by the next heading.
pub fn requirements_from_description(description: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut in_section = false;

    for line in description.lines() {
        let line = strip_bullet(line);
        if line.is_empty() {
            continue;
        }

        if !in_section {
            if let Some(rest) = requirements_heading(line) {
                in_section = true;
                push_fragments(&mut items, rest);
            }
            continue;
        }

        if is_other_heading(line) || requirements_heading(line).is_some() {
            break;
        }
        push_fragments(&mut items, line);
        if items.len() >= MAX_REQUIREMENTS {
            break;
        }
    }

    items.truncate(MAX_REQUIREMENTS);
    items
}

/// Text after the heading when `line` opens a requirements section.
fn requirements_heading(line: &str) -> Option<&str> {
    if !REQUIREMENTS_HEADING.is_match(line) {
        return None;
    }
    match line.find(':') {
        Some(colon) if line[..colon].chars().count() <= MAX_HEADING_CHARS => {
            Some(line[colon + 1..].trim())
        }
        None if line.chars().count() <= MAX_BARE_HEADING_CHARS => Some(""),
        _ => None,
    }
}

fn is_other_heading(line: &str) -> bool {
    let short_label = line.ends_with(':') && line.chars().count() <= MAX_HEADING_CHARS;
    let known = OTHER_HEADING.is_match(line)
        && (line.contains(':') || line.chars().count() <= MAX_BARE_HEADING_CHARS);
    short_label || known
}

fn strip_bullet(line: &str) -> &str {
    let trimmed = line.trim();
    match BULLET_PREFIX.find(trimmed) {
        Some(m) => trimmed[m.end()..].trim(),
        None => trimmed,
    }
}

fn push_fragments(items: &mut Vec<String>, text: &str) {
    for part in text.split(['•', '·']) {
        let part = strip_bullet(part);
        for sentence in SENTENCE_END.split(part) {
            let sentence = sentence.trim().trim_end_matches(['.', '!', '?', ';']).trim();
            if !sentence.is_empty() {
                items.push(sentence.to_string());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_structured_qualifications_first() {
        let mut highlights = BTreeMap::new();
        highlights.insert(
            "Qualifications".to_string(),
            (0..20).map(|i| format!("Skill {}", i)).collect(),
        );
        let job = NormalizedJob {
            description: "Requirements:\n- ignored".to_string(),
            highlights,
            ..Default::default()
        };
        let found = requirements(&job);
        assert_eq!(found.len(), MAX_REQUIREMENTS);
        assert_eq!(found[0], "Skill 0");
    }

    #[test]
    fn test_section_until_next_heading() {
        let description = "About the role\nYou will build apps.\n\nRequirements:\n- 3+ years of Kotlin\n- Experience with Jetpack Compose. Good English skills\n\nBenefits:\n- Free lunch";
        assert_eq!(
            requirements_from_description(description),
            vec![
                "3+ years of Kotlin",
                "Experience with Jetpack Compose",
                "Good English skills"
            ]
        );
    }

    #[test]
    fn test_inline_heading_and_inline_bullets() {
        let description = "Requisitos: experiencia con Kotlin y Java.\nOfrecemos: buen ambiente";
        assert_eq!(
            requirements_from_description(description),
            vec!["experiencia con Kotlin y Java"]
        );

        let description = "Your profile\n• Kotlin • Coroutines · Clean architecture";
        assert_eq!(
            requirements_from_description(description),
            vec!["Kotlin", "Coroutines", "Clean architecture"]
        );
    }

    #[test]
    fn test_german_heading() {
        let description = "Deine Aufgaben:\n- Apps bauen\nWas du mitbringst:\n- Erfahrung mit Kotlin\nWir bieten:\n- Homeoffice";
        assert_eq!(
            requirements_from_description(description),
            vec!["Erfahrung mit Kotlin"]
        );
    }

    #[test]
    fn test_no_section_is_empty() {
        assert!(requirements_from_description("We need requirements gathering skills in this long sentence here.").is_empty());
        assert!(requirements_from_description("").is_empty());
    }
}
