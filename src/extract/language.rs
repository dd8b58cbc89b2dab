// src/extract/language.rs
//! Language of the job ad itself, by stop-word and diacritic scoring

use crate::types::UNKNOWN;

const FALLBACK_LANGUAGE: &str = "en";
const MIN_CONFIDENT_SCORE: usize = 4;
const STOP_WORD_POINTS: usize = 2;
const MAX_SCANNED_CHARS: usize = 5000;

struct LanguageProfile {
    code: &'static str,
    stop_words: &'static [&'static str],
    markers: &'static [char],
}

/// Earlier profiles win ties.
const PROFILES: &[LanguageProfile] = &[
    LanguageProfile {
        code: "en",
        stop_words: &[
            "the", "and", "with", "for", "you", "our", "will", "are", "this", "that", "have",
            "your", "we", "is", "of", "to", "be", "an",
        ],
        markers: &[],
    },
    LanguageProfile {
        code: "de",
        stop_words: &[
            "der", "die", "das", "und", "mit", "für", "wir", "sie", "ist", "ein", "eine",
            "nicht", "auf", "zu", "den", "von", "bei", "ihre", "werden", "du", "dein",
        ],
        markers: &['ä', 'ö', 'ü', 'ß'],
    },
    LanguageProfile {
        code: "fr",
        stop_words: &[
            "le", "les", "et", "des", "une", "pour", "avec", "nous", "vous", "est", "dans",
            "sur", "du", "au", "vos", "votre",
        ],
        markers: &['è', 'ê', 'œ', 'ç', 'à'],
    },
    LanguageProfile {
        code: "es",
        stop_words: &[
            "el", "los", "las", "y", "con", "para", "una", "un", "del", "por", "que", "es",
            "nuestro", "nuestra", "buscamos", "se", "al",
        ],
        markers: &['ñ', '¿', '¡'],
    },
    LanguageProfile {
        code: "it",
        stop_words: &[
            "il", "di", "che", "per", "sono", "nel", "della", "siamo", "cerchiamo", "gli",
            "alla", "anche",
        ],
        markers: &['ì', 'ò'],
    },
    LanguageProfile {
        code: "nl",
        stop_words: &[
            "het", "een", "van", "voor", "met", "wij", "zijn", "niet", "je", "ons", "jij",
            "bij", "naar",
        ],
        markers: &[],
    },
    LanguageProfile {
        code: "pt",
        stop_words: &[
            "os", "com", "uma", "do", "da", "não", "em", "nós", "você", "somos", "na", "no",
            "seu", "sua",
        ],
        markers: &['ã', 'õ'],
    },
];

/// ISO 639-1 code of the description's language; `unknown` when the
/// description is empty and `en` when nothing stands out.
pub fn detect_language(description: &str) -> String {
    let sample: String = description.chars().take(MAX_SCANNED_CHARS).collect();
    if sample.trim().is_empty() {
        return UNKNOWN.to_string();
    }

    let lowered = sample.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphabetic())
        .filter(|w| !w.is_empty())
        .collect();

    let mut best: Option<(&str, usize)> = None;
    for profile in PROFILES {
        let stop_hits = words
            .iter()
            .filter(|w| profile.stop_words.contains(*w))
            .count();
        let marker_hits = lowered
            .chars()
            .filter(|c| profile.markers.contains(c))
            .count();
        let score = stop_hits * STOP_WORD_POINTS + marker_hits;

        if best.map_or(true, |(_, top)| score > top) {
            best = Some((profile.code, score));
        }
    }

    match best {
        Some((code, score)) if score >= MIN_CONFIDENT_SCORE => code.to_string(),
        _ => FALLBACK_LANGUAGE.to_string(),
    }
}
