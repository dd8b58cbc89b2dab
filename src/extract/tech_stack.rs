// src/extract/tech_stack.rs
use crate::types::NormalizedJob;
use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Built-in vocabulary, reported in this order.
pub const DEFAULT_TECH_TERMS: &[&str] = &[
    "Kotlin",
    "Java",
    "Android",
    "Android SDK",
    "Android Studio",
    "Gradle",
    "Jetpack",
    "Jetpack Compose",
    "Compose",
    "MVVM",
    "MVI",
    "Room",
    "SQLite",
    "Retrofit",
    "REST",
    "RESTful",
    "GraphQL",
    "JSON",
    "Coroutines",
    "Flow",
    "RxJava",
    "Dagger",
    "Hilt",
    "Koin",
    "JUnit",
    "Espresso",
    "Mockito",
    "CI/CD",
    "Git",
    "GitHub",
    "GitLab",
    "Jenkins",
    "Docker",
    "Kubernetes",
    "Azure",
    "AWS",
    "GCP",
    "Firebase",
    "NDK",
    "Python",
    "C++",
    "C#",
    "Rust",
    "Golang",
    "Swift",
    "SwiftUI",
    "Objective-C",
    "Flutter",
    "Dart",
    "React",
    "React Native",
    "Node.js",
    "TypeScript",
    "JavaScript",
    "SQL",
    "PostgreSQL",
];

static DEFAULT_VOCABULARY: Lazy<TechVocabulary> = Lazy::new(|| {
    TechVocabulary::new(DEFAULT_TECH_TERMS.iter().copied()).expect("built-in terms compile")
});

/// Terms matched case-insensitively as whole tokens. Boundaries are any
/// non-alphanumeric character, so `C++`, `CI/CD` and `Node.js` match
/// where `\b` would not.
#[derive(Debug, Clone)]
pub struct TechVocabulary {
    terms: Vec<(String, Regex)>,
}

impl Default for TechVocabulary {
    fn default() -> Self {
        DEFAULT_VOCABULARY.clone()
    }
}

impl TechVocabulary {
    pub fn new<I, S>(terms: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self { terms: Vec::new() };
        vocabulary.extend(terms)?;
        Ok(vocabulary)
    }

    /// Default vocabulary plus `extra` terms, appended in order.
    pub fn with_terms<I, S>(extra: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut vocabulary = Self::default();
        vocabulary.extend(extra)?;
        Ok(vocabulary)
    }

    fn extend<I, S>(&mut self, terms: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for term in terms {
            let term = term.as_ref().trim();
            if term.is_empty()
                || self
                    .terms
                    .iter()
                    .any(|(known, _)| known.eq_ignore_ascii_case(term))
            {
                continue;
            }
            let pattern = format!(
                r"(?i)(?:^|[^\p{{L}}\p{{N}}_]){}(?:$|[^\p{{L}}\p{{N}}_])",
                regex::escape(term)
            );
            let regex = Regex::new(&pattern)
                .with_context(|| format!("Invalid tech term: {}", term))?;
            self.terms.push((term.to_string(), regex));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Terms found in `text`, in vocabulary order.
    pub fn find_in(&self, text: &str) -> Vec<String> {
        self.terms
            .iter()
            .filter(|(_, regex)| regex.is_match(text))
            .map(|(term, _)| term.clone())
            .collect()
    }
}

/// Scan the description together with every highlight list.
pub fn tech_stack(job: &NormalizedJob, vocabulary: &TechVocabulary) -> Vec<String> {
    let mut text = job.description.clone();
    for items in job.highlights.values() {
        for item in items {
            text.push('\n');
            text.push_str(item);
        }
    }
    vocabulary.find_in(&text)
}
