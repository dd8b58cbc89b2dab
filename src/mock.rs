// src/mock.rs
//! Offline job source: a saved upstream response on disk

use crate::app_log;
use crate::core::FsOps;
use crate::fetcher::FetchError;
use crate::preferences::SearchPreferences;
use crate::types::RawPayload;
use anyhow::{Context, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct MockSource {
    path: PathBuf,
    filter_by_location: bool,
}

impl MockSource {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            filter_by_location: false,
        }
    }

    /// Keep only fixture jobs that match the requested location or regions.
    pub fn with_location_filter(mut self, enabled: bool) -> Self {
        self.filter_by_location = enabled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    pub async fn load(&self, prefs: &SearchPreferences) -> Result<RawPayload, FetchError> {
        if !self.exists() {
            return Err(FetchError::NoDataSource {
                mock_path: self.path.clone(),
            });
        }

        let content = FsOps::read_file_safe(&self.path)
            .await
            .map_err(|e| FetchError::MockRead {
                path: self.path.clone(),
                message: format!("{:#}", e),
            })?;
        let mut body = parse_mock_content(&content).map_err(|e| FetchError::MockParse {
            path: self.path.clone(),
            message: format!("{:#}", e),
        })?;

        if self.filter_by_location {
            filter_fixture(&mut body, prefs);
        }

        app_log!(info, "Loaded mock payload from {}", self.path.display());
        Ok(RawPayload::Fixture(body))
    }
}

fn filter_fixture(body: &mut Value, prefs: &SearchPreferences) {
    let jobs = match body {
        Value::Array(items) => items,
        Value::Object(map) => match map.get_mut("data") {
            Some(Value::Array(items)) => items,
            _ => return,
        },
        _ => return,
    };

    let before = jobs.len();
    if prefs.is_multi_region() {
        jobs.retain(|job| {
            job.get("job_country")
                .and_then(Value::as_str)
                .map(|c| prefs.regions.iter().any(|r| r.eq_ignore_ascii_case(c.trim())))
                .unwrap_or(false)
        });
    } else if !prefs.location.trim().is_empty() {
        let wanted = prefs.location.trim().to_lowercase();
        jobs.retain(|job| {
            ["job_location", "job_city", "job_state", "job_country"]
                .iter()
                .filter_map(|key| job.get(*key).and_then(Value::as_str))
                .any(|value| value.to_lowercase().contains(&wanted))
        });
    }
    app_log!(debug, "Mock location filter kept {} of {} jobs", jobs.len(), before);
}

/// Parse mock content as JSON, or as a Python-literal dump (single quotes,
/// `None`/`True`/`False`, trailing commas, tuples).
pub fn parse_mock_content(content: &str) -> Result<Value> {
    let content = content.trim();
    if let Ok(value) = serde_json::from_str(content) {
        return Ok(value);
    }
    let converted = literal_to_json(content);
    serde_json::from_str(&converted)
        .context("Could not parse mock file as JSON or Python literal")
}

fn literal_to_json(input: &str) -> String {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut i = 0;
    // Adjacent literals ('a' 'b') are one string.
    let mut after_string = false;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            out.push(c);
            i += 1;
            continue;
        }
        let continues_string = after_string;
        after_string = false;
        match c {
            '\'' | '"' => {
                if continues_string {
                    let trimmed_len = out.trim_end().len();
                    out.truncate(trimmed_len - 1);
                } else {
                    out.push('"');
                }
                i = copy_string(&chars, i, &mut out);
                after_string = true;
                continue;
            }
            ']' | '}' | ')' => {
                drop_trailing_comma(&mut out);
                out.push(if c == ')' { ']' } else { c });
            }
            '(' => out.push('['),
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let word: String = chars[start..i].iter().collect();
                let is_prefix = matches!(word.as_str(), "u" | "U" | "r" | "R" | "b" | "B")
                    && matches!(chars.get(i), Some('\'') | Some('"'));
                if is_prefix {
                    after_string = continues_string;
                } else {
                    out.push_str(match word.as_str() {
                        "None" => "null",
                        "True" => "true",
                        "False" => "false",
                        other => other,
                    });
                }
                continue;
            }
            _ => out.push(c),
        }
        i += 1;
    }
    out
}

/// Copy the body of the quoted literal starting at `start` plus a closing
/// `"`; returns the index after the closing quote.
fn copy_string(chars: &[char], start: usize, out: &mut String) -> usize {
    let quote = chars[start];
    let mut i = start + 1;

    while i < chars.len() {
        let c = chars[i];
        if c == '\\' {
            match chars.get(i + 1) {
                Some('\'') => out.push('\''),
                Some(&next) if "\"\\/bfnrtu".contains(next) => {
                    out.push('\\');
                    out.push(next);
                }
                Some(&next) => {
                    out.push_str("\\\\");
                    out.push(next);
                }
                None => out.push_str("\\\\"),
            }
            i += 2;
            continue;
        }
        if c == quote {
            out.push('"');
            return i + 1;
        }
        match c {
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
        i += 1;
    }
    out.push('"');
    i
}

fn drop_trailing_comma(out: &mut String) {
    let trimmed_len = out.trim_end().len();
    if out[..trimmed_len].ends_with(',') {
        out.truncate(trimmed_len - 1);
    }
}
