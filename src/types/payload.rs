// src/types/payload.rs
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Raw upstream data, tagged by the shape it arrived in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "shape", content = "body", rename_all = "snake_case")]
pub enum RawPayload {
    /// One JSearch `/search` response: `{"status": .., "data": [..]}`.
    Api(Value),
    /// Union of several region-scoped responses, same layout as `Api`.
    Merged(Value),
    /// Mock fixture: either a JSearch-like object or a bare list of jobs.
    Fixture(Value),
}

impl RawPayload {
    pub fn body(&self) -> &Value {
        match self {
            Self::Api(body) | Self::Merged(body) | Self::Fixture(body) => body,
        }
    }

    pub fn shape(&self) -> &'static str {
        match self {
            Self::Api(_) => "api",
            Self::Merged(_) => "merged",
            Self::Fixture(_) => "fixture",
        }
    }

    /// Job entries as listed by the source, before any validation.
    pub fn job_entries(&self) -> Option<&Vec<Value>> {
        match self {
            Self::Api(body) | Self::Merged(body) => body.get("data").and_then(Value::as_array),
            Self::Fixture(body) => body
                .as_array()
                .or_else(|| body.get("data").and_then(Value::as_array)),
        }
    }
}
