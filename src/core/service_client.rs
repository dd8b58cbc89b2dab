// src/core/service_client.rs
//! HTTP client for the JSearch `/search` endpoint on RapidAPI

use crate::app_log;
use crate::core::config_manager::ServiceConfig;
use crate::fetcher::{JobSource, UpstreamQuery};
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

const SEARCH_ENDPOINT: &str = "/search";
const RAPIDAPI_KEY_HEADER: &str = "X-RapidAPI-Key";
const RAPIDAPI_HOST_HEADER: &str = "X-RapidAPI-Host";

pub struct ServiceClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl ServiceClient {
    pub fn new(base_url: String, api_key: String, timeout_seconds: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    /// Build a client when an API key is configured.
    pub fn from_config(service: &ServiceConfig) -> Result<Option<Self>> {
        match &service.api_key {
            Some(key) => Ok(Some(Self::new(
                service.api_url.clone(),
                key.clone(),
                service.timeout_seconds,
            )?)),
            None => Ok(None),
        }
    }

    /// `X-RapidAPI-Host` value: the host part of the base URL.
    fn rapidapi_host(&self) -> String {
        reqwest::Url::parse(&self.base_url)
            .ok()
            .and_then(|url| url.host_str().map(str::to_string))
            .unwrap_or_else(|| self.base_url.clone())
    }
}

/// Query string for one `/search` call, in the order the upstream documents it.
pub fn query_params(query: &UpstreamQuery) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("query", query.role.clone()),
        ("page", query.page.to_string()),
        ("num_pages", "1".to_string()),
    ];
    if let Some(location) = query.location.as_deref().filter(|l| !l.trim().is_empty()) {
        params.push(("location", location.trim().to_string()));
    }
    if let Some(country) = &query.country {
        params.push(("country", country.to_lowercase()));
    }
    params.push(("date_posted", query.date_posted.api_value().to_string()));
    params
}

#[async_trait]
impl JobSource for ServiceClient {
    async fn fetch_page(&self, query: &UpstreamQuery) -> Result<Value> {
        let url = format!("{}{}", self.base_url, SEARCH_ENDPOINT);
        app_log!(info, "Calling JSearch: {} (page {})", url, query.page);

        let response = self
            .client
            .get(&url)
            .header(RAPIDAPI_KEY_HEADER, &self.api_key)
            .header(RAPIDAPI_HOST_HEADER, self.rapidapi_host())
            .query(&query_params(query))
            .send()
            .await
            .with_context(|| format!("Failed to GET from {}", url))?;

        let status = response.status();
        app_log!(trace, "Response status: {}", status);

        if status.is_success() {
            response
                .json::<Value>()
                .await
                .context("Failed to parse JSearch response as JSON")
        } else {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            app_log!(error, "JSearch error response: {}", error_text);
            anyhow::bail!("HTTP {} error: {}", status, error_text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DatePosted;

    fn query() -> UpstreamQuery {
        UpstreamQuery {
            role: "Android Developer".to_string(),
            location: Some("Berlin".to_string()),
            country: Some("DE".to_string()),
            date_posted: DatePosted::Any,
            page: 2,
        }
    }

    #[test]
    fn test_query_params() {
        let params = query_params(&query());
        assert_eq!(
            params,
            vec![
                ("query", "Android Developer".to_string()),
                ("page", "2".to_string()),
                ("num_pages", "1".to_string()),
                ("location", "Berlin".to_string()),
                ("country", "de".to_string()),
                ("date_posted", "all".to_string()),
            ]
        );
    }

    #[test]
    fn test_query_params_without_location() {
        let params = query_params(&UpstreamQuery {
            location: Some("  ".to_string()),
            country: None,
            date_posted: DatePosted::Week,
            ..query()
        });
        let keys: Vec<&str> = params.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["query", "page", "num_pages", "date_posted"]);
        assert_eq!(params[3].1, "week");
    }

    #[test]
    fn test_rapidapi_host() {
        let client =
            ServiceClient::new("https://jsearch.p.rapidapi.com/".to_string(), "k".to_string(), 5)
                .unwrap();
        assert_eq!(client.rapidapi_host(), "jsearch.p.rapidapi.com");
    }

    #[test]
    fn test_from_config_without_key() {
        let config = crate::core::ConfigManager::from_base_dir(std::path::Path::new("/tmp"));
        assert!(ServiceClient::from_config(&config.service).unwrap().is_none());
    }
}
