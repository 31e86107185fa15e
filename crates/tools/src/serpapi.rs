//! SerpApi access shared by flights, hotels, shopping, jobs and recipes.

use crate::http::{ApiClient, require_key};
use concierge_core::error::ToolError;
use serde_json::Value;
use tracing::info;

pub const SERPAPI_URL: &str = "https://serpapi.com/search.json";
pub const SERPAPI_ENV: &str = "SERPAPI_API_KEY";

#[derive(Clone)]
pub struct SerpApi {
    http: ApiClient,
    api_key: Option<String>,
    base_url: String,
}

impl SerpApi {
    pub fn new(http: ApiClient, api_key: Option<String>) -> Self {
        Self {
            http,
            api_key,
            base_url: SERPAPI_URL.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Run one search. An `"error"` key in the payload is an upstream failure.
    pub async fn search(
        &self,
        tool_name: &str,
        engine: Option<&str>,
        mut params: Vec<(&str, String)>,
    ) -> Result<Value, ToolError> {
        let key = require_key(tool_name, &self.api_key, SERPAPI_ENV)?;
        if let Some(engine) = engine {
            params.push(("engine", engine.to_string()));
        }
        params.push(("api_key", key.to_string()));

        info!(tool = tool_name, engine = engine.unwrap_or("google"), "Querying SerpApi");
        let results = self.http.get_json(tool_name, &self.base_url, &params).await?;
        check_error(tool_name, results)
    }
}

pub fn check_error(tool_name: &str, results: Value) -> Result<Value, ToolError> {
    match results.get("error").and_then(Value::as_str) {
        Some(message) => Err(ToolError::Upstream {
            tool_name: tool_name.into(),
            message: message.to_string(),
        }),
        None => Ok(results),
    }
}

/// The entries of a result list, or nothing if absent.
pub fn entries<'a>(results: &'a Value, key: &str) -> &'a [Value] {
    results[key].as_array().map(Vec::as_slice).unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn error_key_is_upstream_failure() {
        let err = check_error("search_flights", json!({"error": "Invalid API key."})).unwrap_err();
        assert!(matches!(err, ToolError::Upstream { .. }));
        assert!(err.to_string().contains("Invalid API key."));
        assert!(check_error("search_flights", json!({"best_flights": []})).is_ok());
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let serp = SerpApi::new(ApiClient::new(1), None).with_base_url("http://127.0.0.1:9");
        let err = serp.search("job_search", Some("google_jobs"), vec![]).await.unwrap_err();
        assert!(matches!(err, ToolError::MissingApiKey { .. }));
    }

    #[test]
    fn entries_tolerates_missing_lists() {
        let v = json!({"jobs_results": [{"title": "a"}]});
        assert_eq!(entries(&v, "jobs_results").len(), 1);
        assert!(entries(&v, "shopping_results").is_empty());
    }
}
