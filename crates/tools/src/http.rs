//! Shared HTTP plumbing for the API-backed adapters.

use concierge_core::error::ToolError;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// A cloneable JSON-over-HTTP client. Every adapter shares one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
}

impl ApiClient {
    pub fn new(timeout_secs: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self { client }
    }

    pub async fn get_json(
        &self,
        tool_name: &str,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Value, ToolError> {
        debug!(tool = tool_name, url, "GET");
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| failed(tool_name, e))?;
        read_json(tool_name, response).await
    }

    pub async fn post_json(
        &self,
        tool_name: &str,
        url: &str,
        body: &Value,
    ) -> Result<Value, ToolError> {
        debug!(tool = tool_name, url, "POST");
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| failed(tool_name, e))?;
        read_json(tool_name, response).await
    }
}

async fn read_json(tool_name: &str, response: reqwest::Response) -> Result<Value, ToolError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ToolError::Upstream {
            tool_name: tool_name.into(),
            message: format!("HTTP {}: {}", status.as_u16(), upstream_message(&body)),
        });
    }
    response.json().await.map_err(|e| failed(tool_name, e))
}

/// Pull the human-readable part out of an error body, if it is JSON.
fn upstream_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            ["error", "message", "detail"]
                .iter()
                .find_map(|k| v[*k].as_str().map(String::from))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

fn failed(tool_name: &str, e: reqwest::Error) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: tool_name.into(),
        reason: e.to_string(),
    }
}

/// Borrow a configured key or report which variable to set.
pub fn require_key<'a>(
    tool_name: &str,
    key: &'a Option<String>,
    env_var: &str,
) -> Result<&'a str, ToolError> {
    match key.as_deref() {
        Some(k) if !k.is_empty() => Ok(k),
        _ => Err(ToolError::MissingApiKey {
            tool_name: tool_name.into(),
            env_var: env_var.into(),
        }),
    }
}

/// Read a required string argument.
pub fn required_str<'a>(arguments: &'a Value, name: &str) -> Result<&'a str, ToolError> {
    arguments[name]
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ToolError::InvalidArguments(format!("Missing '{name}' argument")))
}

/// Render a JSON scalar for display; `fallback` for null or missing.
pub fn text(value: &Value, fallback: &str) -> String {
    match value {
        Value::String(s) if !s.is_empty() => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => fallback.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_key_names_variable() {
        let err = require_key("get_weather", &None, "OPENWEATHER_API_KEY").unwrap_err();
        assert!(err.to_string().contains("OPENWEATHER_API_KEY"));
        assert!(require_key("get_weather", &Some(String::new()), "X").is_err());
        assert_eq!(require_key("t", &Some("k".into()), "X").unwrap(), "k");
    }

    #[test]
    fn required_str_rejects_blank() {
        let args = json!({"location": "  Hyderabad ", "blank": " "});
        assert_eq!(required_str(&args, "location").unwrap(), "Hyderabad");
        assert!(required_str(&args, "blank").is_err());
        assert!(required_str(&args, "missing").is_err());
    }

    #[test]
    fn upstream_message_prefers_json_fields() {
        assert_eq!(upstream_message(r#"{"error":"Invalid API key"}"#), "Invalid API key");
        assert_eq!(upstream_message(r#"{"message":"city not found","cod":"404"}"#), "city not found");
        assert_eq!(upstream_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[test]
    fn text_renders_scalars() {
        assert_eq!(text(&json!(4200), "N/A"), "4200");
        assert_eq!(text(&json!("2h"), "N/A"), "2h");
        assert_eq!(text(&json!(null), "N/A"), "N/A");
        assert_eq!(text(&json!(""), "N/A"), "N/A");
    }
}
