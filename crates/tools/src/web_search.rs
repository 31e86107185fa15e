//! Web search tool backed by the Tavily search API.

use crate::http::{ApiClient, require_key, required_str, text};
use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use serde_json::Value;
use std::fmt::Write;

const TAVILY_URL: &str = "https://api.tavily.com/search";

pub struct WebSearchTool {
    http: ApiClient,
    api_key: Option<String>,
}

impl WebSearchTool {
    pub fn new(http: ApiClient, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for current or general information. Returns a short answer when available plus titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 5)",
                    "default": 5
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let query = required_str(&arguments, "query")?;
        let num_results = arguments["num_results"].as_u64().unwrap_or(5).clamp(1, 10);
        let key = require_key(self.name(), &self.api_key, "TAVILY_API_KEY")?;

        let body = serde_json::json!({
            "api_key": key,
            "query": query,
            "max_results": num_results,
            "include_answer": true,
        });
        let results = self.http.post_json(self.name(), TAVILY_URL, &body).await?;
        Ok(ToolResult::ok(format_results(query, &results)))
    }
}

pub(crate) fn format_results(query: &str, results: &Value) -> String {
    let hits = results["results"].as_array().map(Vec::as_slice).unwrap_or(&[]);
    let answer = results["answer"].as_str().filter(|a| !a.trim().is_empty());

    if hits.is_empty() && answer.is_none() {
        return format!("No web results found for '{query}'.");
    }

    let mut out = String::new();
    if let Some(answer) = answer {
        let _ = writeln!(out, "Answer: {}\n", answer.trim());
    }
    for (idx, hit) in hits.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, text(&hit["title"], "Untitled"));
        if let Some(url) = hit["url"].as_str() {
            let _ = writeln!(out, "   {url}");
        }
        if let Some(content) = hit["content"].as_str() {
            let _ = writeln!(out, "   {}", content.trim());
        }
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_answer_and_hits() {
        let results = json!({
            "answer": "The F-22 Raptor is a fifth-generation fighter.",
            "results": [
                {"title": "F-22 Raptor", "url": "https://example.com/f22", "content": "Stealth air superiority fighter."},
                {"title": "Su-57", "url": "https://example.com/su57", "content": "Russian fifth-gen fighter."}
            ]
        });
        let out = format_results("fifth gen fighters", &results);
        assert!(out.starts_with("Answer: The F-22 Raptor"));
        assert!(out.contains("1. F-22 Raptor\n   https://example.com/f22"));
        assert!(out.contains("2. Su-57"));
    }

    #[test]
    fn empty_results() {
        let out = format_results("zzz", &json!({"results": []}));
        assert_eq!(out, "No web results found for 'zzz'.");
    }

    #[tokio::test]
    async fn missing_key_is_reported() {
        let tool = WebSearchTool::new(ApiClient::new(1), None);
        let err = tool
            .execute(json!({"query": "news"}), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("TAVILY_API_KEY"));
    }

    #[tokio::test]
    async fn missing_query_returns_error() {
        let tool = WebSearchTool::new(ApiClient::new(1), Some("k".into()));
        let result = tool.execute(json!({}), &ToolContext::default()).await;
        assert!(matches!(result, Err(ToolError::InvalidArguments(_))));
    }

    #[test]
    fn tool_definition() {
        let tool = WebSearchTool::new(ApiClient::new(1), None);
        assert_eq!(tool.to_definition().name, "web_search");
    }
}
