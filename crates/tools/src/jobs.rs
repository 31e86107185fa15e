//! Job postings via SerpApi's Google Jobs engine.

use crate::http::{required_str, text};
use crate::serpapi::{SerpApi, entries};
use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use serde_json::Value;
use std::fmt::Write;

const SHOWN: usize = 5;
const SNIPPET_CHARS: usize = 200;

pub struct JobSearchTool {
    serp: SerpApi,
}

impl JobSearchTool {
    pub fn new(serp: SerpApi) -> Self {
        Self { serp }
    }
}

#[async_trait]
impl Tool for JobSearchTool {
    fn name(&self) -> &str {
        "job_search"
    }

    fn description(&self) -> &str {
        "Search Google Jobs for postings and career opportunities. Returns title, company, location and a short description."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to search for (e.g. \"software engineer remote\", \"entry level physics jobs\")"
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
        let params = vec![("q", query.to_string()), ("hl", "en".to_string())];
        let results = self.serp.search(self.name(), Some("google_jobs"), params).await?;
        Ok(ToolResult::ok(format_jobs(query, &results)))
    }
}

fn snippet(description: &str) -> String {
    let flat = description.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= SNIPPET_CHARS {
        return flat;
    }
    let cut: String = flat.chars().take(SNIPPET_CHARS).collect();
    format!("{}...", cut.trim_end())
}

pub(crate) fn format_jobs(query: &str, results: &Value) -> String {
    let jobs = entries(results, "jobs_results");
    if jobs.is_empty() {
        return format!("No job postings found for '{query}'.");
    }

    let mut out = format!("💼 Jobs for: {query}\n\n");
    for (idx, job) in jobs.iter().take(SHOWN).enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, text(&job["title"], "Untitled role"));
        let _ = writeln!(
            out,
            "   🏢 {} | 📍 {}",
            text(&job["company_name"], "Unknown company"),
            text(&job["location"], "Location not listed")
        );
        if let Some(via) = job["via"].as_str() {
            let _ = writeln!(out, "   {via}");
        }
        if let Some(description) = job["description"].as_str() {
            let _ = writeln!(out, "   {}", snippet(description));
        }
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_postings() {
        let results = json!({"jobs_results": [{
            "title": "Backend Engineer",
            "company_name": "Acme",
            "location": "Hyderabad, Telangana",
            "via": "via LinkedIn",
            "description": "Build   services\nin Rust."
        }]});
        let out = format_jobs("rust jobs", &results);
        assert!(out.contains("1. Backend Engineer"));
        assert!(out.contains("🏢 Acme | 📍 Hyderabad, Telangana"));
        assert!(out.contains("via LinkedIn"));
        assert!(out.contains("Build services in Rust."));
    }

    #[test]
    fn long_descriptions_are_cut() {
        let long = "word ".repeat(100);
        let cut = snippet(&long);
        assert!(cut.ends_with("..."));
        assert!(cut.chars().count() <= SNIPPET_CHARS + 3);
    }

    #[test]
    fn nothing_found() {
        assert_eq!(format_jobs("x", &json!({})), "No job postings found for 'x'.");
    }
}
