//! Product search via SerpApi's Google Shopping engine.

use crate::http::{required_str, text};
use crate::serpapi::{SerpApi, entries};
use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use serde_json::Value;
use std::fmt::Write;

const SHOWN: usize = 5;

pub struct ShoppingSearchTool {
    serp: SerpApi,
}

impl ShoppingSearchTool {
    pub fn new(serp: SerpApi) -> Self {
        Self { serp }
    }
}

#[async_trait]
impl Tool for ShoppingSearchTool {
    fn name(&self) -> &str {
        "shopping_search"
    }

    fn description(&self) -> &str {
        "Search Google Shopping for products. Returns titles, prices, sellers, ratings and links."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Product to look for (e.g. \"noise cancelling headphones\")"
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
        let params = vec![
            ("q", query.to_string()),
            ("hl", "en".to_string()),
            ("gl", "us".to_string()),
        ];
        let results = self.serp.search(self.name(), Some("google_shopping"), params).await?;
        Ok(ToolResult::ok(format_products(query, &results)))
    }
}

pub(crate) fn format_products(query: &str, results: &Value) -> String {
    let products = entries(results, "shopping_results");
    if products.is_empty() {
        return format!("No products found for '{query}'.");
    }

    let mut out = format!("🛍️ Shopping results for: {query}\n\n");
    for (idx, item) in products.iter().take(SHOWN).enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, text(&item["title"], "Untitled product"));
        let _ = write!(
            out,
            "   💵 {} from {}",
            text(&item["price"], "N/A"),
            text(&item["source"], "unknown seller")
        );
        if let Some(rating) = item["rating"].as_f64() {
            let _ = write!(out, " | ⭐ {rating} ({} reviews)", text(&item["reviews"], "0"));
        }
        out.push('\n');
        if let Some(link) = item["product_link"].as_str().or(item["link"].as_str()) {
            let _ = writeln!(out, "   🔗 {link}");
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
    fn formats_products() {
        let results = json!({"shopping_results": [
            {"title": "Sony WH-1000XM5", "price": "₹26,990", "source": "Amazon.in",
             "rating": 4.7, "reviews": 1520, "product_link": "https://example.com/sony"},
            {"title": "Bose QC45", "price": "₹24,900", "source": "Croma"}
        ]});
        let out = format_products("headphones", &results);
        assert!(out.starts_with("🛍️ Shopping results for: headphones"));
        assert!(out.contains("1. Sony WH-1000XM5"));
        assert!(out.contains("₹26,990 from Amazon.in | ⭐ 4.7 (1520 reviews)"));
        assert!(out.contains("https://example.com/sony"));
        assert!(out.ends_with("₹24,900 from Croma"));
    }

    #[test]
    fn nothing_found() {
        assert_eq!(
            format_products("unobtainium", &json!({})),
            "No products found for 'unobtainium'."
        );
    }
}
