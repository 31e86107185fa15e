//! Recipe search via the recipe block of SerpApi's Google results.

use crate::http::{required_str, text};
use crate::serpapi::{SerpApi, entries};
use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use serde_json::Value;
use std::fmt::Write;

const SHOWN: usize = 8;
const INGREDIENTS_SHOWN: usize = 5;

pub struct SearchRecipesTool {
    serp: SerpApi,
}

impl SearchRecipesTool {
    pub fn new(serp: SerpApi) -> Self {
        Self { serp }
    }
}

#[async_trait]
impl Tool for SearchRecipesTool {
    fn name(&self) -> &str {
        "search_recipes"
    }

    fn description(&self) -> &str {
        "Search for recipes by dish name. Returns title, source, rating, cooking time, main ingredients and links."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Recipe or dish name (e.g. \"tiramisu\", \"pasta carbonara\")"
                },
                "location": {
                    "type": "string",
                    "description": "Optional location for localized results (e.g. \"Italy\")"
                },
                "google_domain": {
                    "type": "string",
                    "description": "Google domain to use (default google.com)",
                    "default": "google.com"
                },
                "language": {
                    "type": "string",
                    "description": "Language code (default en)",
                    "default": "en"
                },
                "country": {
                    "type": "string",
                    "description": "Country code (default us)",
                    "default": "us"
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
        let opt = |key: &str, default: &str| {
            arguments[key]
                .as_str()
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(default)
                .to_string()
        };

        let mut params = vec![
            ("q", query.to_string()),
            ("google_domain", opt("google_domain", "google.com")),
            ("hl", opt("language", "en")),
            ("gl", opt("country", "us")),
        ];
        if let Some(location) = arguments["location"].as_str().filter(|s| !s.trim().is_empty()) {
            params.push(("location", location.to_string()));
        }

        let results = self.serp.search(self.name(), None, params).await?;
        Ok(ToolResult::ok(format_recipes(query, &results)))
    }
}

pub(crate) fn format_recipes(query: &str, results: &Value) -> String {
    let recipes = entries(results, "recipes_results");
    if recipes.is_empty() {
        return format!("No recipes found for '{query}'.");
    }

    let mut out = format!("👨‍🍳 Recipes for: {query}\n\n");
    for (idx, recipe) in recipes.iter().take(SHOWN).enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, text(&recipe["title"], "Unknown Recipe"));
        let _ = writeln!(out, "   📰 Source: {}", text(&recipe["source"], "Unknown Source"));

        let rating = text(&recipe["rating"], "");
        let reviews = recipe["reviews"].as_u64().unwrap_or(0);
        match (rating.is_empty(), reviews) {
            (false, 0) => {
                let _ = writeln!(out, "   ⭐ {rating}/5");
            }
            (false, n) => {
                let _ = writeln!(out, "   ⭐ {rating}/5 ({n} reviews)");
            }
            _ => {}
        }

        if let Some(time) = recipe["total_time"].as_str() {
            let _ = writeln!(out, "   ⏱️ Time: {time}");
        }

        let ingredients: Vec<String> = recipe["ingredients"]
            .as_array()
            .map(|a| a.iter().map(|v| text(v, "")).collect())
            .unwrap_or_default();
        if !ingredients.is_empty() {
            let mut listed = ingredients
                .iter()
                .take(INGREDIENTS_SHOWN)
                .cloned()
                .collect::<Vec<_>>()
                .join(", ");
            if ingredients.len() > INGREDIENTS_SHOWN {
                let _ = write!(listed, " (+{} more)", ingredients.len() - INGREDIENTS_SHOWN);
            }
            let _ = writeln!(out, "   🥘 Ingredients: {listed}");
        }

        if let Some(badge) = recipe["badge"].as_str() {
            let _ = writeln!(out, "   🏷️ {badge}");
        }
        if let Some(video) = recipe["video"].as_str() {
            let _ = writeln!(out, "   🎥 Video: {video}");
        }
        if let Some(link) = recipe["link"].as_str() {
            let _ = writeln!(out, "   🔗 Recipe: {link}");
        }
        out.push('\n');
    }

    if let Some(url) = results["search_metadata"]["google_url"].as_str() {
        let _ = write!(out, "🔗 All results: {url}");
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_recipes() {
        let results = json!({
            "recipes_results": [{
                "title": "Classic Tiramisu",
                "source": "Giallo Zafferano",
                "rating": 4.8,
                "reviews": 312,
                "total_time": "4 hr",
                "ingredients": ["Mascarpone", "Eggs", "Savoiardi", "Coffee", "Cocoa", "Sugar", "Marsala"],
                "link": "https://example.com/tiramisu"
            }, {
                "title": "Quick Tiramisu",
                "source": "Blog",
                "rating": 4.1
            }],
            "search_metadata": {"google_url": "https://www.google.com/search?q=tiramisu"}
        });
        let out = format_recipes("tiramisu", &results);
        assert!(out.contains("1. Classic Tiramisu"));
        assert!(out.contains("⭐ 4.8/5 (312 reviews)"));
        assert!(out.contains("Time: 4 hr"));
        assert!(out.contains("Mascarpone, Eggs, Savoiardi, Coffee, Cocoa (+2 more)"));
        assert!(out.contains("2. Quick Tiramisu"));
        assert!(out.contains("⭐ 4.1/5\n"));
        assert!(out.ends_with("https://www.google.com/search?q=tiramisu"));
    }

    #[test]
    fn nothing_found() {
        assert_eq!(format_recipes("gruel", &json!({})), "No recipes found for 'gruel'.");
    }
}
