//! Hotel search via SerpApi's Google Hotels engine.

use crate::http::{required_str, text};
use crate::serpapi::{SerpApi, entries};
use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use serde_json::Value;
use std::fmt::Write;

const SHOWN: usize = 5;
const DEFAULT_GUESTS: u64 = 2;

pub struct SearchHotelsTool {
    serp: SerpApi,
    currency: String,
}

impl SearchHotelsTool {
    pub fn new(serp: SerpApi, currency: impl Into<String>) -> Self {
        Self {
            serp,
            currency: currency.into(),
        }
    }
}

#[async_trait]
impl Tool for SearchHotelsTool {
    fn name(&self) -> &str {
        "search_hotels"
    }

    fn description(&self) -> &str {
        "Search for hotels in a city for given dates. Returns name, nightly price, rating, top amenities, and booking links."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "City or area (e.g. \"Paris\", \"Rajahmundry\")"
                },
                "check_in": {
                    "type": "string",
                    "description": "Check-in date, YYYY-MM-DD"
                },
                "check_out": {
                    "type": "string",
                    "description": "Check-out date, YYYY-MM-DD"
                },
                "guests": {
                    "type": "integer",
                    "description": "Number of adults (default 2)",
                    "default": 2
                }
            },
            "required": ["location", "check_in", "check_out"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let location = required_str(&arguments, "location")?;
        let check_in = required_str(&arguments, "check_in")?;
        let check_out = required_str(&arguments, "check_out")?;
        let guests = arguments["guests"].as_u64().unwrap_or(DEFAULT_GUESTS).max(1);

        let params = vec![
            ("q", format!("hotels in {location}")),
            ("hl", "en".to_string()),
            ("gl", "us".to_string()),
            ("check_in_date", check_in.to_string()),
            ("check_out_date", check_out.to_string()),
            ("adults", guests.to_string()),
            ("currency", self.currency.clone()),
        ];

        let results = self.serp.search(self.name(), Some("google_hotels"), params).await?;
        Ok(ToolResult::ok(format_hotels(location, check_in, check_out, guests, &results)))
    }
}

pub(crate) fn format_hotels(
    location: &str,
    check_in: &str,
    check_out: &str,
    guests: u64,
    results: &Value,
) -> String {
    let mut properties = entries(results, "properties");
    if properties.is_empty() {
        properties = entries(results, "ads");
    }
    if properties.is_empty() {
        return format!("No hotels found for {location} from {check_in} to {check_out}.");
    }

    let mut out = format!("🏨 Hotels in {location}\n");
    let _ = writeln!(out, "📅 Dates: {check_in} to {check_out} ({guests} guests)\n");

    for (idx, hotel) in properties.iter().take(SHOWN).enumerate() {
        let price = match text(&hotel["price"], "") {
            p if !p.is_empty() => p,
            _ => text(&hotel["rate_per_night"]["lowest"], "N/A"),
        };
        let amenities: Vec<String> = hotel["amenities"]
            .as_array()
            .map(|a| a.iter().take(3).map(|v| text(v, "")).collect())
            .unwrap_or_default();

        let _ = writeln!(out, "{}. {}", idx + 1, text(&hotel["name"], "Unknown Hotel"));
        let _ = writeln!(
            out,
            "   💵 {price} | ⭐ {} ({} reviews)",
            text(&hotel["overall_rating"], "N/A"),
            text(&hotel["reviews"], "0")
        );
        if !amenities.is_empty() {
            let _ = writeln!(out, "   ✨ {}", amenities.join(", "));
        }
        if let Some(link) = hotel["link"].as_str() {
            let _ = writeln!(out, "   🔗 Book: {link}");
        }
        out.push('\n');
    }

    if let Some(url) = results["search_metadata"]["google_hotels_url"].as_str() {
        let _ = write!(out, "🔗 All results: {url}");
    }

    out.trim_end().to_string()
}
