//! Flight search via SerpApi's Google Flights engine.

use crate::http::{required_str, text};
use crate::serpapi::{SerpApi, entries};
use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use serde_json::Value;
use std::fmt::Write;

const SHOWN: usize = 5;

pub struct SearchFlightsTool {
    serp: SerpApi,
    currency: String,
}

impl SearchFlightsTool {
    pub fn new(serp: SerpApi, currency: impl Into<String>) -> Self {
        Self {
            serp,
            currency: currency.into(),
        }
    }
}

#[async_trait]
impl Tool for SearchFlightsTool {
    fn name(&self) -> &str {
        "search_flights"
    }

    fn description(&self) -> &str {
        "Search for flights between two airports. Returns airline, flight number, price, duration, departure and arrival times, and stops."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "origin": {
                    "type": "string",
                    "description": "Departure airport code (e.g. \"HYD\", \"JFK\")"
                },
                "destination": {
                    "type": "string",
                    "description": "Arrival airport code (e.g. \"BOM\", \"LAX\")"
                },
                "departure_date": {
                    "type": "string",
                    "description": "Departure date, YYYY-MM-DD"
                },
                "return_date": {
                    "type": "string",
                    "description": "Optional return date, YYYY-MM-DD"
                }
            },
            "required": ["origin", "destination", "departure_date"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let query = FlightQuery {
            origin: required_str(&arguments, "origin")?.to_uppercase(),
            destination: required_str(&arguments, "destination")?.to_uppercase(),
            departure_date: required_str(&arguments, "departure_date")?.to_string(),
            return_date: arguments["return_date"]
                .as_str()
                .filter(|s| !s.trim().is_empty())
                .map(String::from),
        };

        let mut params = vec![
            ("hl", "en".to_string()),
            ("gl", "us".to_string()),
            ("departure_id", query.origin.clone()),
            ("arrival_id", query.destination.clone()),
            ("outbound_date", query.departure_date.clone()),
            ("currency", self.currency.clone()),
        ];
        match &query.return_date {
            Some(date) => params.push(("return_date", date.clone())),
            // One-way trips must say so or the engine expects a return date.
            None => params.push(("type", "2".to_string())),
        }

        let results = self.serp.search(self.name(), Some("google_flights"), params).await?;
        Ok(ToolResult::ok(format_flights(&query, &self.currency, &results)))
    }
}

pub(crate) struct FlightQuery {
    pub origin: String,
    pub destination: String,
    pub departure_date: String,
    pub return_date: Option<String>,
}

/// `"2025-03-01 06:15"` → `"06:15"`.
fn clock(time: &Value) -> String {
    let full = text(time, "");
    match full.split_once(' ') {
        Some((_, hm)) => hm.to_string(),
        None => full,
    }
}

pub(crate) fn format_flights(query: &FlightQuery, currency: &str, results: &Value) -> String {
    let all: Vec<&Value> = entries(results, "best_flights")
        .iter()
        .chain(entries(results, "other_flights"))
        .collect();

    if all.is_empty() {
        return format!(
            "No flights found for {} to {} on {}.",
            query.origin, query.destination, query.departure_date
        );
    }

    let mut out = format!("✈️ Flights from {} to {}\n", query.origin, query.destination);
    let _ = write!(out, "📅 Departure: {}", query.departure_date);
    if let Some(ret) = &query.return_date {
        let _ = write!(out, " | Return: {ret}");
    }
    out.push_str("\n\n");

    for (idx, group) in all.iter().take(SHOWN).enumerate() {
        let segments = group["flights"].as_array().map(Vec::as_slice).unwrap_or(&[]);
        let (airline, number, departs, arrives) = match (segments.first(), segments.last()) {
            (Some(first), Some(last)) => (
                text(&first["airline"], "Unknown"),
                text(&first["flight_number"], ""),
                clock(&first["departure_airport"]["time"]),
                clock(&last["arrival_airport"]["time"]),
            ),
            _ => ("Unknown Airline".into(), String::new(), String::new(), String::new()),
        };

        let _ = writeln!(out, "{}. {airline} ({number})", idx + 1);
        let _ = writeln!(
            out,
            "   💵 {currency} {} | ⏱️ {} min",
            text(&group["price"], "N/A"),
            text(&group["total_duration"], "N/A")
        );
        let _ = writeln!(out, "   🛫 {departs} -> 🛬 {arrives}");
        match group["layovers"].as_array().map(Vec::len) {
            Some(stops) if stops > 0 => {
                let _ = writeln!(out, "   🛑 {stops} stop(s)");
            }
            _ => out.push_str("   Non-stop\n"),
        }
        out.push('\n');
    }

    if let Some(url) = results["search_metadata"]["google_flights_url"].as_str() {
        let _ = write!(out, "🔗 View on Google Flights: {url}");
    }

    out.trim_end().to_string()
}
