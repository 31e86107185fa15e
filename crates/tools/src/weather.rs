//! Current weather from OpenWeatherMap.

use crate::http::{ApiClient, require_key, required_str, text};
use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use serde_json::Value;

const OPENWEATHER_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

pub struct WeatherTool {
    http: ApiClient,
    api_key: Option<String>,
}

impl WeatherTool {
    pub fn new(http: ApiClient, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl Tool for WeatherTool {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "Get the current weather for a city. Returns conditions, temperature, humidity, and wind speed."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "The city name to look up weather for (e.g. \"Hyderabad\")"
                },
                "units": {
                    "type": "string",
                    "enum": ["metric", "imperial"],
                    "description": "Temperature units (default: metric)",
                    "default": "metric"
                }
            },
            "required": ["location"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let location = required_str(&arguments, "location")?;
        let units = match arguments["units"].as_str() {
            Some("imperial") => "imperial",
            _ => "metric",
        };
        let key = require_key(self.name(), &self.api_key, "OPENWEATHER_API_KEY")?;

        let query = [
            ("q", location.to_string()),
            ("appid", key.to_string()),
            ("units", units.to_string()),
        ];
        let data = self.http.get_json(self.name(), OPENWEATHER_URL, &query).await?;
        Ok(ToolResult::ok(format_weather(location, units, &data)))
    }
}

pub(crate) fn format_weather(location: &str, units: &str, data: &Value) -> String {
    let (temp_unit, speed_unit) = if units == "imperial" {
        ("°F", "mph")
    } else {
        ("°C", "m/s")
    };

    let place = match (data["name"].as_str(), data["sys"]["country"].as_str()) {
        (Some(name), Some(country)) => format!("{name}, {country}"),
        (Some(name), None) => name.to_string(),
        _ => location.to_string(),
    };
    let conditions = text(&data["weather"][0]["description"], "unknown conditions");

    format!(
        "Weather in {place}: {conditions}. Temperature {}{temp_unit} (feels like {}{temp_unit}), humidity {}%, wind {} {speed_unit}.",
        text(&data["main"]["temp"], "?"),
        text(&data["main"]["feels_like"], "?"),
        text(&data["main"]["humidity"], "?"),
        text(&data["wind"]["speed"], "?"),
    )
}
