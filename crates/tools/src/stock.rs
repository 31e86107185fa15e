//! Stock quotes and company profiles from Alpha Vantage.

use crate::http::{ApiClient, require_key, required_str, text};
use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use serde_json::Value;
use std::fmt::Write;

const ALPHAVANTAGE_URL: &str = "https://www.alphavantage.co/query";
const ALPHAVANTAGE_ENV: &str = "ALPHAVANTAGE_API_KEY";

fn symbol_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "symbol": {
                "type": "string",
                "description": "Ticker symbol (e.g. \"AAPL\", \"RELIANCE.BSE\")"
            }
        },
        "required": ["symbol"]
    })
}

async fn query(
    http: &ApiClient,
    api_key: &Option<String>,
    tool_name: &str,
    function: &str,
    symbol: &str,
) -> Result<Value, ToolError> {
    let key = require_key(tool_name, api_key, ALPHAVANTAGE_ENV)?;
    let params = [
        ("function", function.to_string()),
        ("symbol", symbol.to_string()),
        ("apikey", key.to_string()),
    ];
    let data = http.get_json(tool_name, ALPHAVANTAGE_URL, &params).await?;
    check_payload(tool_name, data)
}

/// Alpha Vantage reports errors and throttling with HTTP 200.
fn check_payload(tool_name: &str, data: Value) -> Result<Value, ToolError> {
    for key in ["Error Message", "Note", "Information"] {
        if let Some(message) = data[key].as_str() {
            return Err(ToolError::Upstream {
                tool_name: tool_name.into(),
                message: message.to_string(),
            });
        }
    }
    Ok(data)
}

pub struct StockPriceTool {
    http: ApiClient,
    api_key: Option<String>,
}

impl StockPriceTool {
    pub fn new(http: ApiClient, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl Tool for StockPriceTool {
    fn name(&self) -> &str {
        "get_stock_price"
    }

    fn description(&self) -> &str {
        "Get the latest stock quote for a ticker symbol: price, change, change percent, and volume."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        symbol_schema()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let symbol = required_str(&arguments, "symbol")?.to_uppercase();
        let data = query(&self.http, &self.api_key, self.name(), "GLOBAL_QUOTE", &symbol).await?;
        Ok(ToolResult::ok(format_quote(&symbol, &data)))
    }
}

pub(crate) fn format_quote(symbol: &str, data: &Value) -> String {
    let quote = &data["Global Quote"];
    if quote.as_object().is_none_or(|q| q.is_empty()) {
        return format!("No quote found for {symbol}.");
    }
    format!(
        "{}: {} ({} / {}) | volume {} | as of {}",
        text(&quote["01. symbol"], symbol),
        text(&quote["05. price"], "N/A"),
        text(&quote["09. change"], "N/A"),
        text(&quote["10. change percent"], "N/A"),
        text(&quote["06. volume"], "N/A"),
        text(&quote["07. latest trading day"], "N/A"),
    )
}

pub struct CompanyInfoTool {
    http: ApiClient,
    api_key: Option<String>,
}

impl CompanyInfoTool {
    pub fn new(http: ApiClient, api_key: Option<String>) -> Self {
        Self { http, api_key }
    }
}

#[async_trait]
impl Tool for CompanyInfoTool {
    fn name(&self) -> &str {
        "get_company_info"
    }

    fn description(&self) -> &str {
        "Get a company profile for a ticker symbol: sector, industry, market cap, P/E, dividend yield, 52-week range, and description."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        symbol_schema()
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let symbol = required_str(&arguments, "symbol")?.to_uppercase();
        let data = query(&self.http, &self.api_key, self.name(), "OVERVIEW", &symbol).await?;
        Ok(ToolResult::ok(format_overview(&symbol, &data)))
    }
}

pub(crate) fn format_overview(symbol: &str, data: &Value) -> String {
    let Some(name) = data["Name"].as_str() else {
        return format!("No company information found for {symbol}.");
    };

    let mut out = format!("{name} ({})\n", text(&data["Symbol"], symbol));
    for (label, key) in [
        ("Sector", "Sector"),
        ("Industry", "Industry"),
        ("Market cap", "MarketCapitalization"),
        ("P/E ratio", "PERatio"),
        ("Dividend yield", "DividendYield"),
        ("52-week high", "52WeekHigh"),
        ("52-week low", "52WeekLow"),
    ] {
        let _ = writeln!(out, "{label}: {}", text(&data[key], "N/A"));
    }
    if let Some(description) = data["Description"].as_str() {
        let _ = writeln!(out, "\n{description}");
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn formats_quote() {
        let data = json!({"Global Quote": {
            "01. symbol": "AAPL",
            "05. price": "227.5200",
            "06. volume": "41001212",
            "07. latest trading day": "2025-02-28",
            "09. change": "1.3400",
            "10. change percent": "0.5924%"
        }});
        let out = format_quote("AAPL", &data);
        assert_eq!(
            out,
            "AAPL: 227.5200 (1.3400 / 0.5924%) | volume 41001212 | as of 2025-02-28"
        );
    }

    #[test]
    fn unknown_symbol_has_empty_quote() {
        let out = format_quote("ZZZZ", &json!({"Global Quote": {}}));
        assert_eq!(out, "No quote found for ZZZZ.");
    }

    #[test]
    fn formats_overview() {
        let data = json!({
            "Symbol": "MSFT", "Name": "Microsoft Corporation",
            "Sector": "TECHNOLOGY", "Industry": "SERVICES-PREPACKAGED SOFTWARE",
            "MarketCapitalization": "3090000000000", "PERatio": "35.1",
            "Description": "Microsoft develops software."
        });
        let out = format_overview("MSFT", &data);
        assert!(out.starts_with("Microsoft Corporation (MSFT)"));
        assert!(out.contains("Sector: TECHNOLOGY"));
        assert!(out.contains("Dividend yield: N/A"));
        assert!(out.ends_with("Microsoft develops software."));
    }

    #[test]
    fn throttling_note_is_an_error() {
        let err = check_payload(
            "get_stock_price",
            json!({"Note": "Thank you for using Alpha Vantage! Our standard API rate limit is 25 requests per day."}),
        )
        .unwrap_err();
        assert!(err.to_string().contains("rate limit"));
    }

    #[tokio::test]
    async fn missing_key_is_reported() {
        let tool = CompanyInfoTool::new(ApiClient::new(1), None);
        let err = tool
            .execute(json!({"symbol": "msft"}), &ToolContext::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains(ALPHAVANTAGE_ENV));
    }
}
