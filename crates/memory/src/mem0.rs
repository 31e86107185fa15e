//! Mem0 hosted memory service client.
//!
//! Searches go to `POST /v2/memories/search/` with a user filter; new
//! interactions go to `POST /v1/memories/`, where Mem0 extracts facts.

use async_trait::async_trait;
use concierge_core::error::MemoryError;
use concierge_core::memory::{MemoryRecord, MemorySearch, MemoryService};
use concierge_core::message::Message;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

/// HTTP client for the Mem0 platform API.
pub struct Mem0Client {
    base_url: String,
    api_key: String,
    version: String,
    client: reqwest::Client,
}

impl Mem0Client {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            version: version.into(),
            client,
        }
    }

    fn search_body(&self, search: &MemorySearch) -> Value {
        let mut body = json!({
            "query": search.query,
            "version": self.version,
            "filters": { "OR": [ { "user_id": search.user_id } ] },
        });
        if let Some(limit) = search.limit {
            body["limit"] = json!(limit);
        }
        body
    }

    fn add_body(user_id: &str, interaction: &[Message]) -> Value {
        let messages: Vec<Value> = interaction
            .iter()
            .map(|m| json!({ "role": m.role.as_str(), "content": m.content }))
            .collect();
        json!({ "messages": messages, "user_id": user_id })
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, MemoryError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Token {}", self.api_key))
            .json(body)
            .send()
            .await
            .map_err(|e| MemoryError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(MemoryError::Api {
                status_code: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| MemoryError::Malformed(e.to_string()))
    }
}

/// Mem0 answers either with a bare list or with `{"results": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Wrapped { results: Vec<T> },
    Bare(Vec<T>),
}

impl<T> Envelope<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Envelope::Wrapped { results } | Envelope::Bare(results) => results,
        }
    }
}

fn parse_records(body: Value, user_id: &str) -> Result<Vec<MemoryRecord>, MemoryError> {
    let envelope: Envelope<MemoryRecord> =
        serde_json::from_value(body).map_err(|e| MemoryError::Malformed(e.to_string()))?;
    Ok(envelope
        .into_vec()
        .into_iter()
        .map(|mut r| {
            if r.user_id.is_empty() {
                r.user_id = user_id.to_string();
            }
            r
        })
        .collect())
}

fn count_added(body: Value) -> usize {
    serde_json::from_value::<Envelope<Value>>(body)
        .map(|e| e.into_vec().len())
        .unwrap_or(0)
}

#[async_trait]
impl MemoryService for Mem0Client {
    fn name(&self) -> &str { "mem0" }

    async fn search(&self, search: MemorySearch) -> Result<Vec<MemoryRecord>, MemoryError> {
        let body = self.search_body(&search);
        debug!(user_id = %search.user_id, limit = ?search.limit, "Searching Mem0");
        let response = self.post("/v2/memories/search/", &body).await?;
        parse_records(response, &search.user_id)
    }

    async fn add(&self, user_id: &str, interaction: &[Message]) -> Result<usize, MemoryError> {
        let body = Self::add_body(user_id, interaction);
        let response = self.post("/v1/memories/", &body).await?;
        Ok(count_added(response))
    }
}
