//! Memory tools — let the memory specialist query long-term memory on demand.
//!
//! The user is always the one bound to the active conversation; the model
//! cannot ask about somebody else.

use crate::http::required_str;
use async_trait::async_trait;
use concierge_core::error::ToolError;
use concierge_core::memory::{MemoryRecord, MemorySearch, MemoryService};
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use std::fmt::Write;
use std::sync::Arc;

fn numbered(header: String, records: &[MemoryRecord]) -> String {
    let mut out = header;
    out.push_str("\n\n");
    for (idx, record) in records.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", idx + 1, record.memory);
    }
    out.trim_end().to_string()
}

fn failed(tool_name: &str, e: impl std::fmt::Display) -> ToolError {
    ToolError::ExecutionFailed {
        tool_name: tool_name.into(),
        reason: e.to_string(),
    }
}

pub struct SearchMemoriesTool {
    service: Arc<dyn MemoryService>,
}

impl SearchMemoriesTool {
    pub fn new(service: Arc<dyn MemoryService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Tool for SearchMemoriesTool {
    fn name(&self) -> &str {
        "search_memories"
    }

    fn description(&self) -> &str {
        "Search stored memories about the user. Use this when the user asks about past conversations, preferences, or personal information."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "What to look for in the user's memories"
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let query = required_str(&arguments, "query")?;
        let records = self
            .service
            .search(MemorySearch::new(query, &ctx.user_id))
            .await
            .map_err(|e| failed(self.name(), e))?;

        if records.is_empty() {
            return Ok(ToolResult::ok("No relevant memories found for this query."));
        }
        let header = format!("Found {} relevant memories:", records.len());
        Ok(ToolResult::ok(numbered(header, &records)))
    }
}

/// Lists the user's memories for the memory specialist.
///
/// Queries the service directly instead of going through `MemoryClient`:
/// an outage has to reach the model as error text, not as an empty list.
pub struct GetAllMemoriesTool {
    service: Arc<dyn MemoryService>,
    limit: usize,
}

impl GetAllMemoriesTool {
    pub fn new(service: Arc<dyn MemoryService>, limit: usize) -> Self {
        Self { service, limit }
    }
}

#[async_trait]
impl Tool for GetAllMemoriesTool {
    fn name(&self) -> &str {
        "get_all_memories"
    }

    fn description(&self) -> &str {
        "List everything remembered about the user. Use this for \"what do you know about me?\" or \"what do you remember?\"."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(
        &self,
        _arguments: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let records = self
            .service
            .search(MemorySearch::new("", &ctx.user_id).with_limit(self.limit))
            .await
            .map_err(|e| failed(self.name(), e))?;

        if records.is_empty() {
            return Ok(ToolResult::ok("I don't have any stored memories yet."));
        }
        let header = format!("I have {} memories about you:", records.len());
        Ok(ToolResult::ok(numbered(header, &records)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concierge_core::error::MemoryError;
    use concierge_core::message::Message;
    use serde_json::json;
    use std::sync::Mutex;

    /// Records every search so tests can check the user scoping.
    #[derive(Default)]
    struct FakeMemory {
        records: Vec<MemoryRecord>,
        searches: Mutex<Vec<MemorySearch>>,
        down: bool,
    }

    #[async_trait]
    impl MemoryService for FakeMemory {
        fn name(&self) -> &str { "fake" }

        async fn search(&self, search: MemorySearch) -> Result<Vec<MemoryRecord>, MemoryError> {
            self.searches.lock().unwrap().push(search);
            if self.down {
                return Err(MemoryError::Request("timed out".into()));
            }
            Ok(self.records.clone())
        }

        async fn add(&self, _user_id: &str, _interaction: &[Message]) -> Result<usize, MemoryError> {
            Ok(0)
        }
    }

    #[tokio::test]
    async fn search_is_bound_to_conversation_user() {
        let mem = Arc::new(FakeMemory {
            records: vec![MemoryRecord::new("samantha", "Likes fighter jets")],
            ..Default::default()
        });
        let tool = SearchMemoriesTool::new(mem.clone());
        let result = tool
            .execute(json!({"query": "jets", "user_id": "mallory"}), &ToolContext::for_user("samantha"))
            .await
            .unwrap();

        assert_eq!(result.output, "Found 1 relevant memories:\n\n1. Likes fighter jets");
        assert_eq!(mem.searches.lock().unwrap()[0].user_id, "samantha");
    }

    #[tokio::test]
    async fn list_uses_limit_and_empty_query() {
        let mem = Arc::new(FakeMemory::default());
        let tool = GetAllMemoriesTool::new(mem.clone(), 50);
        let result = tool.execute(json!({}), &ToolContext::for_user("samantha")).await.unwrap();

        assert_eq!(result.output, "I don't have any stored memories yet.");
        let searches = mem.searches.lock().unwrap();
        assert_eq!(searches[0].query, "");
        assert_eq!(searches[0].limit, Some(50));
    }

    #[tokio::test]
    async fn outage_becomes_tool_error() {
        let mem = Arc::new(FakeMemory { down: true, ..Default::default() });
        let tool = GetAllMemoriesTool::new(mem, 50);
        let err = tool.execute(json!({}), &ToolContext::for_user("u")).await.unwrap_err();
        assert!(err.to_string().contains("timed out"));
    }
}
