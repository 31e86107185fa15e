//! Shared test doubles for the agent crate.

use async_trait::async_trait;
use concierge_core::error::{MemoryError, ProviderError, ToolError};
use concierge_core::memory::{MemoryRecord, MemorySearch, MemoryService};
use concierge_core::message::{Message, MessageToolCall};
use concierge_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use concierge_core::tool::{Tool, ToolContext, ToolResult};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// A provider that replays a script of responses and records every request.
///
/// Running past the end of the script is a provider error, not a panic, so
/// tests can exercise fatal-turn handling.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::with_results(responses.into_iter().map(Ok).collect())
    }

    pub fn with_results(results: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ProviderError::NotConfigured("script exhausted".into())))
    }
}

/// A plain text completion.
pub fn text(content: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(content),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// A completion that requests tool calls.
pub fn tool_calls(calls: Vec<MessageToolCall>) -> ProviderResponse {
    let mut response = text("");
    response.message.tool_calls = calls;
    response
}

pub fn call(name: &str, args: serde_json::Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: args.to_string(),
    }
}

/// A tool that returns a fixed output and records its arguments.
pub struct RecordingTool {
    name: String,
    output: String,
    calls: Arc<Mutex<Vec<serde_json::Value>>>,
}

impl RecordingTool {
    pub fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<serde_json::Value>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Records its arguments"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(
        &self,
        arguments: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        self.calls.lock().unwrap().push(arguments);
        Ok(ToolResult::ok(&self.output))
    }
}

/// A tool whose upstream is always down.
pub struct FailingTool {
    name: String,
}

impl FailingTool {
    pub fn new(name: &str) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({"type": "object", "properties": {}})
    }

    async fn execute(
        &self,
        _arguments: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        Err(ToolError::Upstream {
            tool_name: self.name.clone(),
            message: "service unavailable".into(),
        })
    }
}

/// A memory service that records writes and can be switched off.
#[derive(Default)]
pub struct FakeMemory {
    pub records: Mutex<Vec<MemoryRecord>>,
    pub searches: Mutex<Vec<MemorySearch>>,
    pub writes: Mutex<Vec<(String, Vec<Message>)>>,
    pub down: bool,
}

impl FakeMemory {
    pub fn down() -> Self {
        Self {
            down: true,
            ..Default::default()
        }
    }

    pub fn with_memories(memories: &[&str]) -> Self {
        let memory = Self::default();
        *memory.records.lock().unwrap() = memories
            .iter()
            .map(|m| MemoryRecord::new("samantha", *m))
            .collect();
        memory
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl MemoryService for FakeMemory {
    fn name(&self) -> &str {
        "fake"
    }

    async fn search(&self, search: MemorySearch) -> Result<Vec<MemoryRecord>, MemoryError> {
        self.searches.lock().unwrap().push(search);
        if self.down {
            return Err(MemoryError::Request("connection refused".into()));
        }
        Ok(self.records.lock().unwrap().clone())
    }

    async fn add(&self, user_id: &str, interaction: &[Message]) -> Result<usize, MemoryError> {
        if self.down {
            return Err(MemoryError::Request("connection refused".into()));
        }
        self.writes
            .lock()
            .unwrap()
            .push((user_id.to_string(), interaction.to_vec()));
        Ok(1)
    }
}
