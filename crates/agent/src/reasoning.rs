//! The reason-and-act loop every specialist runs.
//!
//! The model sees the instructions plus the conversation, may request tool
//! calls, observes their results and eventually answers in plain text. Tool
//! calls and their results live only in the loop's scratch transcript; the
//! caller gets back the final answer.

use std::sync::Arc;
use std::time::Instant;
use chrono::Utc;
use concierge_core::error::ToolError;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::message::{Message, MessageToolCall, Role};
use concierge_core::provider::{ModelOptions, Provider};
use concierge_core::tool::{ToolCall, ToolContext, ToolRegistry, ToolResult};
use futures::future::join_all;
use tracing::{debug, info, warn};

pub const MAX_ITERATIONS_REPLY: &str =
    "I've reached the maximum number of tool call iterations. Please provide further guidance.";

/// What a finished loop produced.
#[derive(Debug, Clone, PartialEq)]
pub struct LoopOutcome {
    pub answer: String,
    pub iterations: u32,
    pub tool_calls: usize,
    pub tokens_used: u32,
}

pub struct ReasoningLoop {
    provider: Arc<dyn Provider>,
    options: ModelOptions,
    max_iterations: u32,
    events: Arc<EventBus>,
}

impl ReasoningLoop {
    pub fn new(provider: Arc<dyn Provider>, options: ModelOptions, events: Arc<EventBus>) -> Self {
        Self {
            provider,
            options,
            max_iterations: 10,
            events,
        }
    }

    /// Set the maximum number of model calls per run.
    pub fn with_max_iterations(mut self, max: u32) -> Self {
        self.max_iterations = max;
        self
    }

    pub async fn run(
        &self,
        instructions: &str,
        history: &[Message],
        tools: &ToolRegistry,
        ctx: &ToolContext,
    ) -> Result<LoopOutcome, concierge_core::Error> {
        let mut scratch = Vec::with_capacity(history.len() + 1);
        scratch.push(Message::system(instructions));
        scratch.extend(history.iter().filter(|m| m.role != Role::Tool).cloned());

        let definitions = tools.definitions();
        let mut outcome = LoopOutcome {
            answer: String::new(),
            iterations: 0,
            tool_calls: 0,
            tokens_used: 0,
        };

        info!(tools = ?tools.names(), user_id = %ctx.user_id, "Starting reasoning loop");

        while outcome.iterations < self.max_iterations {
            outcome.iterations += 1;
            debug!(iteration = outcome.iterations, "Reasoning loop iteration");

            let request = self.options.request(scratch.clone(), definitions.clone());
            let response = self.provider.complete(request).await?;
            if let Some(usage) = &response.usage {
                outcome.tokens_used += usage.total_tokens;
            }

            if response.message.tool_calls.is_empty() {
                outcome.answer = response.message.content;
                return Ok(outcome);
            }

            let calls = response.message.tool_calls.clone();
            debug!(tool_count = calls.len(), "Executing tool calls");
            scratch.push(response.message);

            // Calls requested in one step run concurrently; results keep request order.
            let results = join_all(calls.iter().map(|tc| self.invoke(tools, tc, ctx))).await;
            outcome.tool_calls += calls.len();
            for (tc, result) in calls.iter().zip(results) {
                scratch.push(Message::tool_result(&tc.id, result.output));
            }
        }

        warn!(
            iterations = outcome.iterations,
            "Max tool iterations reached, returning without a final answer"
        );
        outcome.answer = MAX_ITERATIONS_REPLY.into();
        Ok(outcome)
    }

    async fn invoke(&self, tools: &ToolRegistry, tc: &MessageToolCall, ctx: &ToolContext) -> ToolResult {
        let start = Instant::now();
        let result = match parse_arguments(&tc.arguments) {
            Ok(arguments) => {
                let call = ToolCall {
                    id: tc.id.clone(),
                    name: tc.name.clone(),
                    arguments,
                };
                tools.invoke(&call, ctx).await
            }
            Err(e) => {
                warn!(tool = %tc.name, error = %e, "Unparseable tool arguments");
                ToolResult::from_error(&tc.id, &e)
            }
        };

        self.events.publish(DomainEvent::ToolExecuted {
            tool_name: tc.name.clone(),
            success: result.success,
            duration_ms: start.elapsed().as_millis() as u64,
            timestamp: Utc::now(),
        });
        result
    }
}

fn parse_arguments(raw: &str) -> Result<serde_json::Value, ToolError> {
    if raw.trim().is_empty() {
        return Ok(serde_json::json!({}));
    }
    serde_json::from_str(raw)
        .map_err(|e| ToolError::InvalidArguments(format!("arguments are not valid JSON: {e}")))
}
