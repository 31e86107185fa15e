//! Domain event system — decoupled observation of the routing engine.
//!
//! The graph, responders and memory client publish events; anything that
//! wants to watch (a CLI status line, tests) subscribes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use crate::route::Route;

/// All domain events in the system.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DomainEvent {
    /// A user message was accepted for a thread
    MessageReceived {
        thread_id: String,
        user_id: String,
        content_preview: String,
        timestamp: DateTime<Utc>,
    },

    /// The supervisor chose where the message goes
    RouteDecided {
        thread_id: String,
        route: Route,
        /// False when the model output was coerced to `respond`
        valid: bool,
        timestamp: DateTime<Utc>,
    },

    /// A capability adapter ran
    ToolExecuted {
        tool_name: String,
        success: bool,
        duration_ms: u64,
        timestamp: DateTime<Utc>,
    },

    /// A responder produced its final answer
    ResponseGenerated {
        thread_id: String,
        responder: String,
        tokens_used: u32,
        timestamp: DateTime<Utc>,
    },

    /// The memory service was read or written
    MemoryAccessed {
        operation: String, // "retrieve", "retrieve_all", "persist"
        user_id: String,
        count: usize,
        success: bool,
        timestamp: DateTime<Utc>,
    },

    /// A turn failed fatally
    ErrorOccurred {
        context: String,
        error_message: String,
        timestamp: DateTime<Utc>,
    },
}

impl DomainEvent {
    /// Stable snake_case name of the event kind.
    pub fn kind(&self) -> &'static str {
        match self {
            DomainEvent::MessageReceived { .. } => "message_received",
            DomainEvent::RouteDecided { .. } => "route_decided",
            DomainEvent::ToolExecuted { .. } => "tool_executed",
            DomainEvent::ResponseGenerated { .. } => "response_generated",
            DomainEvent::MemoryAccessed { .. } => "memory_accessed",
            DomainEvent::ErrorOccurred { .. } => "error_occurred",
        }
    }
}

impl std::fmt::Display for DomainEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainEvent::MessageReceived { thread_id, user_id, .. } => {
                write!(f, "message from {user_id} on {thread_id}")
            }
            DomainEvent::RouteDecided { route, valid: true, .. } => write!(f, "route -> {route}"),
            DomainEvent::RouteDecided { route, valid: false, .. } => {
                write!(f, "route -> {route} (unrecognized decision)")
            }
            DomainEvent::ToolExecuted { tool_name, success, duration_ms, .. } => {
                let outcome = if *success { "ok" } else { "failed" };
                write!(f, "tool {tool_name} {outcome} in {duration_ms}ms")
            }
            DomainEvent::ResponseGenerated { responder, tokens_used, .. } => {
                write!(f, "{responder} replied ({tokens_used} tokens)")
            }
            DomainEvent::MemoryAccessed { operation, count, success, .. } => {
                let outcome = if *success { "ok" } else { "failed" };
                write!(f, "memory {operation} {outcome} ({count})")
            }
            DomainEvent::ErrorOccurred { context, error_message, .. } => {
                write!(f, "error in {context}: {error_message}")
            }
        }
    }
}

/// A broadcast-based event bus for domain events.
///
/// Uses `tokio::sync::broadcast` for multi-consumer pub/sub.
pub struct EventBus {
    sender: broadcast::Sender<Arc<DomainEvent>>,
}

impl EventBus {
    /// Create a new event bus with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers.
    pub fn publish(&self, event: DomainEvent) {
        // No subscribers is fine
        let _ = self.sender.send(Arc::new(event));
    }

    /// Subscribe to receive events.
    pub fn subscribe(&self) -> broadcast::Receiver<Arc<DomainEvent>> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}
