//! # Concierge Core
//!
//! Domain types, traits, and error definitions for the Concierge routing
//! assistant. Every external collaborator (reasoning model, capability
//! adapter, memory service, checkpoint store) is a trait here; the other
//! crates implement against it.
//!
//! ## Design Philosophy
//!
//! - Routing decisions are a closed enum ([`Route`]), parsed once at the
//!   boundary and matched exhaustively everywhere else.
//! - Conversation turns have exactly one shape ([`Message`]).
//! - Service handles are constructed once and injected as `Arc<dyn Trait>`;
//!   nothing here is a global.

pub mod error;
pub mod event;
pub mod memory;
pub mod message;
pub mod provider;
pub mod route;
pub mod state;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use error::{Error, Result};
pub use event::{DomainEvent, EventBus};
pub use memory::{MemoryRecord, MemorySearch, MemoryService};
pub use message::{Message, MessageToolCall, Role, ThreadId};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition};
pub use route::{Route, Specialist};
pub use state::{CheckpointStore, ConversationState};
pub use tool::{Tool, ToolCall, ToolRegistry, ToolResult};
