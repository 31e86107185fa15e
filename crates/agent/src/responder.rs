//! The responder seam: every non-supervisor node of the graph.

use async_trait::async_trait;
use concierge_core::message::{Message, ThreadId};
use concierge_core::state::ConversationState;

/// Where the graph goes after a responder finishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Next {
    /// Terminate the traversal.
    Finish,
    /// Hand control back to the Supervisor for another decision.
    Supervisor,
}

/// What a responder adds to the conversation.
#[derive(Debug, Clone)]
pub struct ResponderOutput {
    pub turns: Vec<Message>,
    pub next: Next,
}

impl ResponderOutput {
    /// A single assistant reply that ends the traversal.
    pub fn finish(reply: impl Into<String>) -> Self {
        Self {
            turns: vec![Message::assistant(reply)],
            next: Next::Finish,
        }
    }
}

#[async_trait]
pub trait Responder: Send + Sync {
    fn name(&self) -> &str;

    async fn run(
        &self,
        thread_id: &ThreadId,
        state: &ConversationState,
    ) -> Result<ResponderOutput, concierge_core::Error>;
}
