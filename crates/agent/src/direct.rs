//! The direct responder answers conversationally, without tools.
//!
//! It is the only node that writes to long-term memory: every reply it
//! produces is persisted together with the user text that prompted it.

use crate::responder::{Responder, ResponderOutput};
use async_trait::async_trait;
use chrono::Utc;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::message::{Message, ThreadId};
use concierge_core::provider::{ModelOptions, Provider};
use concierge_core::state::ConversationState;
use concierge_memory::MemoryClient;
use std::sync::Arc;
use tracing::info;

pub fn conversational_instructions(persona: &str) -> String {
    format!(
        "You are {persona}, a friendly and helpful AI assistant. \
         Respond naturally to greetings, introductions, and casual conversation. \
         Use the provided context from past conversations to personalize your responses. \
         Provide direct and straightforward answers without unnecessary fluff. Get straight to the point."
    )
}

pub struct DirectResponder {
    provider: Arc<dyn Provider>,
    options: ModelOptions,
    memory: MemoryClient,
    events: Arc<EventBus>,
    instructions: String,
}

impl DirectResponder {
    pub fn new(
        provider: Arc<dyn Provider>,
        options: ModelOptions,
        memory: MemoryClient,
        events: Arc<EventBus>,
    ) -> Self {
        Self {
            provider,
            options,
            memory,
            events,
            instructions: conversational_instructions("Samantha"),
        }
    }

    pub fn with_persona(mut self, persona: &str) -> Self {
        self.instructions = conversational_instructions(persona);
        self
    }
}

#[async_trait]
impl Responder for DirectResponder {
    fn name(&self) -> &str {
        "respond"
    }

    async fn run(
        &self,
        thread_id: &ThreadId,
        state: &ConversationState,
    ) -> Result<ResponderOutput, concierge_core::Error> {
        let query = state.latest_user_text();
        let memories = self.memory.retrieve(query, &state.user_id).await;

        let mut messages = vec![Message::system(&self.instructions)];
        messages.extend(MemoryClient::context_turn(&memories));
        messages.extend(state.turns.iter().cloned());

        let response = self.provider.complete(self.options.request(messages, vec![])).await?;
        let reply = response.message.content;

        self.memory.persist(&state.user_id, query, &reply).await;

        info!(thread_id = %thread_id, memories = memories.len(), "Direct response generated");
        self.events.publish(DomainEvent::ResponseGenerated {
            thread_id: thread_id.to_string(),
            responder: self.name().into(),
            tokens_used: response.usage.map(|u| u.total_tokens).unwrap_or(0),
            timestamp: Utc::now(),
        });

        Ok(ResponderOutput::finish(reply))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::Next;
    use crate::test_helpers::*;
    use concierge_core::message::Role;

    fn responder(provider: Arc<ScriptedProvider>, memory: Arc<FakeMemory>) -> DirectResponder {
        DirectResponder::new(
            provider,
            ModelOptions::new("mock-model", 0.3, Some(512)),
            MemoryClient::new(memory),
            Arc::new(EventBus::default()),
        )
    }

    fn greeting() -> ConversationState {
        let mut state = ConversationState::new("samantha");
        state.append(Message::user("hello"));
        state
    }

    #[tokio::test]
    async fn greets_and_persists_once() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("Hi! How can I help you today?")]));
        let memory = Arc::new(FakeMemory::default());

        let output = responder(provider.clone(), memory.clone())
            .run(&"samantha".into(), &greeting())
            .await
            .unwrap();

        assert_eq!(output.next, Next::Finish);
        assert_eq!(output.turns.len(), 1);
        assert_eq!(output.turns[0].content, "Hi! How can I help you today?");

        assert_eq!(memory.write_count(), 1);
        let writes = memory.writes.lock().unwrap();
        let (user, interaction) = &writes[0];
        assert_eq!(user, "samantha");
        assert_eq!(interaction[0].role, Role::User);
        assert_eq!(interaction[0].content, "hello");
        assert_eq!(interaction[1].content, "Hi! How can I help you today?");

        assert!(provider.requests()[0].tools.is_empty());
    }

    #[tokio::test]
    async fn memories_personalize_the_prompt() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("Hey Maya!")]));
        let memory = Arc::new(FakeMemory::with_memories(&["Name is Maya.", "Lives in Pune."]));

        responder(provider.clone(), memory)
            .with_persona("Ava")
            .run(&"t".into(), &greeting())
            .await
            .unwrap();

        let messages = &provider.requests()[0].messages;
        assert!(messages[0].content.starts_with("You are Ava,"));
        assert_eq!(
            messages[1].content,
            "Relevant information from past conversations: Name is Maya. Lives in Pune."
        );
        assert_eq!(messages[2].content, "hello");
    }

    #[tokio::test]
    async fn memory_outage_still_replies() {
        let provider = Arc::new(ScriptedProvider::new(vec![text("Hello there!")]));
        let output = responder(provider.clone(), Arc::new(FakeMemory::down()))
            .run(&"t".into(), &greeting())
            .await
            .unwrap();

        assert_eq!(output.turns[0].content, "Hello there!");
        assert_eq!(provider.requests()[0].messages.len(), 2);
    }

    #[tokio::test]
    async fn model_failure_skips_persist() {
        let memory = Arc::new(FakeMemory::default());
        let result = responder(Arc::new(ScriptedProvider::new(vec![])), memory.clone())
            .run(&"t".into(), &greeting())
            .await;

        assert!(result.is_err());
        assert_eq!(memory.write_count(), 0);
    }
}
