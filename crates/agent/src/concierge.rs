//! The entry point: one user message in, one assistant reply out.

use crate::direct::DirectResponder;
use crate::graph::Graph;
use crate::reasoning::ReasoningLoop;
use crate::session::SessionStore;
use crate::specialist::SpecialistResponder;
use crate::supervisor::Supervisor;
use chrono::Utc;
use concierge_config::AppConfig;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::memory::MemoryService;
use concierge_core::message::{Message, ThreadId};
use concierge_core::provider::{ModelOptions, Provider};
use concierge_core::route::Specialist;
use concierge_core::state::CheckpointStore;
use concierge_core::tool::ToolRegistry;
use concierge_memory::MemoryClient;
use std::sync::Arc;
use tracing::{error, info};

const PREVIEW_CHARS: usize = 80;

/// Prefix of the assistant turn recorded when a message fails.
pub const ERROR_MARKER: &str = "❌ Error: ";

/// Shared service handles, constructed once by the caller.
pub struct Components {
    pub provider: Arc<dyn Provider>,
    pub memory: Arc<dyn MemoryService>,
    pub checkpoints: Arc<dyn CheckpointStore>,
    pub events: Arc<EventBus>,
}

pub struct Concierge {
    graph: Graph,
    sessions: SessionStore,
    events: Arc<EventBus>,
}

impl Concierge {
    pub fn new(graph: Graph, events: Arc<EventBus>) -> Self {
        Self {
            graph,
            sessions: SessionStore::new(),
            events,
        }
    }

    /// Wire the full graph from configuration. `roster` supplies each
    /// specialist's tools.
    pub fn assemble(
        config: &AppConfig,
        components: Components,
        roster: impl Fn(Specialist) -> ToolRegistry,
    ) -> Self {
        let Components {
            provider,
            memory,
            checkpoints,
            events,
        } = components;
        let routing = &config.routing;

        let options = ModelOptions::new(
            &config.default_model,
            config.default_temperature,
            Some(config.default_max_tokens),
        );
        let memory = MemoryClient::new(memory)
            .with_events(Arc::clone(&events))
            .with_list_limit(config.memory.list_limit);

        let supervisor = Supervisor::new(
            Arc::clone(&provider),
            options.clone(),
            memory.clone(),
            Arc::clone(&events),
        )
        .with_persona(&routing.persona)
        .with_retry_invalid(routing.retry_invalid);

        let direct = DirectResponder::new(
            Arc::clone(&provider),
            options.clone(),
            memory,
            Arc::clone(&events),
        )
        .with_persona(&routing.persona);

        let reasoning = Arc::new(
            ReasoningLoop::new(provider, options, Arc::clone(&events))
                .with_max_iterations(routing.max_tool_iterations),
        );

        let mut graph = Graph::new(supervisor, Arc::new(direct), checkpoints)
            .with_max_hops(routing.max_hops);
        for specialist in Specialist::ALL {
            let responder = SpecialistResponder::new(
                specialist,
                roster(specialist),
                Arc::clone(&reasoning),
                Arc::clone(&events),
            );
            graph = graph.with_specialist(specialist, Arc::new(responder));
        }

        info!(
            model = %config.default_model,
            max_hops = routing.max_hops,
            retry_invalid = routing.retry_invalid,
            "Concierge assembled"
        );
        Self::new(graph, events)
    }

    pub fn events(&self) -> Arc<EventBus> {
        Arc::clone(&self.events)
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// The visible transcript of a thread.
    pub fn history(&self, thread_id: &ThreadId) -> Vec<Message> {
        self.sessions.turns(thread_id)
    }

    /// Process one user message on a thread.
    ///
    /// On failure the session still records the user turn plus one
    /// error-marker assistant turn, and the error is returned.
    pub async fn submit(
        &self,
        thread_id: &ThreadId,
        user_id: &str,
        text: &str,
    ) -> Result<String, concierge_core::Error> {
        self.sessions.create(thread_id, user_id);
        let _guard = self.sessions.begin(thread_id)?;
        self.sessions.append(thread_id, Message::user(text));

        self.events.publish(DomainEvent::MessageReceived {
            thread_id: thread_id.to_string(),
            user_id: user_id.to_string(),
            content_preview: text.chars().take(PREVIEW_CHARS).collect(),
            timestamp: Utc::now(),
        });

        match self.graph.run(thread_id, user_id, text).await {
            Ok(reply) => {
                if !reply.is_empty() {
                    self.sessions.append(thread_id, Message::assistant(&reply));
                }
                Ok(reply)
            }
            Err(e) => {
                error!(thread_id = %thread_id, error = %e, "Message processing failed");
                self.events.publish(DomainEvent::ErrorOccurred {
                    context: format!("thread {thread_id}"),
                    error_message: e.to_string(),
                    timestamp: Utc::now(),
                });
                self.sessions
                    .append(thread_id, Message::assistant(format!("{ERROR_MARKER}{e}")));
                Err(e)
            }
        }
    }

    /// Start the thread over: clear the transcript and forget the checkpoint.
    ///
    /// Holds the thread's processing guard throughout, so a message cannot
    /// start between the two.
    pub async fn reset(&self, thread_id: &ThreadId) -> Result<(), concierge_core::Error> {
        let guard = self.sessions.begin(thread_id)?;
        let existed = self.graph.checkpoints().delete(thread_id).await;
        self.sessions.clear(&guard);
        info!(thread_id = %thread_id, had_checkpoint = existed, "Thread reset");
        Ok(())
    }
}
