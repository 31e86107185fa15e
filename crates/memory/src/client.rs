//! Memory client facade used by the routing engine.
//!
//! Memory is best-effort: every failure is logged and swallowed here, so a
//! memory outage never aborts a turn.

use chrono::Utc;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::memory::{MemoryRecord, MemorySearch, MemoryService};
use concierge_core::message::Message;
use std::sync::Arc;
use tracing::{info, warn};

const CONTEXT_PREFIX: &str = "Relevant information from past conversations: ";

#[derive(Clone)]
pub struct MemoryClient {
    service: Arc<dyn MemoryService>,
    events: Option<Arc<EventBus>>,
    list_limit: usize,
}

impl MemoryClient {
    pub fn new(service: Arc<dyn MemoryService>) -> Self {
        Self {
            service,
            events: None,
            list_limit: 50,
        }
    }

    pub fn with_events(mut self, events: Arc<EventBus>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn with_list_limit(mut self, limit: usize) -> Self {
        self.list_limit = limit;
        self
    }

    /// Memories relevant to `query`. Empty on failure.
    pub async fn retrieve(&self, query: &str, user_id: &str) -> Vec<MemoryRecord> {
        let result = self.service.search(MemorySearch::new(query, user_id)).await;
        self.settle_search("retrieve", user_id, result)
    }

    /// Up to the list limit of everything stored for `user_id`. Empty on failure.
    pub async fn retrieve_all(&self, user_id: &str) -> Vec<MemoryRecord> {
        let search = MemorySearch::new("", user_id).with_limit(self.list_limit);
        let result = self.service.search(search).await;
        self.settle_search("retrieve_all", user_id, result)
    }

    /// Store one user/assistant exchange. Returns whether the service accepted it.
    pub async fn persist(&self, user_id: &str, user_text: &str, assistant_text: &str) -> bool {
        let interaction = [Message::user(user_text), Message::assistant(assistant_text)];
        match self.service.add(user_id, &interaction).await {
            Ok(count) => {
                info!(user_id, added = count, "Interaction saved to memory");
                self.publish("persist", user_id, count, true);
                true
            }
            Err(e) => {
                warn!(user_id, error = %e, "Failed to save interaction to memory");
                self.publish("persist", user_id, 0, false);
                false
            }
        }
    }

    /// The context turn prepended to model input when memories were found.
    pub fn context_turn(records: &[MemoryRecord]) -> Option<Message> {
        if records.is_empty() {
            return None;
        }
        let joined = records
            .iter()
            .map(|r| r.memory.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        Some(Message::system(format!("{CONTEXT_PREFIX}{joined}")))
    }

    fn settle_search(
        &self,
        operation: &str,
        user_id: &str,
        result: Result<Vec<MemoryRecord>, concierge_core::error::MemoryError>,
    ) -> Vec<MemoryRecord> {
        match result {
            Ok(records) => {
                info!(user_id, count = records.len(), operation, "Retrieved memories");
                self.publish(operation, user_id, records.len(), true);
                records
            }
            Err(e) => {
                warn!(user_id, operation, error = %e, "Memory lookup failed");
                self.publish(operation, user_id, 0, false);
                Vec::new()
            }
        }
    }

    fn publish(&self, operation: &str, user_id: &str, count: usize, success: bool) {
        if let Some(events) = &self.events {
            events.publish(DomainEvent::MemoryAccessed {
                operation: operation.into(),
                user_id: user_id.into(),
                count,
                success,
                timestamp: Utc::now(),
            });
        }
    }
}
