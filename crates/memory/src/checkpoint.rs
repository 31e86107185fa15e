//! In-process checkpoint store, keyed by thread.

use async_trait::async_trait;
use concierge_core::message::ThreadId;
use concierge_core::state::{CheckpointStore, ConversationState};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Holds the latest [`ConversationState`] per thread for the life of the process.
#[derive(Default)]
pub struct InMemoryCheckpointStore {
    states: RwLock<HashMap<ThreadId, ConversationState>>,
}

impl InMemoryCheckpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.states.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.states.read().await.is_empty()
    }
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn get(&self, thread_id: &ThreadId) -> Option<ConversationState> {
        self.states.read().await.get(thread_id).cloned()
    }

    async fn put(&self, thread_id: &ThreadId, state: ConversationState) {
        self.states.write().await.insert(thread_id.clone(), state);
    }

    async fn delete(&self, thread_id: &ThreadId) -> bool {
        self.states.write().await.remove(thread_id).is_some()
    }
}
