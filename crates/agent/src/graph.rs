//! The orchestration graph.
//!
//! ```text
//! START -> SUPERVISOR -> { specialist | RESPOND | FINISH }
//!          specialist | RESPOND -> FINISH   (or back to SUPERVISOR)
//! ```
//!
//! Every message is a fresh traversal over the thread's checkpointed state.
//! The state is checkpointed before each transition.

use crate::responder::{Next, Responder};
use crate::supervisor::Supervisor;
use concierge_core::error::SessionError;
use concierge_core::message::{Message, Role, ThreadId};
use concierge_core::route::{Route, Specialist};
use concierge_core::state::{CheckpointStore, ConversationState};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

pub const DEFAULT_MAX_HOPS: u32 = 4;

pub struct Graph {
    supervisor: Supervisor,
    direct: Arc<dyn Responder>,
    specialists: BTreeMap<Specialist, Arc<dyn Responder>>,
    checkpoints: Arc<dyn CheckpointStore>,
    max_hops: u32,
}

impl Graph {
    pub fn new(
        supervisor: Supervisor,
        direct: Arc<dyn Responder>,
        checkpoints: Arc<dyn CheckpointStore>,
    ) -> Self {
        Self {
            supervisor,
            direct,
            specialists: BTreeMap::new(),
            checkpoints,
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    pub fn with_specialist(mut self, specialist: Specialist, responder: Arc<dyn Responder>) -> Self {
        self.specialists.insert(specialist, responder);
        self
    }

    /// Maximum supervisor visits per message.
    pub fn with_max_hops(mut self, max_hops: u32) -> Self {
        self.max_hops = max_hops.max(1);
        self
    }

    pub fn checkpoints(&self) -> Arc<dyn CheckpointStore> {
        Arc::clone(&self.checkpoints)
    }

    /// Run one message through the graph and return the reply.
    ///
    /// The reply is the last assistant turn produced during this traversal,
    /// or an empty string when the Supervisor finished straight away.
    pub async fn run(
        &self,
        thread_id: &ThreadId,
        user_id: &str,
        text: &str,
    ) -> Result<String, concierge_core::Error> {
        let mut state = self
            .checkpoints
            .get(thread_id)
            .await
            .unwrap_or_else(|| ConversationState::new(user_id));
        state.user_id = user_id.to_string();
        state.append(Message::user(text));
        self.checkpoints.put(thread_id, state.clone()).await;

        let result = self.traverse(thread_id, &mut state).await;

        state.route = Route::Finish;
        self.checkpoints.put(thread_id, state).await;
        result
    }

    async fn traverse(
        &self,
        thread_id: &ThreadId,
        state: &mut ConversationState,
    ) -> Result<String, concierge_core::Error> {
        let mut reply = String::new();
        let mut hops = 0;

        loop {
            if hops == self.max_hops {
                return Err(SessionError::HopLimit {
                    thread_id: thread_id.to_string(),
                    max_hops: self.max_hops,
                }
                .into());
            }
            hops += 1;

            let route = self.supervisor.decide(thread_id, state).await?;
            state.route = route;
            self.checkpoints.put(thread_id, state.clone()).await;

            let responder = match route {
                Route::Finish => {
                    debug!(thread_id = %thread_id, hops, "Supervisor finished the traversal");
                    return Ok(reply);
                }
                Route::Respond => Arc::clone(&self.direct),
                Route::Specialist(specialist) => self.specialist(specialist)?,
            };

            let output = responder.run(thread_id, state).await?;
            if let Some(last) = output.turns.iter().rev().find(|m| m.role == Role::Assistant) {
                reply = last.content.clone();
            }
            state.extend(output.turns);

            match output.next {
                Next::Finish => {
                    info!(thread_id = %thread_id, responder = responder.name(), hops, "Traversal finished");
                    return Ok(reply);
                }
                Next::Supervisor => {
                    self.checkpoints.put(thread_id, state.clone()).await;
                }
            }
        }
    }

    fn specialist(&self, specialist: Specialist) -> Result<Arc<dyn Responder>, concierge_core::Error> {
        self.specialists
            .get(&specialist)
            .cloned()
            .ok_or_else(|| concierge_core::Error::Internal(format!("no responder for {specialist}")))
    }
}
