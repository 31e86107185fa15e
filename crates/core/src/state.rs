//! Conversation state and the checkpoint store that persists it per thread.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::message::{latest_user_text, Message, ThreadId};
use crate::route::Route;

/// The unit the orchestration graph operates on.
///
/// Turns are append-only. `route` holds the last decision taken; a state at
/// rest (between messages) always carries [`Route::Finish`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub turns: Vec<Message>,
    pub route: Route,
    pub user_id: String,
}

impl ConversationState {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            turns: Vec::new(),
            route: Route::Finish,
            user_id: user_id.into(),
        }
    }

    pub fn append(&mut self, turn: Message) {
        self.turns.push(turn);
    }

    pub fn extend(&mut self, turns: impl IntoIterator<Item = Message>) {
        self.turns.extend(turns);
    }

    /// Text of the latest user turn, `""` if there is none.
    pub fn latest_user_text(&self) -> &str {
        latest_user_text(&self.turns)
    }
}

/// Durable snapshots of [`ConversationState`] keyed by thread.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn get(&self, thread_id: &ThreadId) -> Option<ConversationState>;

    async fn put(&self, thread_id: &ThreadId, state: ConversationState);

    /// Forget a thread. Returns whether a checkpoint existed.
    async fn delete(&self, thread_id: &ThreadId) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_state_is_at_rest() {
        let state = ConversationState::new("samantha");
        assert!(state.turns.is_empty());
        assert_eq!(state.route, Route::Finish);
        assert_eq!(state.latest_user_text(), "");
    }

    #[test]
    fn append_preserves_order() {
        let mut state = ConversationState::new("u1");
        state.append(Message::user("hello"));
        state.extend([Message::assistant("hi there")]);
        assert_eq!(state.turns.len(), 2);
        assert_eq!(state.latest_user_text(), "hello");
        assert_eq!(state.turns[1].content, "hi there");
    }

    #[test]
    fn state_serializes_route_identifier() {
        let state = ConversationState::new("u1");
        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains(r#""route":"FINISH""#));
    }
}
