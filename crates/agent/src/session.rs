//! Per-thread UI sessions: the visible transcript and the processing flag.
//!
//! This is separate from the checkpoint: the session is what the user sees
//! (including error turns), the checkpoint is what the graph resumes from.

use concierge_core::error::SessionError;
use concierge_core::message::{Message, ThreadId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, Default)]
pub struct Session {
    pub user_id: String,
    pub turns: Vec<Message>,
    pub processing: bool,
}

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<Mutex<HashMap<ThreadId, Session>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ThreadId, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Create the session if it does not exist yet.
    pub fn create(&self, thread_id: &ThreadId, user_id: &str) {
        let mut sessions = self.lock();
        let session = sessions.entry(thread_id.clone()).or_default();
        if session.user_id.is_empty() {
            session.user_id = user_id.to_string();
        }
    }

    pub fn append(&self, thread_id: &ThreadId, turn: Message) {
        self.lock().entry(thread_id.clone()).or_default().turns.push(turn);
    }

    pub fn turns(&self, thread_id: &ThreadId) -> Vec<Message> {
        self.lock()
            .get(thread_id)
            .map(|s| s.turns.clone())
            .unwrap_or_default()
    }

    pub fn get(&self, thread_id: &ThreadId) -> Option<Session> {
        self.lock().get(thread_id).cloned()
    }

    pub fn is_processing(&self, thread_id: &ThreadId) -> bool {
        self.lock().get(thread_id).is_some_and(|s| s.processing)
    }

    /// Clear the transcript of the thread `guard` holds.
    pub fn clear(&self, guard: &ProcessingGuard) {
        if let Some(session) = self.lock().get_mut(&guard.thread_id) {
            session.turns.clear();
        }
    }

    /// Mark the thread as processing until the returned guard is dropped.
    pub fn begin(&self, thread_id: &ThreadId) -> Result<ProcessingGuard, SessionError> {
        let mut sessions = self.lock();
        let session = sessions.entry(thread_id.clone()).or_default();
        if session.processing {
            return Err(SessionError::Busy(thread_id.to_string()));
        }
        session.processing = true;
        Ok(ProcessingGuard {
            sessions: Arc::clone(&self.sessions),
            thread_id: thread_id.clone(),
        })
    }
}

/// Clears the processing flag on drop, including on early return or panic.
#[derive(Debug)]
pub struct ProcessingGuard {
    sessions: Arc<Mutex<HashMap<ThreadId, Session>>>,
    thread_id: ThreadId,
}

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        let mut sessions = self.sessions.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(session) = sessions.get_mut(&self.thread_id) {
            session.processing = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_is_idempotent() {
        let store = SessionStore::new();
        let thread = ThreadId::from("samantha");
        store.create(&thread, "samantha");
        store.append(&thread, Message::user("hi"));
        store.create(&thread, "someone-else");

        let session = store.get(&thread).unwrap();
        assert_eq!(session.user_id, "samantha");
        assert_eq!(session.turns.len(), 1);
    }

    #[test]
    fn second_begin_is_busy_until_guard_drops() {
        let store = SessionStore::new();
        let thread = ThreadId::from("t");
        store.create(&thread, "u");

        let guard = store.begin(&thread).unwrap();
        assert!(store.is_processing(&thread));
        assert_eq!(store.begin(&thread).unwrap_err(), SessionError::Busy("t".into()));

        drop(guard);
        assert!(!store.is_processing(&thread));
        assert!(store.begin(&thread).is_ok());
    }

    #[test]
    fn clear_needs_the_thread_guard() {
        let store = SessionStore::new();
        let thread = ThreadId::from("t");
        store.create(&thread, "u");
        store.append(&thread, Message::user("hello"));

        let guard = store.begin(&thread).unwrap();
        store.clear(&guard);
        assert!(store.turns(&thread).is_empty());
        assert!(store.is_processing(&thread));

        drop(guard);
        assert!(!store.is_processing(&thread));
    }

    #[test]
    fn begin_before_create_keeps_the_user() {
        let store = SessionStore::new();
        let thread = ThreadId::from("t");
        drop(store.begin(&thread).unwrap());
        store.create(&thread, "samantha");
        assert_eq!(store.get(&thread).unwrap().user_id, "samantha");
    }

    #[test]
    fn unknown_thread_has_no_turns() {
        let store = SessionStore::new();
        assert!(store.turns(&"nope".into()).is_empty());
    }
}
