//! In-memory service — useful for testing and offline sessions.

use async_trait::async_trait;
use chrono::Utc;
use concierge_core::error::MemoryError;
use concierge_core::memory::{MemoryRecord, MemorySearch, MemoryService};
use concierge_core::message::{Message, Role};
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Stores each user turn of a persisted interaction as one memory.
/// Search is keyword overlap, scoped to the user; an empty query lists everything.
pub struct InMemoryMemory {
    records: Arc<RwLock<Vec<MemoryRecord>>>,
}

impl InMemoryMemory {
    pub fn new() -> Self {
        Self {
            records: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Seed a memory directly.
    pub async fn remember(&self, user_id: &str, memory: impl Into<String>) {
        let mut record = MemoryRecord::new(user_id, memory);
        record.id = Uuid::new_v4().to_string();
        record.created_at = Some(Utc::now());
        self.records.write().await.push(record);
    }

    pub async fn count(&self) -> usize {
        self.records.read().await.len()
    }
}

impl Default for InMemoryMemory {
    fn default() -> Self {
        Self::new()
    }
}

fn keywords(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() > 2)
        .map(|w| w.to_lowercase())
        .collect()
}

#[async_trait]
impl MemoryService for InMemoryMemory {
    fn name(&self) -> &str { "in_memory" }

    async fn search(&self, search: MemorySearch) -> Result<Vec<MemoryRecord>, MemoryError> {
        let records = self.records.read().await;
        let terms = keywords(&search.query);

        let mut results: Vec<MemoryRecord> = records
            .iter()
            .filter(|r| r.user_id == search.user_id)
            .cloned()
            .filter_map(|mut r| {
                if terms.is_empty() {
                    r.score = 1.0;
                    return Some(r);
                }
                let content = r.memory.to_lowercase();
                let hits = terms.iter().filter(|t| content.contains(t.as_str())).count();
                if hits == 0 {
                    return None;
                }
                r.score = hits as f32 / terms.len() as f32;
                Some(r)
            })
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        if let Some(limit) = search.limit {
            results.truncate(limit);
        }

        Ok(results)
    }

    async fn add(&self, user_id: &str, interaction: &[Message]) -> Result<usize, MemoryError> {
        let mut added = 0;
        for turn in interaction.iter().filter(|m| m.role == Role::User) {
            if turn.content.trim().is_empty() {
                continue;
            }
            self.remember(user_id, turn.content.trim()).await;
            added += 1;
        }
        Ok(added)
    }
}
