//! No-op memory service — disables long-term memory entirely.

use async_trait::async_trait;
use concierge_core::error::MemoryError;
use concierge_core::memory::{MemoryRecord, MemorySearch, MemoryService};
use concierge_core::message::Message;

/// A memory service that remembers nothing.
pub struct NoopMemory;

#[async_trait]
impl MemoryService for NoopMemory {
    fn name(&self) -> &str { "none" }

    async fn search(&self, _search: MemorySearch) -> Result<Vec<MemoryRecord>, MemoryError> {
        Ok(Vec::new())
    }

    async fn add(&self, _user_id: &str, _interaction: &[Message]) -> Result<usize, MemoryError> {
        Ok(0)
    }
}
