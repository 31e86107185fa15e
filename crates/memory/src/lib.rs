//! Memory system implementations for Concierge.
//!
//! Two kinds of persistence live here: the long-term, user-scoped memory
//! service (Mem0 or a local stand-in) and the per-thread checkpoint store.

pub mod checkpoint;
pub mod client;
pub mod in_memory;
pub mod mem0;
pub mod noop;

pub use checkpoint::InMemoryCheckpointStore;
pub use client::MemoryClient;
pub use in_memory::InMemoryMemory;
pub use mem0::Mem0Client;
pub use noop::NoopMemory;

use concierge_config::MemoryConfig;
use concierge_core::memory::MemoryService;
use std::sync::Arc;
use tracing::warn;

/// Build the configured memory service.
///
/// A `mem0` backend without an API key degrades to [`NoopMemory`].
pub fn build_from_config(config: &MemoryConfig) -> Arc<dyn MemoryService> {
    match config.backend.as_str() {
        "mem0" => match &config.api_key {
            Some(key) if !key.is_empty() => Arc::new(Mem0Client::new(
                &config.api_url,
                key,
                &config.search_version,
            )),
            _ => {
                warn!("Memory backend is mem0 but no API key is set (MEM0_API_KEY); memory disabled");
                Arc::new(NoopMemory)
            }
        },
        "in_memory" => Arc::new(InMemoryMemory::new()),
        _ => Arc::new(NoopMemory),
    }
}
