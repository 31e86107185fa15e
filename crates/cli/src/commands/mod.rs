//! Subcommand implementations and the shared runtime wiring.

pub mod chat;
pub mod config_cmd;
pub mod memory;

use concierge_agent::{Components, Concierge};
use concierge_config::AppConfig;
use concierge_core::event::{DomainEvent, EventBus};
use concierge_core::memory::MemoryService;
use concierge_core::message::ThreadId;
use concierge_memory::InMemoryCheckpointStore;
use concierge_tools::ToolKit;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

/// Providers that run locally and need no API key.
const KEYLESS_PROVIDERS: [&str; 2] = ["ollama", "vllm"];

/// Thread and user overrides from the command line.
pub struct Who {
    pub thread: Option<String>,
    pub user: Option<String>,
}

impl Who {
    pub fn thread(&self, config: &AppConfig) -> ThreadId {
        ThreadId::from(
            self.thread
                .clone()
                .unwrap_or_else(|| config.routing.default_thread_id.clone()),
        )
    }

    pub fn user(&self, config: &AppConfig) -> String {
        self.user
            .clone()
            .unwrap_or_else(|| config.routing.default_user_id.clone())
    }
}

pub fn load_config() -> Result<AppConfig, Box<dyn std::error::Error>> {
    Ok(AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?)
}

/// Build the full engine from configuration.
pub fn build_concierge(config: &AppConfig) -> Result<Concierge, Box<dyn std::error::Error>> {
    if !config.has_api_key() && !KEYLESS_PROVIDERS.contains(&config.default_provider.as_str()) {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    CEREBRAS_API_KEY=csk-...     (default provider)");
        eprintln!("    OPENAI_API_KEY=sk-...        (with CONCIERGE_PROVIDER=openai)");
        eprintln!("    CONCIERGE_API_KEY=...        (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let router = concierge_providers::build_from_config(config);
    let provider = router.default().ok_or("No default provider configured")?;
    let memory = memory_service(config);
    let kit = ToolKit::from_config(&config.tools, Arc::clone(&memory), config.memory.list_limit);

    let components = Components {
        provider,
        memory,
        checkpoints: Arc::new(InMemoryCheckpointStore::new()),
        events: Arc::new(EventBus::default()),
    };
    Ok(Concierge::assemble(config, components, |specialist| kit.roster(specialist)))
}

/// Log engine activity as it happens. Routing, tool and error events go
/// out at info, the rest at debug.
pub fn watch_events(events: Arc<EventBus>) {
    let mut rx = events.subscribe();
    tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => match event.as_ref() {
                    DomainEvent::RouteDecided { .. }
                    | DomainEvent::ToolExecuted { .. }
                    | DomainEvent::ErrorOccurred { .. } => info!(event = event.kind(), "{event}"),
                    _ => debug!(event = event.kind(), "{event}"),
                },
                Err(RecvError::Lagged(skipped)) => warn!(skipped, "Event watcher fell behind"),
                Err(RecvError::Closed) => break,
            }
        }
    });
}

pub fn memory_service(config: &AppConfig) -> Arc<dyn MemoryService> {
    concierge_memory::build_from_config(&config.memory)
}
