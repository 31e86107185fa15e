//! `concierge memory` — Inspect and seed long-term memory.
//!
//! `search` and `add` talk to the memory service directly so failures
//! surface. `list` reads through the same `MemoryClient` the engine uses,
//! so it honors `memory.list_limit` and an outage shows up as a warning.

use super::{Who, load_config, memory_service};
use concierge_core::memory::{MemoryRecord, MemorySearch};
use concierge_core::message::Message;
use concierge_memory::MemoryClient;

pub async fn search(who: Who, query: &str, limit: usize) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let service = memory_service(&config);
    let user = who.user(&config);

    println!("🔍 Searching memories of {user} for: \"{query}\"");
    println!();

    let records = service
        .search(MemorySearch::new(query, &user).with_limit(limit))
        .await?;
    print_records(&records, service.name());
    Ok(())
}

pub async fn list(who: Who) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let service = memory_service(&config);
    let user = who.user(&config);

    let backend = service.name().to_string();
    let records = MemoryClient::new(service)
        .with_list_limit(config.memory.list_limit)
        .retrieve_all(&user)
        .await;
    println!("🧠 Memories of {user} ({backend} backend)");
    println!();
    print_records(&records, &backend);
    Ok(())
}

pub async fn add(who: Who, message: &str, reply: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let service = memory_service(&config);
    let user = who.user(&config);

    let interaction = [Message::user(message), Message::assistant(reply)];
    let added = service.add(&user, &interaction).await?;
    println!("✅ Stored interaction for {user} ({added} memories derived)");
    Ok(())
}

fn print_records(records: &[MemoryRecord], backend: &str) {
    if records.is_empty() {
        println!("   No memories found. (backend: {backend})");
        return;
    }
    for (i, record) in records.iter().enumerate() {
        let when = record
            .created_at
            .map(|t| t.format(" (%Y-%m-%d)").to_string())
            .unwrap_or_default();
        if record.score > 0.0 {
            println!("  {:>2}. [score: {:.2}] {}{when}", i + 1, record.score, record.memory);
        } else {
            println!("  {:>2}. {}{when}", i + 1, record.memory);
        }
    }
}
