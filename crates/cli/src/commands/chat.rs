//! `concierge chat` and `concierge ask`.

use super::{Who, build_concierge, load_config, watch_events};
use concierge_agent::Concierge;
use concierge_core::message::ThreadId;
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};

const EXIT_COMMANDS: [&str; 5] = ["exit", "quit", "/exit", "/quit", ":q"];

pub async fn ask(who: Who, message: &str, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let concierge = build_concierge(&config)?;
    if verbose {
        watch_events(concierge.events());
    }
    let thread = who.thread(&config);
    let user = who.user(&config);

    eprint!("  Thinking...");
    let result = concierge.submit(&thread, &user, message).await;
    eprint!("\r              \r");
    println!("{}", result?);
    Ok(())
}

pub async fn interactive(who: Who, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let concierge = build_concierge(&config)?;
    if verbose {
        watch_events(concierge.events());
    }
    let thread = who.thread(&config);
    let user = who.user(&config);
    let persona = config.routing.persona.clone();

    println!();
    println!("  ╔══════════════════════════════════════════════╗");
    println!("  ║         Concierge — Interactive Mode         ║");
    println!("  ╚══════════════════════════════════════════════╝");
    println!();
    println!("  Provider:  {}", config.default_provider);
    println!("  Model:     {}", config.default_model);
    println!("  Memory:    {}", config.memory.backend);
    println!("  Thread:    {thread}");
    println!("  User:      {user}");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type /reset to start over, 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(io::stdin()).lines();
    prompt()?;

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            prompt()?;
            continue;
        }
        if EXIT_COMMANDS.contains(&line) {
            break;
        }

        if line == "/reset" {
            match concierge.reset(&thread).await {
                Ok(()) => println!("  Conversation reset.\n"),
                Err(e) => eprintln!("  [Error] {e}\n"),
            }
        } else {
            turn(&concierge, &thread, &user, &persona, line).await;
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye! 👋");
    println!();
    Ok(())
}

async fn turn(concierge: &Concierge, thread: &ThreadId, user: &str, persona: &str, text: &str) {
    eprint!("  ...");
    let result = concierge.submit(thread, user, text).await;
    eprint!("\r     \r");
    println!();
    match result {
        Ok(reply) if reply.is_empty() => println!("  {persona} > (no reply)"),
        Ok(reply) => {
            for line in reply.lines() {
                println!("  {persona} > {line}");
            }
        }
        Err(e) => eprintln!("  [Error] {e}"),
    }
    println!();
}

fn prompt() -> std::io::Result<()> {
    print!("  You > ");
    std::io::stdout().flush()
}
