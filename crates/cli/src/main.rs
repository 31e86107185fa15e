//! Concierge CLI — the main entry point.
//!
//! Commands:
//! - `chat`    — Interactive conversation on one thread
//! - `ask`     — Send a single message
//! - `memory`  — Search, list or seed the user's long-term memory
//! - `config`  — Show or initialize configuration

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "concierge",
    about = "Concierge — a routing assistant with domain specialists",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging and trace routing and tool activity
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Conversation thread (defaults to routing.default_thread_id)
    #[arg(short, long, global = true, env = "CONCIERGE_THREAD")]
    thread: Option<String>,

    /// User the conversation and memories belong to (defaults to routing.default_user_id)
    #[arg(short, long, global = true, env = "CONCIERGE_USER")]
    user: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat interactively; type /reset to start the thread over
    Chat,

    /// Send a single message and print the reply
    Ask {
        /// The message to send
        #[arg(short, long)]
        message: String,
    },

    /// Inspect or seed long-term memory
    Memory {
        #[command(subcommand)]
        action: MemoryAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum MemoryAction {
    /// Search memories relevant to a query
    Search {
        query: String,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// List everything remembered about the user
    List,

    /// Store one user/assistant exchange
    Add {
        /// What the user said
        #[arg(long)]
        message: String,

        /// What the assistant replied
        #[arg(long)]
        reply: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration with secrets redacted
    Show,

    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let who = commands::Who {
        thread: cli.thread,
        user: cli.user,
    };

    match cli.command {
        Commands::Chat => commands::chat::interactive(who, cli.verbose).await?,
        Commands::Ask { message } => commands::chat::ask(who, &message, cli.verbose).await?,
        Commands::Memory { action } => match action {
            MemoryAction::Search { query, limit } => {
                commands::memory::search(who, &query, limit).await?
            }
            MemoryAction::List => commands::memory::list(who).await?,
            MemoryAction::Add { message, reply } => {
                commands::memory::add(who, &message, &reply).await?
            }
        },
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config_cmd::show()?,
            ConfigAction::Init { force } => commands::config_cmd::init(force)?,
        },
    }

    Ok(())
}
