//! # Arkham Horror MCP CLI (`arkham`)
//!
//! Browse and search scenario and card data from the terminal, or start
//! the HTTP / stdio MCP servers.
//!
//! ## Usage
//!
//! ```bash
//! arkham [--config ./config/arkham.toml] <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `arkham scenarios` | List cached scenarios |
//! | `arkham scenario <id>` | Print a scenario page's main content |
//! | `arkham cards [--type <t>]` | List cards from the card database |
//! | `arkham search <kind> ...` | Search scenarios, cards, or investigators |
//! | `arkham serve http` | Start the REST + MCP HTTP server |
//! | `arkham serve stdio` | Serve MCP over stdin/stdout |
//! | `arkham tools` | List registered tools |
//!
//! ## Examples
//!
//! ```bash
//! arkham search scenario --min-players 2 --difficulty hard
//! arkham search card --name "Shrivelling" --fuzzy --min-similarity 0.7
//! arkham serve http --config ./config/arkham.toml
//! ```

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rmcp::ServiceExt;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use arkham_horror_mcp::catalog::{self, Catalog};
use arkham_horror_mcp::config;
use arkham_horror_mcp::mcp::McpBridge;
use arkham_horror_mcp::search::{self, SearchRequest};
use arkham_horror_mcp::server;
use arkham_horror_mcp::traits::{self, ToolRegistry};

/// Arkham Horror MCP: scenario and card data for Arkham Horror LCG.
///
/// All commands accept an optional `--config` flag pointing to a TOML
/// configuration file. Built-in defaults are used when it is omitted.
#[derive(Parser)]
#[command(
    name = "arkham",
    about = "Arkham Horror LCG scenario and card data over REST, MCP, and the CLI",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// List all cached scenarios.
    Scenarios,

    /// Print the main content of one scenario page.
    Scenario {
        /// Scenario id (the URL slug, e.g. `the-blob-that-ate-everything`).
        id: String,
    },

    /// List cards from the card database.
    Cards {
        /// Only cards of this type (matches the type code or type name).
        #[arg(long = "type")]
        card_type: Option<String>,
    },

    /// Search scenarios, cards, or investigators.
    ///
    /// Scenario searches use the cached list. Card and investigator
    /// searches query the card database live.
    Search {
        /// `scenario`, `card`, or `investigator`.
        kind: String,

        /// Name or title to match (substring unless --fuzzy).
        #[arg(long)]
        name: Option<String>,

        /// Scenarios supporting at least this many players.
        #[arg(long)]
        min_players: Option<u32>,

        /// Scenarios supporting at most this many players.
        #[arg(long)]
        max_players: Option<u32>,

        /// Scenario difficulty (easy, standard, hard, expert).
        #[arg(long)]
        difficulty: Option<String>,

        /// Rank by similarity instead of substring matching.
        #[arg(long)]
        fuzzy: bool,

        /// Similarity threshold for --fuzzy (0.0 to 1.0).
        #[arg(long)]
        min_similarity: Option<f64>,

        /// Card or investigator faction (e.g. guardian, mystic).
        #[arg(long)]
        faction: Option<String>,
    },

    /// Start a server.
    Serve {
        #[command(subcommand)]
        service: ServeService,
    },

    /// List registered tools.
    Tools,
}

/// Server subcommands.
#[derive(Subcommand)]
enum ServeService {
    /// REST API and MCP Streamable HTTP on `[server].bind`.
    Http,
    /// MCP over stdin/stdout.
    Stdio,
}

/// Logs go to stderr so stdout stays clean for CLI output and stdio MCP.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cfg = config::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Scenarios => {
            let catalog = Catalog::from_config(&cfg)?;
            catalog::run_list_scenarios(&catalog).await?;
        }
        Commands::Scenario { id } => {
            let catalog = Catalog::from_config(&cfg)?;
            catalog::run_get_scenario(&catalog, &id).await?;
        }
        Commands::Cards { card_type } => {
            let catalog = Catalog::from_config(&cfg)?;
            catalog::run_list_cards(&catalog, card_type.as_deref()).await?;
        }
        Commands::Search {
            kind,
            name,
            min_players,
            max_players,
            difficulty,
            fuzzy,
            min_similarity,
            faction,
        } => {
            let catalog = Catalog::from_config(&cfg)?;
            let request = SearchRequest {
                name,
                min_players,
                max_players,
                difficulty,
                fuzzy,
                min_similarity,
                faction,
                ..SearchRequest::new(kind)
            };
            search::run_search(&catalog, &request).await?;
        }
        Commands::Serve { service } => match service {
            ServeService::Http => {
                server::run_server(&cfg).await?;
            }
            ServeService::Stdio => {
                let catalog = Arc::new(Catalog::from_config(&cfg)?);
                let bridge = McpBridge::new(catalog, Arc::new(ToolRegistry::with_builtins()));
                info!("serving MCP over stdio");
                bridge.serve(rmcp::transport::stdio()).await?.waiting().await?;
            }
        },
        Commands::Tools => {
            traits::list_tools(&ToolRegistry::with_builtins());
        }
    }

    Ok(())
}
