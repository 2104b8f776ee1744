//! CLI entry and dispatch.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use crate::app::{plain, tui, PlainTask};
use crate::client::StoryClient;
use crate::config::{paths, Config};
use crate::identity::ClientSessionId;
use crate::logging;

#[derive(Parser, Debug)]
#[command(name = "storyteller")]
#[command(version)]
#[command(about = "Terminal client for an interactive story server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Story server base URL
    #[arg(long, global = true, env = "STORYTELLER_SERVER", value_name = "URL")]
    server: Option<String>,

    /// Typewriter tick period in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    tick_ms: Option<u64>,

    /// Use this session id instead of the stored one
    #[arg(long, global = true, value_name = "ID", value_parser = parse_session_id)]
    session: Option<ClientSessionId>,

    /// Config file (default: <home>/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Use the non-streaming endpoints
    #[arg(long = "no-stream", global = true)]
    no_stream: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Full-screen story client (default)
    Play,

    /// Print the current story and its choices
    Show,

    /// Start a new story
    New {
        /// Print to stdout instead of opening the full-screen client
        #[arg(long)]
        plain: bool,
    },

    /// Take one turn and print the result
    Turn {
        /// What your character does
        #[arg(value_name = "ACTION", required = true, num_args = 1..)]
        action: Vec<String>,
    },

    /// Check that the server is up
    Health,

    /// Show or reset the stored session id
    Session {
        /// Generate a new session id (starts a fresh story)
        #[arg(long)]
        reset: bool,
    },
}

/// Parse arguments and run the chosen command.
///
/// Returns `Ok(false)` when the command ran but the server reported a
/// failure (already printed).
///
/// # Errors
///
/// Returns an error for invalid configuration, unusable paths, or a
/// terminal that cannot be set up.
pub fn run() -> Result<bool> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("load config")?;
    if let Some(server) = &cli.server {
        config.server_url.clone_from(server);
    }
    if let Some(tick_ms) = cli.tick_ms {
        config.reveal.tick_ms = tick_ms;
    }

    if let Err(err) = logging::init_global(&config.log_path()) {
        // Keep going without a log file.
        eprintln!("warning: logging disabled: {err:#}");
    }
    tracing::info!(server = %config.server_url, "storyteller starting");

    let reveal = config.reveal.to_reveal_config();
    let streaming = !cli.no_stream;

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Session { reset } => {
            let path = paths::session_id_path();
            let id = if reset {
                ClientSessionId::reset(&path)?
            } else {
                ClientSessionId::load_or_create(&path)?
            };
            println!("{id}");
            Ok(true)
        }
        Commands::Health => Ok(health(&story_client(&config, cli.session.as_ref())?)),
        Commands::Play | Commands::New { plain: false } => {
            tui::run(story_client(&config, cli.session.as_ref())?, reveal, streaming)?;
            Ok(true)
        }
        Commands::Show => {
            let client = story_client(&config, cli.session.as_ref())?;
            Ok(plain::run(client, reveal, streaming, &PlainTask::Show))
        }
        Commands::New { plain: true } => {
            let client = story_client(&config, cli.session.as_ref())?;
            Ok(plain::run(client, reveal, streaming, &PlainTask::NewStory))
        }
        Commands::Turn { action } => {
            let client = story_client(&config, cli.session.as_ref())?;
            let task = PlainTask::Turn(action.join(" "));
            Ok(plain::run(client, reveal, streaming, &task))
        }
    }
}

fn parse_session_id(raw: &str) -> std::result::Result<ClientSessionId, String> {
    ClientSessionId::parse(raw).ok_or_else(|| "session id must not be blank".to_string())
}

/// Client for the configured server, using `--session` or the stored id.
fn story_client(config: &Config, session: Option<&ClientSessionId>) -> Result<StoryClient> {
    let session_id = match session {
        Some(id) => id.clone(),
        None => ClientSessionId::load_or_create(&paths::session_id_path())?,
    };
    StoryClient::new(&config.server_url, session_id, &config.http).context("build HTTP client")
}

fn health(client: &StoryClient) -> bool {
    match client.health() {
        Ok(true) => {
            println!("ok: {}", client.base_url());
            true
        }
        Ok(false) => {
            println!("unhealthy: {}", client.base_url());
            false
        }
        Err(err) => {
            println!("unreachable: {}: {}", client.base_url(), err.user_message());
            false
        }
    }
}
