//! ga4-admin-mcp - GA4 Admin API operations as MCP tools over stdio.

mod mcp;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ga4_admin_client::{AdminClient, ClientConfig, Credentials, DEFAULT_BASE_URL};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_ENV_FILE: &str = ".env";

#[derive(Parser)]
#[command(name = "ga4-admin-mcp")]
#[command(author, version, about = "MCP server for the Google Analytics 4 Admin API")]
#[command(propagate_version = true)]
struct Cli {
    /// Dotenv file loaded before reading the other options
    #[arg(long, global = true, env = "ENV_FILE", default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// Service account or authorized user JSON file
    #[arg(long, global = true, env = "GOOGLE_APPLICATION_CREDENTIALS")]
    credentials: Option<PathBuf>,

    /// Static bearer token; skips OAuth entirely
    #[arg(long, global = true, env = "GA4_ACCESS_TOKEN", hide_env_values = true)]
    access_token: Option<String>,

    /// Admin API root URL
    #[arg(long, global = true, env = "GA4_ADMIN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    /// Per-request timeout in seconds
    #[arg(long, global = true, env = "GA4_ADMIN_TIMEOUT_SECS", default_value = "30")]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the MCP server on stdin/stdout (default)
    Serve,

    /// Print the tool catalog as JSON
    Tools,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load before parsing so clap's env fallbacks see the file's values.
    let env_file = env_file_location();
    let env_loaded = load_env_file(&env_file)?;

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(std::env::var_os("NO_COLOR").is_none()),
        )
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if env_loaded {
        debug!(path = %env_file.display(), "Loaded environment file");
    } else {
        debug!(path = %env_file.display(), "No environment file, using process environment");
    }

    let cli = Cli::parse();

    match cli.command.as_ref().unwrap_or(&Commands::Serve) {
        Commands::Serve => {
            let client = build_client(&cli)?;
            mcp::serve(&client).await
        }
        Commands::Tools => {
            let catalog = serde_json::to_string_pretty(&mcp::get_tool_definitions())?;
            println!("{catalog}");
            Ok(())
        }
    }
}

/// `--env-file` from argv, then `ENV_FILE`, then `.env`.
fn env_file_location() -> PathBuf {
    let mut args = std::env::args_os().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--env-file" {
            if let Some(path) = args.next() {
                return PathBuf::from(path);
            }
        } else if let Some(path) = arg.to_str().and_then(|a| a.strip_prefix("--env-file=")) {
            return PathBuf::from(path);
        }
    }

    std::env::var_os("ENV_FILE").map_or_else(|| PathBuf::from(DEFAULT_ENV_FILE), PathBuf::from)
}

/// Returns whether the file existed. Existing variables are not overridden.
fn load_env_file(path: &Path) -> Result<bool> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(true),
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to load {}", path.display())),
    }
}

fn build_client(cli: &Cli) -> Result<AdminClient> {
    let credentials = match &cli.access_token {
        Some(token) if !token.trim().is_empty() => {
            if cli.credentials.is_some() {
                warn!("Both an access token and a credentials file are set; using the access token");
            }
            Credentials::Static(token.trim().to_string())
        }
        _ => Credentials::discover(cli.credentials.as_deref())
            .context("Failed to load Google credentials")?,
    };
    info!(kind = credentials.kind(), "Using credentials");

    let config = ClientConfig::new(&cli.base_url)
        .with_context(|| format!("Invalid base URL: {}", cli.base_url))?
        .with_timeout(Duration::from_secs(cli.timeout_secs));

    AdminClient::new(config, credentials).context("Failed to create Admin API client")
}
