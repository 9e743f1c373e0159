//! deskhub-server - aggregated status endpoint for an embedded desk display
//!
//! ```bash
//! # First run: authorize Google access in the browser
//! deskhub-server auth
//!
//! # Serve GET /status on 0.0.0.0:8000
//! deskhub-server
//! ```

mod routes;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use deskhub_core::config::DeskhubConfig;
use deskhub_provider_google::BrowserConsentFlow;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::state::AppState;

#[derive(Parser)]
#[command(name = "deskhub-server")]
#[command(about = "Serve mail, calendar, weather and todos as one JSON snapshot")]
#[command(version)]
struct Cli {
    /// Config file (default: ~/.config/deskhub/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve GET /status (default)
    Serve {
        /// Address to listen on, overrides `server.bind`
        #[arg(long)]
        bind: Option<SocketAddr>,
    },
    /// Authorize Google access and store the token, then exit
    Auth,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = DeskhubConfig::load(cli.config.as_deref()).context("Failed to load configuration")?;

    let http = reqwest::Client::builder()
        .timeout(config.sources.timeout())
        .user_agent(concat!("deskhub/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")?;

    match cli.command.unwrap_or(Command::Serve { bind: None }) {
        Command::Auth => {
            authorize(&config, &http).await?;
            eprintln!(
                "Google access authorized, token stored at {}",
                config.google.token_path().display()
            );
        }
        Command::Serve { bind } => serve(config, http, bind).await?,
    }

    Ok(())
}

/// Obtain a credential, falling back to browser consent.
async fn authorize(config: &DeskhubConfig, http: &reqwest::Client) -> Result<()> {
    let flow = Arc::new(BrowserConsentFlow::new(http.clone()));
    let provider = state::credential_provider(config, http.clone(), flow)?;

    provider
        .obtain()
        .await
        .context("Google authorization failed")?;

    Ok(())
}

async fn serve(config: DeskhubConfig, http: reqwest::Client, bind: Option<SocketAddr>) -> Result<()> {
    let consent = Arc::new(BrowserConsentFlow::new(http.clone()));
    let credentials = state::serving_credentials(&config, http.clone(), consent).await?;

    let state = AppState::from_config(&config, http, credentials);
    let app = routes::app(state);

    let addr = bind.unwrap_or(config.server.bind);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(%addr, "deskhub-server listening");

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("deskhub_server=debug,deskhub_core=debug,deskhub_provider_google=debug,deskhub_provider_openmeteo=debug,tower_http=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("deskhub_server=info,deskhub_core=info,deskhub_provider_google=info,deskhub_provider_openmeteo=info,tower_http=warn,warn")
        })
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
