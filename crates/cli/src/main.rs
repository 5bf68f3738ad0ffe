//! Bodega CLI - terminal storefront.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! bodega catalog --category granos
//!
//! # Fill the cart
//! bodega cart add 12
//! bodega cart inc 12
//!
//! # Log in and place the order
//! bodega login -e ana@bodega.test -p secreto1
//! bodega checkout
//!
//! # Interactive session
//! bodega shell
//! ```
//!
//! Every command starts the way a page load does: the persisted cart is
//! restored, the stored token is verified, and the catalog is fetched.

#![cfg_attr(not(test), forbid(unsafe_code))]

use bodega_storefront::api::{ApiError, BodegaClient};
use bodega_storefront::config::{ConfigError, StorefrontConfig};
use bodega_storefront::state::AppState;
use bodega_storefront::store::FileStore;
use clap::Parser;
use sentry::integrations::tracing as sentry_tracing;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod render;

use commands::Command;

#[derive(Parser)]
#[command(name = "bodega")]
#[command(author, version, about = "Bodega storefront in your terminal")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// Errors that stop the CLI before any command runs.
#[derive(Debug, Error)]
enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not create HTTP client: {0}")]
    Client(#[from] ApiError),

    #[error("Terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "bodega_storefront=info,bodega_cli=info".into());

    // Logs go to stderr so they never mix with rendered output
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            init_tracing();
            tracing::error!("{e}");
            std::process::exit(2);
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing();

    match run(cli, config).await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            tracing::error!("Command failed: {e}");
            std::process::exit(2);
        }
    }
}

/// Run one command. Returns whether it succeeded.
async fn run(cli: Cli, config: StorefrontConfig) -> Result<bool, CliError> {
    let client = BodegaClient::new(&config.api)?;
    let store = FileStore::new(&config.data_dir);
    tracing::debug!(api = %client.base_url(), data_dir = %store.dir().display(), "starting");

    let mut state = AppState::new(client, store, config.checkout);
    for notice in state.start().await {
        render::notice(&notice);
    }

    if matches!(cli.command, Command::Shell) {
        commands::shell::run(&mut state).await?;
        return Ok(true);
    }

    Ok(commands::execute(&mut state, cli.command).await)
}
