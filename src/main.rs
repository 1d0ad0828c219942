//! slashgate - slash-command webhook gateway.
//!
//! - `slashgate run` -- Load config, bind triggers, serve the webhook.
//! - `slashgate check` -- Validate a config file and bind it without serving.
//! - `slashgate drivers` -- List registered trigger drivers.

use clap::{Parser, Subcommand};
use slashgate::config::{self, Config};
use slashgate::{Dispatcher, http, metrics, registry};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// Slash-command webhook gateway.
#[derive(Parser)]
#[command(name = "slashgate", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the outgoing webhook endpoint.
    Run {
        /// Config file path.
        #[arg(short, long, default_value = "slashgate.toml")]
        config: PathBuf,

        /// Emit logs as JSON lines.
        #[arg(long)]
        log_json: bool,
    },

    /// Validate and bind a config file, then exit.
    Check {
        /// Config file path.
        #[arg(short, long, default_value = "slashgate.toml")]
        config: PathBuf,
    },

    /// List registered trigger drivers.
    Drivers,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load, validate and bind `path`.
fn prepare(path: &Path) -> anyhow::Result<(Config, Dispatcher)> {
    let config = Config::load(path).map_err(|e| {
        error!(path = %path.display(), error = %e, "Failed to load config");
        e
    })?;

    if let Err(errors) = config::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("{} configuration error(s) in {}", errors.len(), path.display());
    }

    let dispatcher = Dispatcher::from_bindings(config.dispatcher.clone(), config.triggers.values())?;
    Ok((config, dispatcher))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { config, log_json } => {
            init_tracing(log_json);
            let (config, dispatcher) = prepare(&config)?;

            info!(
                address = %config.http.address,
                path = %config.http.path,
                words = ?dispatcher.words(),
                "Starting slashgate"
            );

            if config.metrics.enabled {
                metrics::init();
                info!(path = %config.metrics.path, "Metrics initialized");
            } else {
                info!("Metrics disabled");
            }

            let listener = tokio::net::TcpListener::bind(config.http.address).await?;
            let app = http::router(Arc::new(dispatcher), &config);
            http::serve(listener, app).await?;
        }
        Commands::Check { config } => {
            init_tracing(false);
            let (_, dispatcher) = prepare(&config)?;
            println!(
                "{}: ok ({} trigger word(s): {})",
                config.display(),
                dispatcher.words().len(),
                dispatcher.words().join(", ")
            );
        }
        Commands::Drivers => {
            for name in registry::driver_names()? {
                println!("{name}");
            }
        }
    }

    Ok(())
}
