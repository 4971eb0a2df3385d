use std::{io, path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use client_core::Catalog;
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod render;
mod shell;
#[cfg(test)]
mod test_support;

use cli::{NamedAction, ProductAction};

#[derive(Parser, Debug)]
#[command(name = "catalog", version, about = "Sofa store catalog client")]
struct Args {
    /// Base URL of the catalog service, e.g. http://localhost:3000/api
    #[arg(long, global = true)]
    api_url: Option<String>,
    /// Settings file; defaults to ./catalog.toml when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// tracing filter, overridden by RUST_LOG
    #[arg(long, global = true)]
    log_level: Option<String>,
    /// Request timeout in seconds, 0 disables it
    #[arg(long, global = true)]
    timeout: Option<u64>,
    #[command(subcommand)]
    command: TopCommand,
}

#[derive(Subcommand, Debug)]
enum TopCommand {
    /// Load products, models and brands and print all three
    Overview,
    /// Interactive session
    Shell,
    Brands {
        #[command(subcommand)]
        action: NamedAction,
    },
    Models {
        #[command(subcommand)]
        action: NamedAction,
    },
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let mut settings = config::load_settings(args.config.as_deref())?;
    if let Some(url) = args.api_url {
        settings.api_base_url = url;
        settings.validate()?;
    }
    if let Some(level) = args.log_level {
        settings.log_level = level;
    }
    if let Some(secs) = args.timeout {
        settings.request_timeout_secs = secs;
    }

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.log_level))
        .context("invalid log level")?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    debug!(?settings, "settings loaded");

    let catalog = Catalog::connect(&settings.endpoints(), settings.timeout())
        .context("failed to set up catalog client")?;

    let (mut out, mut err_out) = (io::stdout(), io::stderr());
    let succeeded = match args.command {
        TopCommand::Overview => shell::overview(&catalog, &mut out, &mut err_out).await?,
        TopCommand::Shell => shell::run(&catalog).await?,
        TopCommand::Brands { action } => {
            let action = action.into_brand_action();
            cli::run_once(&catalog.brands, action, &mut out, &mut err_out).await?
        }
        TopCommand::Models { action } => {
            let action = action.into_model_action();
            cli::run_once(&catalog.models, action, &mut out, &mut err_out).await?
        }
        TopCommand::Products { action } => {
            let action = action.into_action();
            cli::run_once(&catalog.products, action, &mut out, &mut err_out).await?
        }
    };

    Ok(if succeeded {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
