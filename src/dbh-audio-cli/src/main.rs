mod cli;
mod commands;
mod config;
mod file_utils;

use anyhow::{Context, Result};
use clap::Parser;
use dbh_audio::CancelToken;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::*;

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "dbh_audio=debug,dbh_audio_cli=debug"
    } else {
        "dbh_audio=info,dbh_audio_cli=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Extract(args) => {
            let cancel = CancelToken::new();
            let cancel_ctrlc = cancel.clone();
            ctrlc::set_handler(move || {
                warn!("Received interrupt, stopping after the current occurrence...");
                cancel_ctrlc.cancel();
            })
            .context("Failed to install Ctrl+C handler")?;

            commands::extract::handle(args, cancel)?;
        }

        Commands::Unpack(args) => {
            commands::unpack::handle(args)?;
        }

        Commands::Languages => {
            commands::languages::handle();
        }

        Commands::Configure(args) => {
            commands::configure::handle(args)?;
        }
    }

    Ok(())
}
