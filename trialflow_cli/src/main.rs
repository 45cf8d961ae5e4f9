use clap::Parser;
use std::io::Write;
use tokio_util::sync::CancellationToken;
use trialflow_cli::cli::{Cli, Commands};
use trialflow_cli::commands;
use trialflow_core::{o11y, IngestConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = IngestConfig::from_env()?;
    o11y::init_tracing(&config.log)?;

    let mut out = std::io::stdout();

    match cli.command {
        Commands::Ingest(args) => {
            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    tracing::warn!("interrupt received, stopping after the current page");
                    on_interrupt.cancel();
                }
            });

            let result = commands::ingest(config, &args, &cancel).await?;
            commands::write_summary(&mut out, &result)?;
            out.flush()?;
            if !result.is_success() {
                std::process::exit(1);
            }
        }
        Commands::Stats(store) => {
            let config = commands::apply_store_override(config, &store);
            commands::stats(&config, &mut out).await?;
        }
        Commands::Versions { nct_id, store } => {
            let config = commands::apply_store_override(config, &store);
            let found = commands::versions(&config, &nct_id, &mut out).await?;
            if found == 0 {
                tracing::info!(nct_id, "no stored versions");
            }
        }
    }

    Ok(())
}
