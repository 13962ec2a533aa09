//! tilesmith - fetch and publish compiled releases

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tilesmith_cli::cmd;
use tilesmith_cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let lock_path = cli.lock_path();

    match cli.command {
        Commands::Fetch {
            releases_directory,
            download_threads,
        } => {
            cmd::fetch::fetch(
                &cli.config,
                &lock_path,
                &releases_directory,
                download_threads,
            )
            .await
        }
        Commands::Publish {
            name,
            version,
            remote,
            path,
            update_lock,
        } => {
            let request = tilesmith_core::PublishRequest {
                path,
                name,
                version,
                remote,
                update_lock,
            };
            cmd::publish::publish(&cli.config, &lock_path, &request).await
        }
        Commands::Completions { shell } => {
            cmd::completions::completions(shell);
            Ok(())
        }
    }
}
