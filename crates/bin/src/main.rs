use std::sync::Arc;

use clap::Parser;
use orderly::{InMemoryLog, OrderedKeyValue};
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::register;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so JSON output on stdout stays parseable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("orderly=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let log = Arc::new(
        InMemoryLog::load_from_file(&cli.log_file)
            .await?
            .with_height_strategy(cli.height_strategy),
    );
    let kv: OrderedKeyValue = OrderedKeyValue::new(log.clone());
    tracing::debug!(
        path = %cli.log_file.display(),
        entries = log.len().await,
        store_type = OrderedKeyValue::<serde_json::Value>::TYPE,
        "Opened register"
    );

    let mutated = match &cli.command {
        Commands::Put(args) => {
            register::put(&kv, args, cli.format).await?;
            true
        }
        Commands::Move(args) => {
            register::move_to(&kv, args, cli.format).await?;
            true
        }
        Commands::Del(args) => {
            register::delete(&kv, args, cli.format).await?;
            true
        }
        Commands::Get(args) => {
            register::get(&kv, args, cli.format).await?;
            false
        }
        Commands::List(args) => {
            register::list(&kv, args, cli.format).await?;
            false
        }
        Commands::All => {
            register::all(&kv, cli.format).await?;
            false
        }
    };

    if mutated {
        log.save_to_file(&cli.log_file).await?;
    }
    Ok(())
}
