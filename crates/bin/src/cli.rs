//! CLI argument definitions for the Orderly binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use orderly::HeightStrategy;

use crate::output::OutputFormat;

/// Ordered key-value register on a local operation log
#[derive(Parser, Debug)]
#[command(name = "orderly")]
#[command(about = "Orderly: an ordered key-value register on an append-only log")]
#[command(version)]
pub struct Cli {
    /// JSON file holding the operation log. Created on first write.
    #[arg(
        short = 'f',
        long,
        default_value = "orderly.json",
        env = "ORDERLY_LOG_FILE",
        global = true
    )]
    pub log_file: PathBuf,

    /// How heights are assigned to new log entries (incremental or timestamp)
    #[arg(
        long,
        default_value = "incremental",
        env = "ORDERLY_HEIGHT_STRATEGY",
        global = true
    )]
    pub height_strategy: HeightStrategy,

    /// Output format
    #[arg(long, value_enum, default_value = "human", global = true)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Set a key to a JSON value
    Put(PutArgs),
    /// Move a key to a new index
    Move(MoveArgs),
    /// Delete a key
    Del(KeyArgs),
    /// Print the current value of a key
    Get(KeyArgs),
    /// List live entries newest first, with their stored positions
    List(ListArgs),
    /// Print every live entry in order
    All,
}

/// Arguments for the put command
#[derive(clap::Args, Debug)]
pub struct PutArgs {
    pub key: String,

    /// Value as JSON. Input that is not valid JSON is stored as a string.
    pub value: String,

    /// Place the key at this index; negative values count from the end
    #[arg(short, long, allow_negative_numbers = true)]
    pub index: Option<i64>,
}

/// Arguments for the move command
#[derive(clap::Args, Debug)]
pub struct MoveArgs {
    pub key: String,

    /// Target index; negative values count from the end
    #[arg(allow_negative_numbers = true)]
    pub index: i64,
}

/// Arguments for commands addressing a single key
#[derive(clap::Args, Debug)]
pub struct KeyArgs {
    pub key: String,
}

/// Arguments for the list command
#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Stop after this many live entries
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}
