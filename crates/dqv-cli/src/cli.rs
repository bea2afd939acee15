use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use dqv_types::{BatchKwargsKind, DatasourceFamily};

#[derive(Parser)]
#[command(
    name = "dqv",
    about = "dqv: batch fingerprints and result stores for data-quality validation",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Project configuration file
    #[arg(short, long, global = true, default_value = "dqv.toml")]
    pub config: PathBuf,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Compute the fingerprint of a batch kwargs JSON object
    Fingerprint(FingerprintArgs),
    /// Check batch kwargs against a datasource policy
    CheckKwargs(CheckKwargsArgs),
    /// Read or write a configured store
    Store(StoreArgs),
}

#[derive(Args)]
pub struct FingerprintArgs {
    /// Batch kwargs as JSON
    pub kwargs: String,
}

#[derive(Args)]
pub struct CheckKwargsArgs {
    #[arg(long)]
    pub kind: BatchKwargsKind,
    #[arg(long)]
    pub family: Option<DatasourceFamily>,
    /// Batch kwargs as JSON
    pub kwargs: String,
}

#[derive(Args)]
pub struct StoreArgs {
    /// Store name from the project configuration
    pub name: String,
    #[command(subcommand)]
    pub action: StoreAction,
}

#[derive(Subcommand)]
pub enum StoreAction {
    Get {
        key: String,
        #[arg(long)]
        serialization: Option<String>,
    },
    Set {
        key: String,
        value: String,
        #[arg(long)]
        serialization: Option<String>,
    },
    List,
    Has { key: String },
}
