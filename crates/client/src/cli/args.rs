pub use clap::Parser;

use std::path::PathBuf;

use cib_client::config::Environment;
use tracing::level_filters::LevelFilter;

#[derive(Parser, Debug)]
#[command(name = "cib")]
#[command(about = "Encrypted client for the Corporate Internet Banking API")]
pub struct Args {
    /// Path to the cib config directory (defaults to ~/.cib)
    #[arg(long, global = true)]
    pub config_path: Option<PathBuf>,

    /// Environment to call instead of the one set in the config
    #[arg(long, global = true, value_enum)]
    pub environment: Option<Environment>,

    /// Also write debug logs to a daily file in this directory
    #[arg(long, global = true)]
    pub log_dir: Option<PathBuf>,

    /// Log level on stderr (RUST_LOG overrides)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: crate::Command,
}
