pub mod toml_config;

use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "domainbook-sync")]
#[command(about = "Synchronize a directory group's domain members with an authoritative domain list")]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long = "config-file", alias = "config_file")]
    pub config_file: PathBuf,

    /// Log at DEBUG level instead of INFO
    #[arg(short, long)]
    pub verbose: bool,

    /// Compute and log the changes without modifying the group
    #[arg(long)]
    pub dry_run: bool,
}
