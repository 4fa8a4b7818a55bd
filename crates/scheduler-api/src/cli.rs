use std::path::PathBuf;

use clap::Parser;

/// Intelligent routing sidecar for an LLM inference fleet.
#[derive(Debug, Parser)]
pub struct Args {
    /// Path to the YAML configuration file.
    #[clap(long, env, default_value = "config.yaml")]
    pub config: PathBuf,

    /// Override `global.log_level` from the config file.
    #[clap(long, env)]
    pub log_level: Option<String>,

    /// Parse and validate the configuration, print it, and exit without
    /// starting the service.
    #[clap(long)]
    pub print_config: bool,
}
