//! Process entrypoint: CLI parsing, logging setup, config load, and
//! handing off to the service runtime (§2).

mod cli;
mod dto;
mod error;
mod observe;
mod routes;
mod runtime;
mod state;

use clap::Parser;

pub use cli::Args;

/// Parse CLI args, load configuration, initialize logging, and run the
/// service until shutdown. Mirrors the teacher binary's `start(args)`
/// entrypoint shape.
pub async fn start(args: impl Iterator<Item = String>) {
    let args = cli::Args::parse_from(args);

    let config = match scheduler_config::load_from_file(&args.config).await {
        Ok(config) => config,
        Err(err) => {
            eprintln!("failed to load configuration from {}: {err}", args.config.display());
            std::process::exit(1);
        }
    };

    if args.print_config {
        println!("{config:#?}");
        return;
    }

    init_tracing(args.log_level.as_deref().unwrap_or(&config.log_level));

    if let Err(err) = runtime::run(args.config, config).await {
        tracing::error!(error = %err, "service exited with an error");
        std::process::exit(1);
    }
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_new(log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
