mod config;
mod cmd;
mod connector;
mod error;

use clap::Parser;
use config::{Cli, Commands};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Serve(args) => cmd::serve::run(args).await,
        Commands::Check(args) => cmd::check::run(args),
    };
    if let Err(e) = result {
        tracing::error!(error = %e, "marquee-server failed");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
