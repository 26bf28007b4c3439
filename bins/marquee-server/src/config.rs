use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "marquee-server", about = "Movie gallery backed by bounded storage targets")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP API.
    Serve(ConfigArgs),
    /// Validate the configuration and print the resolved target order.
    Check(ConfigArgs),
}

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Path to TOML configuration file.
    #[arg(long, default_value = "marquee.toml", env = "MARQUEE_CONFIG")]
    pub config: String,

    /// Override `api_port` from the config file.
    #[arg(long, env = "MARQUEE_PORT")]
    pub port: Option<u16>,
}
