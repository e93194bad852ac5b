use std::path::PathBuf;

use clap::Parser;

/// Herald response-envelope gateway
#[derive(Debug, Parser)]
#[command(name = "herald", about = "Gateway that wraps every response in a uniform envelope")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "herald.toml", env = "HERALD_CONFIG")]
    pub config: PathBuf,

    /// Override the listen address
    #[arg(long, env = "HERALD_LISTEN")]
    pub listen: Option<std::net::SocketAddr>,
}
