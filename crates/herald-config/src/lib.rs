#![allow(clippy::must_use_candidate)]

pub mod envelope;
mod env;
pub mod health;
mod loader;
pub mod server;
pub mod telemetry;
pub mod upstream;

use indexmap::IndexMap;
use serde::Deserialize;

pub use envelope::*;
pub use health::*;
pub use server::*;
pub use telemetry::*;
pub use upstream::*;

/// Top-level Herald configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Listener and built-in routes
    #[serde(default)]
    pub server: ServerConfig,
    /// Success envelope options
    #[serde(default)]
    pub envelope: EnvelopeConfig,
    /// Log output
    #[serde(default)]
    pub telemetry: TelemetryConfig,
    /// Named upstream providers, in declaration order
    #[serde(default)]
    pub upstreams: IndexMap<String, UpstreamConfig>,
}
