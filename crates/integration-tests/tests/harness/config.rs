//! Programmatic configuration builder for integration tests

use std::net::SocketAddr;

use herald_config::{Config, EnvelopeConfig, HealthConfig, ServerConfig, UpstreamConfig};
use indexmap::IndexMap;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with minimal defaults
    pub fn new() -> Self {
        Self {
            config: Config {
                server: ServerConfig {
                    listen_address: Some(SocketAddr::from(([127, 0, 0, 1], 0))),
                    health: HealthConfig::default(),
                },
                ..Config::default()
            },
        }
    }

    /// Register an upstream pointed at a mock backend
    pub fn with_upstream(mut self, name: &str, base_url: &str) -> Self {
        self.config.upstreams.insert(
            name.to_owned(),
            UpstreamConfig {
                base_url: base_url.parse().expect("valid URL"),
                headers: IndexMap::from([("x-api-key".to_owned(), "test-key".to_owned())]),
            },
        );
        self
    }

    /// Set success envelope options
    pub fn with_envelope(mut self, envelope: EnvelopeConfig) -> Self {
        self.config.envelope = envelope;
        self
    }

    /// Disable health endpoint
    pub fn without_health(mut self) -> Self {
        self.config.server.health.enabled = false;
        self
    }

    /// Build the final config
    pub fn build(self) -> Config {
        self.config
    }
}
