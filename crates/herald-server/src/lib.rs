//! Response envelopes for axum services and the Herald gateway router

#![allow(clippy::must_use_candidate)]

mod error;
mod health;
mod middleware;
mod translate;
mod upstream;
mod wrap;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use herald_config::Config;
use herald_core::{Clock, SystemClock};
use tower_http::trace::TraceLayer;

pub use error::{RaisedFailure, Result, ServiceError};
pub use middleware::{Envelopes, envelope_middleware};
pub use translate::ErrorTranslator;
pub use upstream::{Gateway, UpstreamTarget};
pub use wrap::SuccessWrapper;

/// Assembled server with all routes and middleware
pub struct Server {
    router: Router,
    listen_address: SocketAddr,
}

impl Server {
    /// Build the server from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream client cannot be constructed
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build the server with an explicit clock for envelope timestamps
    ///
    /// # Errors
    ///
    /// Same as [`Self::new`]
    pub fn with_clock(config: &Config, clock: Arc<dyn Clock>) -> anyhow::Result<Self> {
        let listen_address = config
            .server
            .listen_address
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 3000)));

        let mut app = Router::new();

        // Health check
        if config.server.health.enabled {
            app = app.route(&config.server.health.path, axum::routing::get(health::health_handler));
        }

        // Upstream pass-through
        app = app.merge(upstream::router(Gateway::from_config(&config.upstreams)?));

        // Envelopes and panic capture wrap every route, including the fallback
        app = Envelopes::new(clock, config.envelope).apply(app);

        // Tracing
        app = app.layer(TraceLayer::new_for_http());

        Ok(Self {
            router: app,
            listen_address,
        })
    }

    /// Get the configured listen address
    #[must_use]
    pub const fn listen_address(&self) -> SocketAddr {
        self.listen_address
    }

    /// Consume the server and return the inner router
    ///
    /// Useful for testing when the caller manages the listener
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Start serving requests
    ///
    /// Blocks until the cancellation token is triggered.
    ///
    /// # Errors
    ///
    /// Returns an error if binding the TCP listener or serving fails
    pub async fn serve(self, shutdown: tokio_util::sync::CancellationToken) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(self.listen_address).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "server listening");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.cancelled().await;
                tracing::info!("graceful shutdown initiated");
            })
            .await?;

        Ok(())
    }
}
