use std::sync::Arc;

use herald_config::EnvelopeConfig;
use herald_core::{Clock, ResponseEnvelope, SystemClock};

/// Wraps successful results in the response envelope
#[derive(Clone)]
pub struct SuccessWrapper {
    clock: Arc<dyn Clock>,
    config: EnvelopeConfig,
}

impl Default for SuccessWrapper {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock), EnvelopeConfig::default())
    }
}

impl std::fmt::Debug for SuccessWrapper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuccessWrapper")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl SuccessWrapper {
    pub fn new(clock: Arc<dyn Clock>, config: EnvelopeConfig) -> Self {
        Self { clock, config }
    }

    /// Place `data` in an envelope without touching it
    pub fn wrap<T>(&self, data: T) -> ResponseEnvelope<T> {
        ResponseEnvelope {
            data: Some(data),
            error: None,
            success: self.config.include_success.then_some(true),
            timestamp: self.config.include_timestamp.then(|| self.clock.timestamp()),
        }
    }
}
