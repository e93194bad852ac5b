use serde::Deserialize;

/// Which bookkeeping fields success envelopes carry
///
/// Failure envelopes always carry both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvelopeConfig {
    #[serde(default = "enabled")]
    pub include_success: bool,
    #[serde(default = "enabled")]
    pub include_timestamp: bool,
}

impl Default for EnvelopeConfig {
    fn default() -> Self {
        Self {
            include_success: true,
            include_timestamp: true,
        }
    }
}

#[allow(clippy::missing_const_for_fn)]
fn enabled() -> bool {
    true
}
