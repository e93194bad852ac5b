use jiff::Timestamp;

/// Source of the current time for envelope timestamps
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Timestamp;

    /// Current time rendered the way envelopes carry it
    fn timestamp(&self) -> String {
        format_timestamp(self.now())
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Clock frozen at a single instant, for deterministic output
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub Timestamp);

impl Clock for FixedClock {
    fn now(&self) -> Timestamp {
        self.0
    }
}

/// Render a timestamp as UTC ISO-8601 with millisecond precision
///
/// e.g. `2024-01-01T00:00:00.000Z`
pub fn format_timestamp(timestamp: Timestamp) -> String {
    format!("{timestamp:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_with_milliseconds() {
        let ts: Timestamp = "2024-01-01T00:00:00Z".parse().unwrap();
        assert_eq!(format_timestamp(ts), "2024-01-01T00:00:00.000Z");
    }

    #[test]
    fn fixed_clock_is_stable() {
        let clock = FixedClock("2025-09-14T16:18:31.955Z".parse().unwrap());
        assert_eq!(clock.timestamp(), "2025-09-14T16:18:31.955Z");
        assert_eq!(clock.timestamp(), clock.timestamp());
    }
}
