// Copyplus Timing
// Delays and windows shared by the burst scheduler and the clipboard processor

use std::time::Duration;

/// Timing knobs for gesture detection and clipboard retries.
///
/// The defaults are tuned for a human double-tapping C while holding
/// Control; the `[timing]` table of the settings file may override any of
/// them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timing {
    /// Presses closer than this to the previous one are auto-repeat noise
    pub repeat_debounce: Duration,
    /// A gap longer than this starts a new burst
    pub burst_timeout: Duration,
    /// Wait after the latest press before deciding whether to process
    pub settle_delay: Duration,
    /// Extra wait for the clipboard owner to finish writing
    pub clipboard_settle: Duration,
    /// Minimum spacing between two completed processing runs
    pub throttle: Duration,
    /// Clipboard attempts before giving up
    pub max_attempts: u32,
    /// Wait between failed clipboard attempts
    pub retry_delay: Duration,
}

impl Timing {
    pub const DEFAULT_REPEAT_DEBOUNCE_MS: u64 = 35;
    pub const DEFAULT_BURST_TIMEOUT_MS: u64 = 1500;
    pub const DEFAULT_SETTLE_DELAY_MS: u64 = 220;
    pub const DEFAULT_CLIPBOARD_SETTLE_MS: u64 = 120;
    pub const DEFAULT_THROTTLE_MS: u64 = 250;
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 8;
    pub const DEFAULT_RETRY_DELAY_MS: u64 = 60;
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            repeat_debounce: Duration::from_millis(Self::DEFAULT_REPEAT_DEBOUNCE_MS),
            burst_timeout: Duration::from_millis(Self::DEFAULT_BURST_TIMEOUT_MS),
            settle_delay: Duration::from_millis(Self::DEFAULT_SETTLE_DELAY_MS),
            clipboard_settle: Duration::from_millis(Self::DEFAULT_CLIPBOARD_SETTLE_MS),
            throttle: Duration::from_millis(Self::DEFAULT_THROTTLE_MS),
            max_attempts: Self::DEFAULT_MAX_ATTEMPTS,
            retry_delay: Duration::from_millis(Self::DEFAULT_RETRY_DELAY_MS),
        }
    }
}

/// `[timing]` table as written in the settings file, all in milliseconds
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
pub struct TimingToml {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repeat_debounce_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub burst_timeout_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settle_delay_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clipboard_settle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throttle_ms: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay_ms: Option<u64>,
}

impl TimingToml {
    /// Overlay the configured values on the defaults.
    ///
    /// `max_attempts` is clamped to at least 1.
    pub fn resolve(&self) -> Timing {
        let defaults = Timing::default();
        let ms = |value: Option<u64>, fallback: Duration| {
            value.map(Duration::from_millis).unwrap_or(fallback)
        };

        Timing {
            repeat_debounce: ms(self.repeat_debounce_ms, defaults.repeat_debounce),
            burst_timeout: ms(self.burst_timeout_ms, defaults.burst_timeout),
            settle_delay: ms(self.settle_delay_ms, defaults.settle_delay),
            clipboard_settle: ms(self.clipboard_settle_ms, defaults.clipboard_settle),
            throttle: ms(self.throttle_ms, defaults.throttle),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts).max(1),
            retry_delay: ms(self.retry_delay_ms, defaults.retry_delay),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let timing = Timing::default();
        assert_eq!(timing.repeat_debounce, Duration::from_millis(35));
        assert_eq!(timing.burst_timeout, Duration::from_millis(1500));
        assert_eq!(timing.throttle, Duration::from_millis(250));
        assert_eq!(timing.max_attempts, 8);
        assert_eq!(timing.settle_delay + timing.clipboard_settle, Duration::from_millis(340));
    }

    #[test]
    fn test_resolve_overrides() {
        let toml = TimingToml {
            settle_delay_ms: Some(300),
            max_attempts: Some(0),
            ..Default::default()
        };
        let timing = toml.resolve();
        assert_eq!(timing.settle_delay, Duration::from_millis(300));
        assert_eq!(timing.max_attempts, 1);
        assert_eq!(timing.retry_delay, Duration::from_millis(60));
    }

    #[test]
    fn test_resolve_empty_is_default() {
        assert_eq!(TimingToml::default().resolve(), Timing::default());
    }
}
