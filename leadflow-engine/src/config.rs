//! Polling configuration
//!
//! Interval, attempt bound and error threshold for a job poller. The
//! presets match the observed production values: a 3 second tick, a
//! 30 minute bound for the lead pipeline and LinkedIn checks, a 10 minute
//! bound for refining lookalikes, and 10 consecutive query errors.

use std::time::Duration;

/// Default polling interval
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Consecutive query failures tolerated before giving up
pub const DEFAULT_ERROR_THRESHOLD: u32 = 10;

/// Poller configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerConfig {
    /// Time between two store queries
    pub interval: Duration,

    /// Number of queries after which a non-terminal job times out
    pub max_attempts: u32,

    /// Consecutive query failures that abort polling
    pub error_threshold: u32,
}

impl PollerConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
            error_threshold: DEFAULT_ERROR_THRESHOLD,
        }
    }

    /// Lead pipeline steps: 600 x 3s = 30 minutes
    pub fn pipeline() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, 600)
    }

    /// Refine lookalikes: 200 x 3s = 10 minutes
    pub fn refine() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, 200)
    }

    /// LinkedIn activity check: 600 x 3s = 30 minutes
    pub fn linkedin_check() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL, 600)
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub fn with_error_threshold(mut self, error_threshold: u32) -> Self {
        self.error_threshold = error_threshold;
        self
    }

    /// Longest time a poller waits for a terminal status
    pub fn total_budget(&self) -> Duration {
        self.interval * self.max_attempts
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.interval.is_zero() {
            anyhow::bail!("poll interval must be greater than 0");
        }

        if self.max_attempts == 0 {
            anyhow::bail!("max_attempts must be greater than 0");
        }

        if self.error_threshold == 0 {
            anyhow::bail!("error_threshold must be greater than 0");
        }

        Ok(())
    }
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self::pipeline()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets() {
        assert_eq!(
            PollerConfig::pipeline().total_budget(),
            Duration::from_secs(30 * 60)
        );
        assert_eq!(
            PollerConfig::linkedin_check().total_budget(),
            Duration::from_secs(30 * 60)
        );
        assert_eq!(
            PollerConfig::refine().total_budget(),
            Duration::from_secs(10 * 60)
        );
        assert_eq!(PollerConfig::refine().error_threshold, 10);
    }

    #[test]
    fn test_config_validation() {
        let mut config = PollerConfig::default();
        assert!(config.validate().is_ok());

        config.interval = Duration::ZERO;
        assert!(config.validate().is_err());

        config = PollerConfig::default().with_error_threshold(0);
        assert!(config.validate().is_err());

        config = PollerConfig::new(Duration::from_millis(10), 0);
        assert!(config.validate().is_err());
    }
}
