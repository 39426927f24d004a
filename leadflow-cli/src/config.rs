//! Configuration module
//!
//! Connection settings for the Job Store and the Job Executor. Values come
//! from command-line flags, falling back to `LEADFLOW_*` environment
//! variables.

use std::time::Duration;

use leadflow_client::StoreClient;
use leadflow_engine::PollerConfig;

/// CLI configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the Job Store
    pub store_url: String,

    /// URL of the executor endpoint
    pub executor_url: String,

    /// Bearer token, if the services require one
    pub api_key: Option<String>,

    /// Replaces the preset poll interval when set
    pub poll_interval: Option<Duration>,
}

impl Config {
    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, url) in [
            ("store_url", &self.store_url),
            ("executor_url", &self.executor_url),
        ] {
            if url.is_empty() {
                anyhow::bail!("{} cannot be empty", name);
            }

            if !url.starts_with("http://") && !url.starts_with("https://") {
                anyhow::bail!("{} must start with http:// or https://", name);
            }
        }

        if self.poll_interval.is_some_and(|interval| interval.is_zero()) {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        Ok(())
    }

    /// Applies the interval override to a preset
    pub fn poller(&self, preset: PollerConfig) -> PollerConfig {
        match self.poll_interval {
            Some(interval) => preset.with_interval(interval),
            None => preset,
        }
    }

    pub fn client(&self) -> StoreClient {
        let client = StoreClient::new(&self.store_url, &self.executor_url);
        match &self.api_key {
            Some(key) => client.with_api_key(key),
            None => client,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            store_url: "http://localhost:54321".to_string(),
            executor_url: "http://localhost:54321/functions/run-job".to_string(),
            api_key: None,
            poll_interval: None,
        }
    }

    #[test]
    fn test_config_validation() {
        let mut config = config();
        assert!(config.validate().is_ok());

        config.store_url = "not-a-url".to_string();
        assert!(config.validate().is_err());

        config.store_url = "https://store.example.com".to_string();
        config.executor_url = String::new();
        assert!(config.validate().is_err());

        config.executor_url = "https://store.example.com/run".to_string();
        config.poll_interval = Some(Duration::ZERO);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_poll_interval_override() {
        let mut config = config();
        assert_eq!(
            config.poller(PollerConfig::refine()),
            PollerConfig::refine()
        );

        config.poll_interval = Some(Duration::from_secs(1));
        let poller = config.poller(PollerConfig::refine());
        assert_eq!(poller.interval, Duration::from_secs(1));
        assert_eq!(poller.max_attempts, 200);
    }
}
