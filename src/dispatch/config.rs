use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_BATCH_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_SELECT_PATH: &str = "/choose_env_interface";
pub const DEFAULT_EXECUTE_PATH: &str = "/execute_api";

/// Where and how to reach the execution backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Pause between consecutive calls of a batch run.
    pub batch_delay: Duration,
    pub select_path: String,
    pub execute_path: String,
}

pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            config: ClientConfig {
                base_url: base_url.into(),
                timeout: DEFAULT_TIMEOUT,
                batch_delay: DEFAULT_BATCH_DELAY,
                select_path: DEFAULT_SELECT_PATH.to_string(),
                execute_path: DEFAULT_EXECUTE_PATH.to_string(),
            },
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.config.batch_delay = delay;
        self
    }

    pub fn with_select_path(mut self, path: impl Into<String>) -> Self {
        self.config.select_path = path.into();
        self
    }

    pub fn with_execute_path(mut self, path: impl Into<String>) -> Self {
        self.config.execute_path = path.into();
        self
    }

    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl ClientConfig {
    pub fn builder(base_url: impl Into<String>) -> ClientConfigBuilder {
        ClientConfigBuilder::new(base_url)
    }

    /// Joins the base URL and an endpoint path with exactly one slash.
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub fn select_url(&self) -> String {
        self.endpoint(&self.select_path)
    }

    pub fn execute_url(&self) -> String {
        self.endpoint(&self.execute_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_and_overrides() {
        let config = ClientConfig::builder("http://localhost:5000/").build();
        assert_eq!(config.timeout, DEFAULT_TIMEOUT);
        assert_eq!(config.batch_delay, Duration::from_secs(1));
        assert_eq!(config.select_url(), "http://localhost:5000/choose_env_interface");

        let config = ClientConfig::builder("http://host")
            .with_execute_path("run")
            .with_batch_delay(Duration::ZERO)
            .build();
        assert_eq!(config.execute_url(), "http://host/run");
        assert_eq!(config.batch_delay, Duration::ZERO);
    }
}
