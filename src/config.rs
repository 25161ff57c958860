use std::time::Duration;

/// User agent sent when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!("rs-alks/", env!("CARGO_PKG_VERSION"));

/// Configuration for the ALKS client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the broker, e.g. `https://alks.example.com/rest`.
    /// Request paths are appended to it verbatim.
    pub base_url: String,

    /// Value of the `User-Agent` header.
    pub user_agent: String,

    /// Overall request timeout. `None` leaves the transport default in place.
    pub timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration pointing at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Sets the broker base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the `User-Agent` header value.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the HTTP request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert!(config.base_url.is_empty());
        assert!(config.user_agent.starts_with("rs-alks/"));
        assert_eq!(config.timeout, None);
    }

    #[test]
    fn custom_base_url() {
        let config = ClientConfig::new("https://alks.example.com/rest");
        assert_eq!(config.base_url, "https://alks.example.com/rest");
    }

    #[test]
    fn custom_user_agent_and_timeout() {
        let config = ClientConfig::default()
            .with_user_agent("terraform-provider-alks/2.0")
            .with_timeout(Duration::from_secs(60));
        assert_eq!(config.user_agent, "terraform-provider-alks/2.0");
        assert_eq!(config.timeout, Some(Duration::from_secs(60)));
    }
}
