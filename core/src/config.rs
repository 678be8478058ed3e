//! Client configuration and its environment loader.
use std::env;

pub const DEFAULT_ENDPOINT: &str = "https://leetcode.com/graphql";
pub const DEFAULT_USERNAME: &str = "AmirMahdi-Tizchang";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 15_0 like Mac OS X)";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Where to send the query, for whom, and how long to wait.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub username: String,
    pub user_agent: String,
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms.max(1);
        self
    }

    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `STATS_ENDPOINT` - GraphQL endpoint URL (default: `https://leetcode.com/graphql`)
    /// - `STATS_USERNAME` - Profile to query (default: `AmirMahdi-Tizchang`)
    /// - `STATS_USER_AGENT` - User-Agent header value (default: iPhone Safari string)
    /// - `STATS_TIMEOUT_MS` - Round-trip timeout in milliseconds (default: 10000)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(endpoint) = read_env_string("STATS_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(username) = read_env_string("STATS_USERNAME") {
            config.username = username;
        }
        if let Some(user_agent) = read_env_string("STATS_USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(timeout) = read_env::<u64>("STATS_TIMEOUT_MS") {
            config.timeout_ms = timeout.max(1);
        }

        config
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.trim().parse().ok()
}

fn read_env_string(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}
