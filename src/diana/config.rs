//! Client configuration.

use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 34567;
pub const DEFAULT_POOL_SIZE: usize = 5;
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Connection parameters for a DianaDB server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DianaConfig {
    pub user: String,
    pub password: String,
    pub host: String,
    pub port: u16,
    /// Number of connections opened by `DianaClient::connect`.
    pub pool_size: usize,
    /// Upper bound for opening and authenticating a single connection.
    pub connect_timeout: Duration,
}

impl DianaConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_credentials(mut self, user: impl Into<String>, password: impl Into<String>) -> Self {
        self.user = user.into();
        self.password = password.into();
        self
    }

    pub fn with_pool_size(mut self, size: usize) -> Self {
        self.pool_size = size;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for DianaConfig {
    fn default() -> Self {
        Self {
            user: "admin".to_string(),
            password: "admin".to_string(),
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            pool_size: DEFAULT_POOL_SIZE,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }
}
