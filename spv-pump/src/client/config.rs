use std::time::Duration;

/// CGI path that serves every command on SPV pumps.
pub const DEFAULT_ENDPOINT_PATH: &str = "/cgi-bin/EpvCgi";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Host name or address of the pump, optionally with a port
    /// (e.g. "192.168.1.54" or "pump.local:8080").
    pub host: String,

    pub endpoint_path: String,

    /// Bound on each request, connection included.
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            endpoint_path: DEFAULT_ENDPOINT_PATH.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the endpoint, without query.
    pub fn endpoint_url(&self) -> String {
        format!("http://{}{}", self.host, self.endpoint_path)
    }
}
