use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

fn default_bind_addr() -> String {
    "127.0.0.1:5000".to_string()
}

fn default_cors_enabled() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_body_limit_bytes() -> usize {
    16 * 1024 * 1024
}

/// HTTP host configuration (`modules.api_ingress` in the app config).
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ApiIngressConfig {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
    #[serde(default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_body_limit_bytes")]
    pub body_limit_bytes: usize,
}

impl Default for ApiIngressConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            cors_enabled: default_cors_enabled(),
            request_timeout_secs: default_timeout_secs(),
            body_limit_bytes: default_body_limit_bytes(),
        }
    }
}

impl ApiIngressConfig {
    /// Config derived from the `server` section when no module section exists.
    pub fn for_server(host: &str, port: u16, timeout_secs: u64) -> Self {
        Self {
            bind_addr: format!("{host}:{port}"),
            request_timeout_secs: if timeout_secs == 0 {
                default_timeout_secs()
            } else {
                timeout_secs
            },
            ..Default::default()
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        self.bind_addr
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid bind address '{}': {}", self.bind_addr, e))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}
