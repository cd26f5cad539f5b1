//! HTTP transport settings shared by every request the transcript source makes.

use reqwest::{ClientBuilder, Proxy};
use std::time::Duration;

/// Longest request timeout accepted from the command line or config file (one day)
pub const MAX_TIMEOUT_SECONDS: f64 = 86_400.0;

/// Timeout and proxy settings applied to the outbound HTTP client
#[derive(Debug, Clone, PartialEq)]
pub struct TransportConfig {
    /// Per-request timeout
    pub timeout: Option<Duration>,

    /// Proxy used for each URL scheme
    pub proxies: Option<ProxyMap>,
}

/// Proxy URI per scheme; a single `--proxy` fills both
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyMap {
    pub http: String,
    pub https: String,
}

impl ProxyMap {
    pub fn uniform(uri: &str) -> Self {
        Self {
            http: uri.to_string(),
            https: uri.to_string(),
        }
    }
}

impl TransportConfig {
    /// Build a transport configuration, or `None` when the default transport should be used.
    pub fn from_settings(timeout_seconds: Option<f64>, proxy_uri: Option<&str>) -> Option<Self> {
        if timeout_seconds.is_none() && proxy_uri.is_none() {
            return None;
        }

        Some(Self {
            timeout: timeout_seconds.and_then(timeout_duration),
            proxies: proxy_uri.map(ProxyMap::uniform),
        })
    }

    /// Apply the timeout and proxies to a client builder
    pub fn apply(&self, mut builder: ClientBuilder) -> Result<ClientBuilder, reqwest::Error> {
        if let Some(timeout) = self.timeout {
            tracing::debug!("Using request timeout of {:?}", timeout);
            builder = builder.timeout(timeout);
        }

        if let Some(proxies) = &self.proxies {
            tracing::debug!("Routing http via {} and https via {}", proxies.http, proxies.https);
            builder = builder
                .proxy(Proxy::http(&proxies.http)?)
                .proxy(Proxy::https(&proxies.https)?);
        }

        Ok(builder)
    }
}

/// Convert seconds to a `Duration`, capped at [`MAX_TIMEOUT_SECONDS`]; NaN and negatives yield `None`
fn timeout_duration(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds.min(MAX_TIMEOUT_SECONDS)).ok()
}
