use reqwest::{Client, Proxy, StatusCode};
use std::time::{Duration, Instant};
use tracing::trace;

use crate::error::Result;

/// Outcome of one timed request through an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProbeAttempt {
    latency_ms: Option<u64>,
}

impl ProbeAttempt {
    pub fn succeeded(latency_ms: u64) -> Self {
        Self { latency_ms: Some(latency_ms) }
    }

    pub fn failed() -> Self {
        Self { latency_ms: None }
    }

    pub fn success(&self) -> bool {
        self.latency_ms.is_some()
    }

    /// Round-trip time, present only for successful attempts
    pub fn latency_ms(&self) -> Option<u64> {
        self.latency_ms
    }
}

/// HTTP client routed through one endpoint's local proxy port.
///
/// Idle connections are not pooled so every attempt opens its own path
/// through the tunnel.
pub fn proxied_client(host: &str, port: u16, timeout: Duration) -> Result<Client> {
    let proxy = Proxy::all(format!("http://{host}:{port}"))?;
    let client = Client::builder()
        .proxy(proxy)
        .pool_max_idle_per_host(0)
        .timeout(timeout)
        .build()?;
    Ok(client)
}

/// Issue one HEAD request and time it; only 204 No Content counts
pub async fn run_attempt(client: &Client, url: &str) -> ProbeAttempt {
    let start = Instant::now();
    match client.head(url).send().await {
        Ok(resp) if resp.status() == StatusCode::NO_CONTENT => {
            let elapsed = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
            ProbeAttempt::succeeded(elapsed)
        }
        Ok(resp) => {
            trace!(status = %resp.status(), "probe attempt unexpected status");
            ProbeAttempt::failed()
        }
        Err(err) => {
            trace!(%err, "probe attempt failed");
            ProbeAttempt::failed()
        }
    }
}
