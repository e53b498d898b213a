use serde::Deserialize;

/// Configuration for probes sent through each endpoint's local proxy port
#[derive(Debug, Deserialize, Clone)]
pub struct ProbeConfig {
    /// Reachability-check target; a healthy path answers 204 No Content
    /// Default: "http://www.gstatic.com/generate_204"
    #[serde(default = "default_target_url")]
    pub target_url: String,
    /// Per-attempt timeout in milliseconds
    /// Default: 2000
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Delay between the start of consecutive endpoint tasks, in milliseconds
    /// Total scheduling time grows as `endpoint_stagger_ms * endpoint_count`
    /// Default: 5
    #[serde(default = "default_endpoint_stagger_ms")]
    pub endpoint_stagger_ms: u64,
    /// Delay between consecutive attempts of one endpoint, in milliseconds
    /// Default: 100
    #[serde(default = "default_attempt_stagger_ms")]
    pub attempt_stagger_ms: u64,
    /// Host the engine's ingress ports listen on
    /// Default: "127.0.0.1"
    #[serde(default = "default_proxy_host")]
    pub proxy_host: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            timeout_ms: default_timeout_ms(),
            endpoint_stagger_ms: default_endpoint_stagger_ms(),
            attempt_stagger_ms: default_attempt_stagger_ms(),
            proxy_host: default_proxy_host(),
        }
    }
}

fn default_target_url() -> String {
    "http://www.gstatic.com/generate_204".to_string()
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_endpoint_stagger_ms() -> u64 {
    5
}

fn default_attempt_stagger_ms() -> u64 {
    100
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}
