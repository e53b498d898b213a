use serde::Deserialize;

/// Pre-flight network quality probe configuration
#[derive(Debug, Deserialize, Clone)]
pub struct QualityConfig {
    /// Highly available target answering 204 No Content
    /// Requested directly, never through the tunnel
    /// Default: "http://www.google.com/generate_204"
    #[serde(default = "default_target_url")]
    pub target_url: String,
    /// Number of requests in the burst
    /// Default: 100
    #[serde(default = "default_samples")]
    pub samples: u32,
    /// Maximum requests in flight
    /// Kept low so the probe does not congest the link it is measuring
    /// Default: 5
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// Per-request timeout in milliseconds
    /// Default: 5000
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Band thresholds used to pick a retry tier
    #[serde(default)]
    pub thresholds: QualityThresholds,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            target_url: default_target_url(),
            samples: default_samples(),
            max_concurrency: default_max_concurrency(),
            timeout_ms: default_timeout_ms(),
            thresholds: QualityThresholds::default(),
        }
    }
}

/// Threshold table for quality classification
///
/// Each metric has a "moderate" and a "poor" band. The selected tier is the
/// worst band reached by any single metric.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct QualityThresholds {
    /// Default: 100
    #[serde(default = "default_moderate_latency_ms")]
    pub moderate_latency_ms: u64,
    /// Default: 200
    #[serde(default = "default_poor_latency_ms")]
    pub poor_latency_ms: u64,
    /// Default: 5.0
    #[serde(default = "default_moderate_loss_percent")]
    pub moderate_loss_percent: f64,
    /// Default: 10.0
    #[serde(default = "default_poor_loss_percent")]
    pub poor_loss_percent: f64,
    /// Default: 5.0
    #[serde(default = "default_moderate_jitter_ms")]
    pub moderate_jitter_ms: f64,
    /// Default: 10.0
    #[serde(default = "default_poor_jitter_ms")]
    pub poor_jitter_ms: f64,
}

impl Default for QualityThresholds {
    fn default() -> Self {
        Self {
            moderate_latency_ms: default_moderate_latency_ms(),
            poor_latency_ms: default_poor_latency_ms(),
            moderate_loss_percent: default_moderate_loss_percent(),
            poor_loss_percent: default_poor_loss_percent(),
            moderate_jitter_ms: default_moderate_jitter_ms(),
            poor_jitter_ms: default_poor_jitter_ms(),
        }
    }
}

fn default_target_url() -> String {
    "http://www.google.com/generate_204".to_string()
}

fn default_samples() -> u32 {
    100
}

fn default_max_concurrency() -> usize {
    5
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_moderate_latency_ms() -> u64 {
    100
}

fn default_poor_latency_ms() -> u64 {
    200
}

fn default_moderate_loss_percent() -> f64 {
    5.0
}

fn default_poor_loss_percent() -> f64 {
    10.0
}

fn default_moderate_jitter_ms() -> f64 {
    5.0
}

fn default_poor_jitter_ms() -> f64 {
    10.0
}
