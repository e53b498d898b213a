use serde::Deserialize;
use std::path::PathBuf;

use crate::endpoint::FamilyMode;
use crate::ranking::RankOrder;

/// Scan configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ScanConfig {
    /// Address families to scan: "ipv4", "ipv6" or "both"
    /// With "both", the first half of the endpoint list is steered to IPv4
    /// and the second half to IPv6
    /// Default: "ipv4"
    #[serde(default)]
    pub family: FamilyMode,
    /// First local ingress port; endpoint `i` listens on `base_port + i`
    /// Default: 1080
    #[serde(default = "default_base_port")]
    pub base_port: u16,
    /// Highest local port the allocator may hand out
    /// Default: 65535
    #[serde(default = "default_max_port")]
    pub max_port: u16,
    /// Number of endpoints measured per engine process (optional)
    /// Each batch reuses the same port range
    /// Default: None (single batch)
    #[serde(default)]
    pub batch_size: Option<usize>,
    /// Ranking policy: "latency" or "loss_weighted"
    /// Default: "latency"
    #[serde(default)]
    pub rank_order: RankOrder,
    /// Number of endpoints reported as the actionable result
    /// Default: 10
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            family: FamilyMode::default(),
            base_port: default_base_port(),
            max_port: default_max_port(),
            batch_size: None,
            rank_order: RankOrder::default(),
            top_k: default_top_k(),
        }
    }
}

/// Result file configuration
#[derive(Debug, Deserialize, Clone)]
pub struct OutputConfig {
    /// Path of the CSV file holding every measured endpoint
    /// Default: "result.csv"
    #[serde(default = "default_output_path")]
    pub path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { path: default_output_path() }
    }
}

fn default_base_port() -> u16 {
    1080
}

fn default_max_port() -> u16 {
    u16::MAX
}

fn default_top_k() -> usize {
    10
}

fn default_output_path() -> PathBuf {
    PathBuf::from("result.csv")
}
