use serde::Deserialize;

use super::engine::EngineConfig;
use super::peer::{NoiseConfig, PeerConfig, RegistrationConfig};
use super::probe::ProbeConfig;
use super::quality::QualityConfig;
use super::scan::{OutputConfig, ScanConfig};
use super::telemetry::LoggingConfig;

/// Main configuration structure
///
/// Every section is optional; an empty file yields a usable configuration
/// apart from provisioning, which needs either `[peer]` or `[registration]`.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    /// Scan shape: address family, port allocation, batching and ranking
    #[serde(default)]
    pub scan: ScanConfig,
    /// Pre-flight network quality probe
    #[serde(default)]
    pub quality: QualityConfig,
    /// Per-endpoint probes sent through the tunnel
    #[serde(default)]
    pub probe: ProbeConfig,
    /// External tunnel engine process
    #[serde(default)]
    pub engine: EngineConfig,
    /// UDP noise obfuscation (optional)
    /// When present, every tunnel egress dials through a noise egress
    /// Default: None
    #[serde(default)]
    pub noise: Option<NoiseConfig>,
    /// Static tunnel peer parameters (optional)
    /// Takes precedence over `registration` when both are set
    #[serde(default)]
    pub peer: Option<PeerConfig>,
    /// Registration endpoint used to obtain peer parameters (optional)
    #[serde(default)]
    pub registration: Option<RegistrationConfig>,
    /// Result file location
    #[serde(default)]
    pub output: OutputConfig,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}
