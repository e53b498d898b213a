use serde::Deserialize;
use std::path::PathBuf;

/// Placeholder in `EngineConfig::args` replaced with the generated config path
pub const CONFIG_PLACEHOLDER: &str = "{config}";

/// How the supervisor decides the engine is usable after spawning it
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Readiness {
    /// Sleep `settle_ms`, then retry a TCP connect against the first ingress
    #[default]
    ConnectProbe,
    /// Sleep `settle_ms` and assume the engine is listening
    FixedDelay,
}

/// External tunnel engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct EngineConfig {
    /// Engine executable (resolved through PATH when not absolute)
    /// Default: "xray"
    #[serde(default = "default_binary")]
    pub binary: PathBuf,
    /// Arguments passed to the engine; "{config}" is replaced with `config_path`
    /// Default: ["-c", "{config}"]
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Where the generated engine configuration is written
    /// Default: "core/config.json"
    #[serde(default = "default_config_path")]
    pub config_path: PathBuf,
    /// Engine access log path, written into the generated configuration
    /// Default: "core/log/access.log"
    #[serde(default = "default_access_log")]
    pub access_log: String,
    /// Engine error log path, written into the generated configuration
    /// Default: "core/log/error.log"
    #[serde(default = "default_error_log")]
    pub error_log: String,
    /// Engine log level
    /// Default: "warning"
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// DNS server the engine resolves through
    /// Default: "8.8.8.8"
    #[serde(default = "default_dns_server")]
    pub dns_server: String,
    /// Delay after spawning before the engine is considered (or probed for) ready
    /// Default: 1000
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,
    /// Readiness strategy: "connect_probe" or "fixed_delay"
    /// Default: "connect_probe"
    #[serde(default)]
    pub readiness: Readiness,
    /// Connect attempts made by the "connect_probe" strategy
    /// Default: 20
    #[serde(default = "default_readiness_attempts")]
    pub readiness_attempts: u32,
    /// Delay between connect attempts in milliseconds
    /// Default: 250
    #[serde(default = "default_readiness_interval_ms")]
    pub readiness_interval_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            args: default_args(),
            config_path: default_config_path(),
            access_log: default_access_log(),
            error_log: default_error_log(),
            log_level: default_log_level(),
            dns_server: default_dns_server(),
            settle_ms: default_settle_ms(),
            readiness: Readiness::default(),
            readiness_attempts: default_readiness_attempts(),
            readiness_interval_ms: default_readiness_interval_ms(),
        }
    }
}

fn default_binary() -> PathBuf {
    PathBuf::from("xray")
}

fn default_args() -> Vec<String> {
    vec!["-c".to_string(), CONFIG_PLACEHOLDER.to_string()]
}

fn default_config_path() -> PathBuf {
    PathBuf::from("core/config.json")
}

fn default_access_log() -> String {
    "core/log/access.log".to_string()
}

fn default_error_log() -> String {
    "core/log/error.log".to_string()
}

fn default_log_level() -> String {
    "warning".to_string()
}

fn default_dns_server() -> String {
    "8.8.8.8".to_string()
}

fn default_settle_ms() -> u64 {
    1000
}

fn default_readiness_attempts() -> u32 {
    20
}

fn default_readiness_interval_ms() -> u64 {
    250
}
