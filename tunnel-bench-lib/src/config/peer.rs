use serde::{Deserialize, Serialize};

/// Statically configured tunnel peer parameters
#[derive(Debug, Deserialize, Clone)]
pub struct PeerConfig {
    /// Local private key (base64)
    #[serde(default)]
    pub private_key: String,
    /// Far-end peer public key (base64)
    #[serde(default)]
    pub peer_public_key: String,
    /// Interface addresses assigned to the client
    /// Example: ["172.16.0.2/32", "2606:4700:110:8a36::1/128"]
    #[serde(default)]
    pub addresses: Vec<String>,
    /// Reserved bytes derived from the client identifier
    /// Default: []
    #[serde(default)]
    pub reserved: Vec<u8>,
    /// Tunnel MTU
    /// Default: 1280
    #[serde(default = "default_mtu")]
    pub mtu: u16,
    /// Peer keep-alive interval in seconds
    /// Default: 5
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u32,
}

/// Registration API used to obtain peer parameters for a locally held keypair
#[derive(Debug, Deserialize, Clone)]
pub struct RegistrationConfig {
    /// Registration endpoint
    /// Default: "https://api.cloudflareclient.com/v0a4005/reg"
    #[serde(default = "default_registration_url")]
    pub url: String,
    /// Local X25519 private key (base64); kept locally, never sent.
    /// A fresh keypair is generated when both keys are omitted.
    #[serde(default)]
    pub private_key: String,
    /// Local public key (base64) sent to the registration endpoint;
    /// derived from `private_key` when omitted
    #[serde(default)]
    pub public_key: String,
    /// Request timeout in milliseconds
    /// Default: 5000
    #[serde(default = "default_registration_timeout_ms")]
    pub timeout_ms: u64,
    /// User-Agent header sent with the registration request
    /// Default: "insomnia/8.6.1"
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Tunnel MTU applied to the provisioned egress
    /// Default: 1280
    #[serde(default = "default_mtu")]
    pub mtu: u16,
    /// Peer keep-alive interval in seconds
    /// Default: 5
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u32,
}

/// UDP noise obfuscation settings
///
/// The descriptor is serialized as-is into the engine configuration,
/// repeated `count` times.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct NoiseConfig {
    /// Noise packet type, e.g. "rand", "str", "base64"
    /// Default: "rand"
    #[serde(rename = "type", default = "default_noise_type")]
    pub kind: String,
    /// Packet descriptor; for "rand" a length range
    /// Default: "50-100"
    #[serde(default = "default_noise_packet")]
    pub packet: String,
    /// Delay range between noise packets in milliseconds
    /// Default: "1-5"
    #[serde(default = "default_noise_delay")]
    pub delay: String,
    /// How many noise entries are emitted
    /// Default: 5
    #[serde(default = "default_noise_count", skip_serializing)]
    pub count: u32,
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            kind: default_noise_type(),
            packet: default_noise_packet(),
            delay: default_noise_delay(),
            count: default_noise_count(),
        }
    }
}

fn default_mtu() -> u16 {
    1280
}

fn default_keep_alive_secs() -> u32 {
    5
}

fn default_registration_url() -> String {
    "https://api.cloudflareclient.com/v0a4005/reg".to_string()
}

fn default_registration_timeout_ms() -> u64 {
    5000
}

fn default_user_agent() -> String {
    "insomnia/8.6.1".to_string()
}

fn default_noise_type() -> String {
    "rand".to_string()
}

fn default_noise_packet() -> String {
    "50-100".to_string()
}

fn default_noise_delay() -> String {
    "1-5".to_string()
}

fn default_noise_count() -> u32 {
    5
}
