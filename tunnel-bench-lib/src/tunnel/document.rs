use serde::Serialize;

use crate::config::NoiseConfig;

pub const DIRECT_TAG: &str = "direct";
pub const NOISE_TAG: &str = "udp-noise";
pub const DNS_TAG: &str = "dns";

/// Configuration document consumed by the external tunnel engine
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct TunnelRunConfig {
    pub remarks: String,
    pub log: LogSection,
    pub dns: DnsSection,
    pub inbounds: Vec<Inbound>,
    pub outbounds: Vec<Outbound>,
    pub routing: Routing,
}

impl TunnelRunConfig {
    pub fn wireguard_outbounds(&self) -> impl Iterator<Item = &WireguardOutbound> {
        self.outbounds.iter().filter_map(|o| match o {
            Outbound::Wireguard(wg) => Some(wg),
            Outbound::Freedom(_) => None,
        })
    }

    pub fn outbound(&self, tag: &str) -> Option<&Outbound> {
        self.outbounds.iter().find(|o| o.tag() == tag)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LogSection {
    pub access: String,
    pub error: String,
    pub loglevel: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DnsSection {
    pub servers: Vec<String>,
    pub tag: String,
    pub query_strategy: QueryStrategy,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum QueryStrategy {
    UseIP,
    UseIPv4,
    UseIPv6,
}

/// Local forward-proxy entry point
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Inbound {
    pub protocol: String,
    pub listen: String,
    pub port: u16,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Outbound {
    Freedom(FreedomOutbound),
    Wireguard(WireguardOutbound),
}

impl Outbound {
    pub fn tag(&self) -> &str {
        match self {
            Outbound::Freedom(o) => &o.tag,
            Outbound::Wireguard(o) => &o.tag,
        }
    }
}

/// Direct (untunneled) egress, optionally emitting UDP noise
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FreedomOutbound {
    pub protocol: String,
    pub settings: FreedomSettings,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
pub struct FreedomSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noises: Option<Vec<NoiseConfig>>,
}

/// Tunnel-client egress towards one far-end peer
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireguardOutbound {
    pub protocol: String,
    pub settings: WireguardSettings,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_settings: Option<StreamSettings>,
    pub domain_strategy: DomainStrategy,
    pub tag: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireguardSettings {
    pub address: Vec<String>,
    pub mtu: u16,
    pub no_kernel_tun: bool,
    pub reserved: Vec<u8>,
    pub secret_key: String,
    pub peers: Vec<WireguardPeer>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WireguardPeer {
    pub endpoint: String,
    pub keep_alive: u32,
    pub public_key: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StreamSettings {
    pub sockopt: Sockopt,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Sockopt {
    pub dialer_proxy: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub enum DomainStrategy {
    ForceIPv4,
    ForceIPv6,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Routing {
    pub domain_strategy: String,
    pub rules: Vec<RoutingRule>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RoutingRule {
    pub inbound_tag: Vec<String>,
    pub outbound_tag: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl RoutingRule {
    pub fn field(inbound_tag: impl Into<String>, outbound_tag: impl Into<String>) -> Self {
        Self {
            inbound_tag: vec![inbound_tag.into()],
            outbound_tag: outbound_tag.into(),
            kind: "field".to_string(),
        }
    }
}
