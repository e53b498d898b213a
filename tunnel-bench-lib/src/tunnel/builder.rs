use tracing::debug;

use super::document::{
    DnsSection, DomainStrategy, FreedomOutbound, FreedomSettings, Inbound, LogSection, Outbound,
    QueryStrategy, Routing, RoutingRule, Sockopt, StreamSettings, TunnelRunConfig,
    WireguardOutbound, WireguardPeer, WireguardSettings, DIRECT_TAG, DNS_TAG, NOISE_TAG,
};
use super::ports::PortAllocator;
use crate::config::{Config, NoiseConfig};
use crate::endpoint::{AddressFamily, Endpoint, FamilyMode};
use crate::error::Result;
use crate::provision::EgressParams;

/// Knobs of the configuration builder that do not come from provisioning
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub mode: FamilyMode,
    pub ports: PortAllocator,
    pub listen: String,
    pub noise: Option<NoiseConfig>,
    pub dns_server: String,
    pub log: LogSection,
}

impl BuildOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            mode: config.scan.family,
            ports: PortAllocator::new(config.scan.base_port, config.scan.max_port),
            listen: config.probe.proxy_host.clone(),
            noise: config.noise.clone(),
            dns_server: config.engine.dns_server.clone(),
            log: LogSection {
                access: config.engine.access_log.clone(),
                error: config.engine.error_log.clone(),
                loglevel: config.engine.log_level.clone(),
            },
        }
    }
}

/// Where one endpoint is reachable locally, and which family it is forced to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointSlot {
    pub index: usize,
    pub endpoint: Endpoint,
    pub port: u16,
    pub family: AddressFamily,
}

/// Engine document plus the per-endpoint slots it defines
#[derive(Debug, Clone, PartialEq)]
pub struct TunnelPlan {
    pub config: TunnelRunConfig,
    pub slots: Vec<EndpointSlot>,
}

pub fn inbound_tag(index: usize) -> String {
    format!("http-in-{}", index.saturating_add(1))
}

pub fn outbound_tag(index: usize) -> String {
    format!("proxy-{}", index.saturating_add(1))
}

/// Build the engine configuration for an ordered endpoint list.
///
/// Endpoint `i` gets a dedicated HTTP ingress on `base_port + i`, a tunnel
/// egress to that endpoint, and a rule joining the two. A `direct` egress is
/// always present. Fails only on missing provisioning parameters or when the
/// endpoints do not fit the port range.
pub fn build_config(
    endpoints: &[Endpoint],
    params: &EgressParams,
    options: &BuildOptions,
) -> Result<TunnelPlan> {
    build_batch_config(endpoints, 0, endpoints.len(), params, options)
}

/// Same as [`build_config`] for one slice of a larger scan.
///
/// Ports and tags restart at the batch start, while the forced family follows
/// the endpoint's position `offset + i` within a scan of `total` endpoints.
pub fn build_batch_config(
    endpoints: &[Endpoint],
    offset: usize,
    total: usize,
    params: &EgressParams,
    options: &BuildOptions,
) -> Result<TunnelPlan> {
    params.validate()?;
    let ports = options.ports.allocate(endpoints.len())?;

    let mut outbounds = vec![Outbound::Freedom(FreedomOutbound {
        protocol: "freedom".to_string(),
        settings: FreedomSettings::default(),
        tag: DIRECT_TAG.to_string(),
    })];

    let stream_settings = options.noise.as_ref().map(|noise| {
        let count = usize::try_from(noise.count).unwrap_or(usize::MAX);
        outbounds.push(Outbound::Freedom(FreedomOutbound {
            protocol: "freedom".to_string(),
            settings: FreedomSettings { noises: Some(vec![noise.clone(); count]) },
            tag: NOISE_TAG.to_string(),
        }));
        StreamSettings { sockopt: Sockopt { dialer_proxy: NOISE_TAG.to_string() } }
    });

    let mut inbounds = Vec::with_capacity(endpoints.len());
    let mut rules = Vec::with_capacity(endpoints.len().saturating_add(1));
    let mut slots = Vec::with_capacity(endpoints.len());
    rules.push(RoutingRule::field(DNS_TAG, DIRECT_TAG));

    for ((index, endpoint), port) in endpoints.iter().enumerate().zip(ports) {
        let family = options.mode.family_at(offset.saturating_add(index), total);

        inbounds.push(Inbound {
            protocol: "http".to_string(),
            listen: options.listen.clone(),
            port,
            tag: inbound_tag(index),
        });
        outbounds.push(Outbound::Wireguard(wireguard_outbound(
            index,
            endpoint,
            family,
            params,
            stream_settings.clone(),
        )));
        rules.push(RoutingRule::field(inbound_tag(index), outbound_tag(index)));
        slots.push(EndpointSlot { index, endpoint: endpoint.clone(), port, family });
    }

    let config = TunnelRunConfig {
        remarks: "tunnel-bench".to_string(),
        log: options.log.clone(),
        dns: DnsSection {
            servers: vec![options.dns_server.clone()],
            tag: DNS_TAG.to_string(),
            query_strategy: query_strategy(options.mode),
        },
        inbounds,
        outbounds,
        routing: Routing { domain_strategy: "AsIs".to_string(), rules },
    };

    debug!(
        endpoints = slots.len(),
        base_port = options.ports.base(),
        noise = options.noise.is_some(),
        "tunnel configuration built"
    );
    Ok(TunnelPlan { config, slots })
}

fn wireguard_outbound(
    index: usize,
    endpoint: &Endpoint,
    family: AddressFamily,
    params: &EgressParams,
    stream_settings: Option<StreamSettings>,
) -> WireguardOutbound {
    WireguardOutbound {
        protocol: "wireguard".to_string(),
        settings: WireguardSettings {
            address: params.addresses.clone(),
            mtu: params.mtu,
            no_kernel_tun: true,
            reserved: params.reserved.clone(),
            secret_key: params.private_key.clone(),
            peers: vec![WireguardPeer {
                endpoint: endpoint.to_string(),
                keep_alive: params.keep_alive_secs,
                public_key: params.peer_public_key.clone(),
            }],
        },
        stream_settings,
        domain_strategy: match family {
            AddressFamily::Ipv4 => DomainStrategy::ForceIPv4,
            AddressFamily::Ipv6 => DomainStrategy::ForceIPv6,
        },
        tag: outbound_tag(index),
    }
}

fn query_strategy(mode: FamilyMode) -> QueryStrategy {
    match mode {
        FamilyMode::Ipv4 => QueryStrategy::UseIPv4,
        FamilyMode::Ipv6 => QueryStrategy::UseIPv6,
        FamilyMode::Both => QueryStrategy::UseIP,
    }
}
