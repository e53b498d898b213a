mod helpers;

use std::collections::HashSet;

use helpers::{sample_endpoints, sample_params, TestResult};
use tunnel_bench_lib::config::{Config, NoiseConfig};
use tunnel_bench_lib::tunnel::document::{DomainStrategy, Outbound, QueryStrategy};
use tunnel_bench_lib::tunnel::{
    build_batch_config, build_config, inbound_tag, outbound_tag, BuildOptions, PortAllocator,
};
use tunnel_bench_lib::{AddressFamily, BenchError, FamilyMode};

fn options(mode: FamilyMode) -> BuildOptions {
    let mut cfg = Config::default();
    cfg.scan.family = mode;
    BuildOptions::from_config(&cfg)
}

#[test]
fn one_ingress_egress_and_rule_per_endpoint() -> TestResult<()> {
    let endpoints = sample_endpoints(4)?;
    let plan = build_config(&endpoints, &sample_params(), &options(FamilyMode::Ipv4))?;
    let doc = &plan.config;

    assert_eq!(doc.inbounds.len(), 4);
    assert_eq!(doc.wireguard_outbounds().count(), 4);
    // dns rule plus one per endpoint
    assert_eq!(doc.routing.rules.len(), 5);
    assert!(doc.outbound("direct").is_some());

    for (i, endpoint) in endpoints.iter().enumerate() {
        let inbound = &doc.inbounds[i];
        assert_eq!(inbound.port, 1080 + i as u16);
        assert_eq!(inbound.tag, inbound_tag(i));
        assert_eq!(inbound.listen, "127.0.0.1");
        assert_eq!(inbound.protocol, "http");

        let Some(Outbound::Wireguard(egress)) = doc.outbound(&outbound_tag(i)) else {
            return Err(format!("missing egress {i}").into());
        };
        assert_eq!(egress.settings.peers.len(), 1);
        assert_eq!(egress.settings.peers[0].endpoint, endpoint.to_string());
        assert!(egress.settings.no_kernel_tun);
        assert_eq!(egress.settings.mtu, 1280);
        assert_eq!(egress.domain_strategy, DomainStrategy::ForceIPv4);
        assert!(egress.stream_settings.is_none());

        let rule = doc
            .routing
            .rules
            .iter()
            .find(|r| r.inbound_tag == vec![inbound_tag(i)])
            .ok_or("missing rule")?;
        assert_eq!(rule.outbound_tag, outbound_tag(i));
        assert_eq!(rule.kind, "field");

        assert_eq!(plan.slots[i].port, inbound.port);
        assert_eq!(&plan.slots[i].endpoint, endpoint);
    }

    let ports: HashSet<u16> = doc.inbounds.iter().map(|i| i.port).collect();
    assert_eq!(ports.len(), 4);
    assert_eq!(doc.dns.query_strategy, QueryStrategy::UseIPv4);
    Ok(())
}

#[test]
fn serializes_engine_field_names() -> TestResult<()> {
    let endpoints = sample_endpoints(1)?;
    let plan = build_config(&endpoints, &sample_params(), &options(FamilyMode::Ipv6))?;
    let json = serde_json::to_value(&plan.config)?;

    assert_eq!(json["dns"]["queryStrategy"], "UseIPv6");
    assert_eq!(json["routing"]["domainStrategy"], "AsIs");
    assert_eq!(json["routing"]["rules"][0]["inboundTag"][0], "dns");
    assert_eq!(json["routing"]["rules"][0]["type"], "field");

    let wg = &json["outbounds"][1];
    assert_eq!(wg["protocol"], "wireguard");
    assert_eq!(wg["domainStrategy"], "ForceIPv6");
    assert_eq!(wg["settings"]["noKernelTun"], true);
    assert_eq!(wg["settings"]["secretKey"], sample_params().private_key);
    assert_eq!(wg["settings"]["peers"][0]["keepAlive"], 5);
    assert_eq!(wg["settings"]["reserved"][0], 78);
    assert!(wg.get("streamSettings").is_none());
    Ok(())
}

#[test]
fn noise_adds_one_egress_and_dialer_proxy() -> TestResult<()> {
    let endpoints = sample_endpoints(3)?;
    let mut opts = options(FamilyMode::Ipv4);
    opts.noise = Some(NoiseConfig { count: 5, ..NoiseConfig::default() });
    let plan = build_config(&endpoints, &sample_params(), &opts)?;

    let Some(Outbound::Freedom(noise)) = plan.config.outbound("udp-noise") else {
        return Err("missing noise egress".into());
    };
    assert_eq!(noise.settings.noises.as_ref().map(Vec::len), Some(5));
    // direct + noise + three tunnels
    assert_eq!(plan.config.outbounds.len(), 5);
    for egress in plan.config.wireguard_outbounds() {
        let dialer = egress.stream_settings.as_ref().map(|s| s.sockopt.dialer_proxy.as_str());
        assert_eq!(dialer, Some("udp-noise"));
    }

    let json = serde_json::to_value(&plan.config)?;
    let noise_json = &json["outbounds"][1]["settings"]["noises"][0];
    assert_eq!(noise_json["type"], "rand");
    assert!(noise_json.get("count").is_none());
    Ok(())
}

#[test]
fn both_mode_splits_by_position() -> TestResult<()> {
    let endpoints = sample_endpoints(5)?;
    let plan = build_config(&endpoints, &sample_params(), &options(FamilyMode::Both))?;

    let families: Vec<AddressFamily> = plan.slots.iter().map(|s| s.family).collect();
    assert_eq!(
        families,
        vec![
            AddressFamily::Ipv4,
            AddressFamily::Ipv4,
            AddressFamily::Ipv6,
            AddressFamily::Ipv6,
            AddressFamily::Ipv6,
        ]
    );
    assert_eq!(plan.config.dns.query_strategy, QueryStrategy::UseIP);
    Ok(())
}

#[test]
fn batches_restart_ports_but_keep_global_families() -> TestResult<()> {
    let endpoints = sample_endpoints(4)?;
    let opts = options(FamilyMode::Both);
    let second = build_batch_config(&endpoints[2..], 2, 4, &sample_params(), &opts)?;

    assert_eq!(second.slots[0].port, 1080);
    assert_eq!(second.slots[0].index, 0);
    assert_eq!(second.config.inbounds[0].tag, "http-in-1");
    assert!(second.slots.iter().all(|s| s.family == AddressFamily::Ipv6));
    Ok(())
}

#[test]
fn empty_list_has_only_direct_egress() -> TestResult<()> {
    let plan = build_config(&[], &sample_params(), &options(FamilyMode::Ipv4))?;
    assert!(plan.config.inbounds.is_empty());
    assert_eq!(plan.config.outbounds.len(), 1);
    assert_eq!(plan.config.outbounds[0].tag(), "direct");
    assert_eq!(plan.config.routing.rules.len(), 1);
    Ok(())
}

#[test]
fn port_range_exhaustion_is_an_error() -> TestResult<()> {
    let endpoints = sample_endpoints(3)?;
    let mut opts = options(FamilyMode::Ipv4);
    opts.ports = PortAllocator::new(65534, u16::MAX);

    let result = build_config(&endpoints, &sample_params(), &opts);
    assert!(matches!(
        result,
        Err(BenchError::PortRangeExhausted { requested: 3, available: 2 })
    ));
    Ok(())
}

#[test]
fn missing_parameters_are_rejected() -> TestResult<()> {
    let endpoints = sample_endpoints(1)?;
    let mut params = sample_params();
    params.peer_public_key.clear();

    let result = build_config(&endpoints, &params, &options(FamilyMode::Ipv4));
    assert!(matches!(result, Err(BenchError::MissingProvisioning("peer_public_key"))));
    Ok(())
}
