mod generator;

pub use generator::{
    load_endpoints, CandidateGenerator, DEFAULT_IPV4_PREFIXES, DEFAULT_IPV6_PREFIXES,
    DEFAULT_PORTS,
};

use serde::Deserialize;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use crate::error::BenchError;

/// IP address family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    pub fn matches(self, ip: &IpAddr) -> bool {
        match self {
            AddressFamily::Ipv4 => ip.is_ipv4(),
            AddressFamily::Ipv6 => ip.is_ipv6(),
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => f.write_str("IPv4"),
            AddressFamily::Ipv6 => f.write_str("IPv6"),
        }
    }
}

/// Which address families a run scans
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FamilyMode {
    #[default]
    Ipv4,
    Ipv6,
    Both,
}

impl FamilyMode {
    /// Families that need a quality probe, in probing order
    pub fn families(self) -> &'static [AddressFamily] {
        match self {
            FamilyMode::Ipv4 => &[AddressFamily::Ipv4],
            FamilyMode::Ipv6 => &[AddressFamily::Ipv6],
            FamilyMode::Both => &[AddressFamily::Ipv4, AddressFamily::Ipv6],
        }
    }

    /// Family an endpoint at `index` out of `count` is steered to.
    ///
    /// With `Both`, the list is split by position: the first half is IPv4,
    /// the rest IPv6.
    pub fn family_at(self, index: usize, count: usize) -> AddressFamily {
        match self {
            FamilyMode::Ipv4 => AddressFamily::Ipv4,
            FamilyMode::Ipv6 => AddressFamily::Ipv6,
            FamilyMode::Both if index < count / 2 => AddressFamily::Ipv4,
            FamilyMode::Both => AddressFamily::Ipv6,
        }
    }
}

/// A candidate far-end tunnel peer, `address:port`
///
/// IPv6 addresses are bracketed. Identity is the textual form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    raw: String,
    port: u16,
    family: Option<AddressFamily>,
}

impl Endpoint {
    pub(crate) fn from_socket(addr: SocketAddr) -> Self {
        Self { raw: addr.to_string(), port: addr.port(), family: Some(family_of(&addr)) }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Family of the address, `None` for host names
    pub fn family(&self) -> Option<AddressFamily> {
        self.family
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl FromStr for Endpoint {
    type Err = BenchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(addr) = s.parse::<SocketAddr>() {
            return Ok(Self {
                raw: s.to_string(),
                port: addr.port(),
                family: Some(family_of(&addr)),
            });
        }

        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| BenchError::InvalidEndpoint(format!("{s}: missing port")))?;
        if host.is_empty() || host.contains(':') || host.contains('[') {
            return Err(BenchError::InvalidEndpoint(format!("{s}: invalid host")));
        }
        let port = port
            .parse::<u16>()
            .map_err(|e| BenchError::InvalidEndpoint(format!("{s}: invalid port: {e}")))?;

        Ok(Self { raw: s.to_string(), port, family: None })
    }
}

fn family_of(addr: &SocketAddr) -> AddressFamily {
    if addr.is_ipv4() {
        AddressFamily::Ipv4
    } else {
        AddressFamily::Ipv6
    }
}
