use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::HashSet;
use std::fs;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr};
use std::path::Path;
use tracing::{debug, warn};

use super::{AddressFamily, Endpoint, FamilyMode};
use crate::error::{BenchError, Result};

/// /24 networks sampled for IPv4 candidates (last octet is random)
pub const DEFAULT_IPV4_PREFIXES: &[Ipv4Addr] = &[
    Ipv4Addr::new(188, 114, 96, 0),
    Ipv4Addr::new(188, 114, 97, 0),
    Ipv4Addr::new(188, 114, 98, 0),
    Ipv4Addr::new(188, 114, 99, 0),
    Ipv4Addr::new(162, 159, 192, 0),
    Ipv4Addr::new(162, 159, 193, 0),
    Ipv4Addr::new(162, 159, 195, 0),
];

/// /64 networks sampled for IPv6 candidates (interface identifier is random)
pub const DEFAULT_IPV6_PREFIXES: &[Ipv6Addr] = &[
    Ipv6Addr::new(0x2606, 0x4700, 0xd0, 0, 0, 0, 0, 0),
    Ipv6Addr::new(0x2606, 0x4700, 0xd1, 0, 0, 0, 0, 0),
];

/// Ports the far-end peers accept tunnel handshakes on
pub const DEFAULT_PORTS: &[u16] = &[
    500, 854, 859, 864, 878, 880, 890, 891, 894, 903, 908, 928, 934, 939, 942, 943, 945, 946, 955,
    968, 987, 988, 1002, 1010, 1014, 1018, 1070, 1074, 1180, 1387, 1701, 1843, 2371, 2408, 2506,
    3138, 3476, 3581, 3854, 4177, 4198, 4233, 4500, 5279, 5956, 7103, 7152, 7156, 7281, 7559,
    8319, 8742, 8854, 8886,
];

/// Uniform random sampler of candidate endpoints
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    ipv4_prefixes: Vec<Ipv4Addr>,
    ipv6_prefixes: Vec<Ipv6Addr>,
    ports: Vec<u16>,
}

impl Default for CandidateGenerator {
    fn default() -> Self {
        Self::new(
            DEFAULT_IPV4_PREFIXES.to_vec(),
            DEFAULT_IPV6_PREFIXES.to_vec(),
            DEFAULT_PORTS.to_vec(),
        )
    }
}

impl CandidateGenerator {
    pub fn new(
        ipv4_prefixes: Vec<Ipv4Addr>,
        ipv6_prefixes: Vec<Ipv6Addr>,
        ports: Vec<u16>,
    ) -> Self {
        Self { ipv4_prefixes, ipv6_prefixes, ports }
    }

    /// Number of distinct endpoints this generator can produce for a family
    pub fn capacity(&self, family: AddressFamily) -> usize {
        let per_prefix: usize = match family {
            AddressFamily::Ipv4 => 256,
            // 2^64 identifiers per prefix; anything past usize is unlimited in practice
            AddressFamily::Ipv6 => usize::MAX,
        };
        let prefixes = match family {
            AddressFamily::Ipv4 => self.ipv4_prefixes.len(),
            AddressFamily::Ipv6 => self.ipv6_prefixes.len(),
        };
        per_prefix.saturating_mul(prefixes).saturating_mul(self.ports.len())
    }

    /// Per-family endpoint count of an exhaustive scan: every host of the
    /// IPv4 networks, and 65536 hosts per IPv6 network since those cannot be
    /// walked. With `Both`, the smaller family's count so both halves stay
    /// the same size.
    pub fn full_scan_count(&self, mode: FamilyMode) -> usize {
        mode.families()
            .iter()
            .map(|&family| {
                let (prefixes, hosts) = match family {
                    AddressFamily::Ipv4 => (self.ipv4_prefixes.len(), 256usize),
                    AddressFamily::Ipv6 => (self.ipv6_prefixes.len(), 65536usize),
                };
                prefixes.saturating_mul(hosts).min(self.capacity(family))
            })
            .min()
            .unwrap_or(0)
    }

    /// Sample `count` unique endpoints per scanned family.
    ///
    /// With `FamilyMode::Both` the IPv4 candidates come first, followed by
    /// the same number of IPv6 candidates, so the positional half split
    /// applied by the configuration builder lines up with the families.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        mode: FamilyMode,
        count: usize,
        rng: &mut R,
    ) -> Vec<Endpoint> {
        let mut out = Vec::new();
        for &family in mode.families() {
            out.extend(self.generate_family(family, count, rng));
        }
        out
    }

    fn generate_family<R: Rng + ?Sized>(
        &self,
        family: AddressFamily,
        count: usize,
        rng: &mut R,
    ) -> Vec<Endpoint> {
        let capacity = self.capacity(family);
        let target = if count > capacity {
            warn!(
                %family,
                requested = count,
                available = capacity,
                "candidate range too small, capping endpoint count"
            );
            capacity
        } else {
            count
        };

        let mut seen = HashSet::with_capacity(target);
        let mut out = Vec::with_capacity(target);
        while out.len() < target {
            let Some(addr) = self.sample(family, rng) else {
                break;
            };
            if seen.insert(addr) {
                out.push(Endpoint::from_socket(addr));
            }
        }
        debug!(%family, generated = out.len(), "candidate endpoints generated");
        out
    }

    fn sample<R: Rng + ?Sized>(&self, family: AddressFamily, rng: &mut R) -> Option<SocketAddr> {
        let port = *self.ports.choose(rng)?;
        let ip = match family {
            AddressFamily::Ipv4 => {
                let [a, b, c, _] = self.ipv4_prefixes.choose(rng)?.octets();
                Ipv4Addr::new(a, b, c, rng.gen()).into()
            }
            AddressFamily::Ipv6 => {
                let s = self.ipv6_prefixes.choose(rng)?.segments();
                Ipv6Addr::new(s[0], s[1], s[2], s[3], rng.gen(), rng.gen(), rng.gen(), rng.gen())
                    .into()
            }
        };
        Some(SocketAddr::new(ip, port))
    }
}

/// Load endpoints from a text file, one `address:port` per line.
///
/// Blank lines and `#` comments are skipped; duplicates keep their first position.
pub fn load_endpoints<P: AsRef<Path>>(path: P) -> Result<Vec<Endpoint>> {
    let txt = fs::read_to_string(path)?;
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (lineno, line) in txt.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let endpoint: Endpoint = line.parse().map_err(|e| {
            BenchError::InvalidEndpoint(format!("line {}: {e}", lineno.saturating_add(1)))
        })?;
        if seen.insert(endpoint.clone()) {
            out.push(endpoint);
        }
    }
    Ok(out)
}
