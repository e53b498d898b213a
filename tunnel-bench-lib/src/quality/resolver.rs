use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use std::io;
use std::net::SocketAddr;
use tokio::net::lookup_host;
use tracing::trace;

use crate::endpoint::AddressFamily;

/// DNS resolver that only yields addresses of one family.
///
/// Used by the quality prober so that an IPv6 probe never silently falls
/// back to IPv4 (and vice versa).
#[derive(Debug, Clone, Copy)]
pub struct FamilyResolver {
    family: AddressFamily,
}

impl FamilyResolver {
    pub fn new(family: AddressFamily) -> Self {
        Self { family }
    }

    pub async fn lookup(&self, host: &str) -> io::Result<Vec<SocketAddr>> {
        let addrs: Vec<SocketAddr> = lookup_host((host, 0))
            .await?
            .filter(|addr| self.family.matches(&addr.ip()))
            .collect();
        if addrs.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::NotFound,
                format!("no {} address found for {host}", self.family),
            ));
        }
        trace!(host, family = %self.family, count = addrs.len(), "resolved");
        Ok(addrs)
    }
}

impl Resolve for FamilyResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = *self;
        Box::pin(async move {
            let addrs = resolver.lookup(name.as_str()).await?;
            let addrs: Addrs = Box::new(addrs.into_iter());
            Ok::<_, Box<dyn std::error::Error + Send + Sync>>(addrs)
        })
    }
}
