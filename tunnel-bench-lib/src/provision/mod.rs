//! Tunnel peer parameters required to build egress definitions.

mod keys;
mod registration;

pub use keys::Keypair;
pub use registration::{RegistrationProvisioner, RegistrationResponse};

use std::future::Future;

use crate::config::{Config, PeerConfig};
use crate::error::{BenchError, Result};

/// Key material and addressing shared by every tunnel egress of a run
#[derive(Debug, Clone, PartialEq)]
pub struct EgressParams {
    pub private_key: String,
    pub peer_public_key: String,
    pub addresses: Vec<String>,
    pub reserved: Vec<u8>,
    pub mtu: u16,
    pub keep_alive_secs: u32,
}

impl EgressParams {
    /// Reject parameters that cannot produce a working egress
    pub fn validate(&self) -> Result<()> {
        if self.private_key.trim().is_empty() {
            return Err(BenchError::MissingProvisioning("private_key"));
        }
        if self.peer_public_key.trim().is_empty() {
            return Err(BenchError::MissingProvisioning("peer_public_key"));
        }
        if self.addresses.is_empty() {
            return Err(BenchError::MissingProvisioning("addresses"));
        }
        Ok(())
    }
}

impl From<&PeerConfig> for EgressParams {
    fn from(peer: &PeerConfig) -> Self {
        Self {
            private_key: peer.private_key.clone(),
            peer_public_key: peer.peer_public_key.clone(),
            addresses: peer.addresses.clone(),
            reserved: peer.reserved.clone(),
            mtu: peer.mtu,
            keep_alive_secs: peer.keep_alive_secs,
        }
    }
}

/// Source of egress parameters for a run
pub trait Provisioner {
    fn provision(&self) -> impl Future<Output = Result<EgressParams>> + Send;
}

/// Parameters taken verbatim from the `[peer]` configuration section
#[derive(Debug, Clone)]
pub struct StaticProvisioner {
    params: EgressParams,
}

impl StaticProvisioner {
    pub fn new(params: EgressParams) -> Self {
        Self { params }
    }
}

impl Provisioner for StaticProvisioner {
    async fn provision(&self) -> Result<EgressParams> {
        self.params.validate()?;
        Ok(self.params.clone())
    }
}

/// Provisioner selected from configuration: `[peer]` wins over `[registration]`
#[derive(Debug, Clone)]
pub enum ConfiguredProvisioner {
    Static(StaticProvisioner),
    Registration(RegistrationProvisioner),
}

impl ConfiguredProvisioner {
    pub fn from_config(config: &Config) -> Result<Self> {
        if let Some(peer) = &config.peer {
            return Ok(Self::Static(StaticProvisioner::new(EgressParams::from(peer))));
        }
        if let Some(registration) = &config.registration {
            return Ok(Self::Registration(RegistrationProvisioner::new(registration.clone())?));
        }
        Err(BenchError::Provisioning(
            "neither [peer] nor [registration] is configured".to_string(),
        ))
    }
}

impl Provisioner for ConfiguredProvisioner {
    async fn provision(&self) -> Result<EgressParams> {
        match self {
            Self::Static(p) => p.provision().await,
            Self::Registration(p) => p.provision().await,
        }
    }
}
