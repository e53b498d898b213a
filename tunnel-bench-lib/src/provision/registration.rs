use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use reqwest::header::{CONTENT_TYPE, USER_AGENT};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, info};

use super::{EgressParams, Keypair, Provisioner};
use crate::config::RegistrationConfig;
use crate::error::{BenchError, Result};

/// IPv4 interface address the registration service hands every client
const CLIENT_IPV4_ADDRESS: &str = "172.16.0.2/32";

#[derive(Debug, Deserialize)]
pub struct RegistrationResponse {
    pub config: RegisteredConfig,
}

#[derive(Debug, Deserialize)]
pub struct RegisteredConfig {
    pub interface: RegisteredInterface,
    pub client_id: String,
    pub peers: Vec<RegisteredPeer>,
}

#[derive(Debug, Deserialize)]
pub struct RegisteredInterface {
    pub addresses: RegisteredAddresses,
}

#[derive(Debug, Deserialize)]
pub struct RegisteredAddresses {
    pub v6: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisteredPeer {
    pub public_key: String,
}

/// Registers the local public key and derives egress parameters from the
/// service's answer
#[derive(Debug, Clone)]
pub struct RegistrationProvisioner {
    config: RegistrationConfig,
    keys: Keypair,
}

impl RegistrationProvisioner {
    /// Fails when only a public key is configured or the private key is not
    /// a base64 X25519 key
    pub fn new(config: RegistrationConfig) -> Result<Self> {
        let generate = config.private_key.trim().is_empty() && config.public_key.trim().is_empty();
        let keys = Keypair::resolve(&config.private_key, &config.public_key)?;
        if generate {
            info!(public_key = %keys.public_key, "generated tunnel client keypair");
        }
        Ok(Self { config, keys })
    }

    pub fn keys(&self) -> &Keypair {
        &self.keys
    }

    async fn register(&self) -> Result<RegistrationResponse> {
        let client = Client::builder()
            .timeout(Duration::from_millis(self.config.timeout_ms))
            .build()
            .map_err(|e| BenchError::Provisioning(format!("client setup failed: {e}")))?;

        let payload = json!({
            "install_id": "",
            "fcm_token": "",
            "tos": Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string(),
            "type": "Android",
            "model": "PC",
            "locale": "en_US",
            "warp_enabled": true,
            "key": self.keys.public_key,
        });

        debug!(url = %self.config.url, "registering tunnel client");
        let resp = client
            .post(&self.config.url)
            .header(USER_AGENT, &self.config.user_agent)
            .header(CONTENT_TYPE, "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| BenchError::Provisioning(format!("registration request failed: {e}")))?;

        let status = resp.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(BenchError::Provisioning(format!("registration returned {status}")));
        }

        resp.json::<RegistrationResponse>()
            .await
            .map_err(|e| BenchError::Provisioning(format!("invalid registration response: {e}")))
    }

    /// Turn a registration answer into egress parameters for the local keypair
    pub fn params_from_response(&self, response: RegistrationResponse) -> Result<EgressParams> {
        let RegisteredConfig { interface, client_id, peers } = response.config;
        let reserved = STANDARD
            .decode(client_id.as_bytes())
            .map_err(|e| BenchError::Provisioning(format!("invalid client_id: {e}")))?;
        let peer = peers
            .into_iter()
            .next()
            .ok_or_else(|| BenchError::Provisioning("response lists no peers".to_string()))?;

        let params = EgressParams {
            private_key: self.keys.private_key.clone(),
            peer_public_key: peer.public_key,
            addresses: vec![
                CLIENT_IPV4_ADDRESS.to_string(),
                format!("{}/128", interface.addresses.v6),
            ],
            reserved,
            mtu: self.config.mtu,
            keep_alive_secs: self.config.keep_alive_secs,
        };
        params.validate()?;
        Ok(params)
    }
}

impl Provisioner for RegistrationProvisioner {
    async fn provision(&self) -> Result<EgressParams> {
        let response = self.register().await?;
        let params = self.params_from_response(response)?;
        info!(addresses = ?params.addresses, "registered tunnel client");
        Ok(params)
    }
}
