use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::rngs::OsRng;
use std::fmt;
use x25519_dalek::{PublicKey, StaticSecret};

use crate::error::{BenchError, Result};

/// Base64-encoded X25519 keypair identifying the local tunnel client
#[derive(Clone, PartialEq, Eq)]
pub struct Keypair {
    pub private_key: String,
    pub public_key: String,
}

impl Keypair {
    pub fn generate() -> Self {
        Self::from_secret(&StaticSecret::random_from_rng(OsRng))
    }

    /// Rebuild the keypair of a base64 private key
    pub fn from_private_key(private_key: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(private_key.trim())
            .map_err(|e| BenchError::Provisioning(format!("invalid private_key: {e}")))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            BenchError::Provisioning(format!("private_key is {} bytes, expected 32", b.len()))
        })?;
        Ok(Self::from_secret(&StaticSecret::from(bytes)))
    }

    /// Keys for a registration: configured ones as given, a missing public
    /// key derived from the private one, nothing configured means a fresh pair
    pub fn resolve(private_key: &str, public_key: &str) -> Result<Self> {
        match (private_key.trim().is_empty(), public_key.trim().is_empty()) {
            (true, true) => Ok(Self::generate()),
            (false, true) => Self::from_private_key(private_key),
            (true, false) => Err(BenchError::MissingProvisioning("private_key")),
            (false, false) => Ok(Self {
                private_key: private_key.to_string(),
                public_key: public_key.to_string(),
            }),
        }
    }

    fn from_secret(secret: &StaticSecret) -> Self {
        let public = PublicKey::from(secret);
        Self {
            private_key: STANDARD.encode(secret.to_bytes()),
            public_key: STANDARD.encode(public.as_bytes()),
        }
    }
}

impl fmt::Debug for Keypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Keypair")
            .field("private_key", &"<redacted>")
            .field("public_key", &self.public_key)
            .finish()
    }
}
