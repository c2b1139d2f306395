//! Wallet signing capability.
//!
//! The flow orchestrator only depends on the [`WalletSigner`] trait; the
//! wallet itself is an external capability. [`KeystoreSigner`] is the
//! built-in implementation over a local ed25519 keystore file.

use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signer as DalekSigner, SigningKey, SECRET_KEY_LENGTH};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

/// Signs sponsor-returned payloads on behalf of the user.
///
/// User rejection, an unavailable wallet, and an empty signature all surface
/// as [`Error::Signing`]; the flow never proceeds to submission without a
/// non-empty signature.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// The sender address this wallet signs for.
    fn address(&self) -> &str;

    /// Sign the base64 payload, returning a base64 signature.
    async fn sign(&self, payload_b64: &str) -> Result<String>;
}

/// Keystore file format: the key material persisted as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Keystore {
    pub address: String,
    pub public_key: String,
    private_key: String,
    pub created_at: String,
}

impl Keystore {
    /// Generate a fresh ed25519 keystore.
    pub fn generate() -> Self {
        let mut secret = [0u8; SECRET_KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut secret);
        let signing_key = SigningKey::from_bytes(&secret);
        let verifying_key = signing_key.verifying_key();

        Keystore {
            address: derive_address(verifying_key.as_bytes()),
            public_key: hex::encode(verifying_key.to_bytes()),
            private_key: hex::encode(signing_key.to_bytes()),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|e| Error::Signing(format!("failed to read keystore: {e}")))?;
        serde_json::from_str(&raw).map_err(|e| Error::Signing(format!("invalid keystore: {e}")))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Signing(format!("failed to encode keystore: {e}")))?;
        fs::write(path, raw).map_err(|e| Error::Signing(format!("failed to write keystore: {e}")))
    }

    fn signing_key(&self) -> Result<SigningKey> {
        let bytes = hex::decode(&self.private_key)
            .map_err(|e| Error::Signing(format!("invalid private key: {e}")))?;
        let secret: [u8; SECRET_KEY_LENGTH] = bytes
            .try_into()
            .map_err(|_| Error::Signing("private key has wrong length".into()))?;
        Ok(SigningKey::from_bytes(&secret))
    }
}

/// Addresses are the 0x-prefixed SHA-256 of the public key.
fn derive_address(public_key: &[u8]) -> String {
    let digest = Sha256::digest(public_key);
    format!("0x{}", hex::encode(digest))
}

/// Signer backed by a local [`Keystore`].
pub struct KeystoreSigner {
    address: String,
    signing_key: SigningKey,
}

impl KeystoreSigner {
    pub fn new(keystore: &Keystore) -> Result<Self> {
        Ok(Self {
            address: keystore.address.clone(),
            signing_key: keystore.signing_key()?,
        })
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        Self::new(&Keystore::load(path)?)
    }
}

#[async_trait]
impl WalletSigner for KeystoreSigner {
    fn address(&self) -> &str {
        &self.address
    }

    async fn sign(&self, payload_b64: &str) -> Result<String> {
        let payload = BASE64
            .decode(payload_b64)
            .map_err(|e| Error::Signing(format!("payload is not valid base64: {e}")))?;
        if payload.is_empty() {
            return Err(Error::Signing("payload is empty".into()));
        }
        let signature = self.signing_key.sign(&payload);
        Ok(BASE64.encode(signature.to_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn generated_keystore_has_hex_address() {
        let keystore = Keystore::generate();
        assert!(keystore.address.starts_with("0x"));
        assert_eq!(keystore.address.len(), 66);
    }

    #[test]
    fn keystore_round_trips_through_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("keystore.json");

        let keystore = Keystore::generate();
        keystore.save(&path).unwrap();
        let loaded = Keystore::load(&path).unwrap();

        assert_eq!(loaded.address, keystore.address);
        assert_eq!(loaded.public_key, keystore.public_key);
    }

    #[tokio::test]
    async fn signing_produces_nonempty_base64() {
        let keystore = Keystore::generate();
        let signer = KeystoreSigner::new(&keystore).unwrap();

        let payload = BASE64.encode(b"sponsored payload bytes");
        let signature = signer.sign(&payload).await.unwrap();

        assert!(!signature.is_empty());
        // ed25519 signatures are 64 bytes.
        assert_eq!(BASE64.decode(&signature).unwrap().len(), 64);
    }

    #[tokio::test]
    async fn signing_rejects_bad_payloads() {
        let keystore = Keystore::generate();
        let signer = KeystoreSigner::new(&keystore).unwrap();

        assert!(matches!(
            signer.sign("not base64 !!").await,
            Err(Error::Signing(_))
        ));
        assert!(matches!(signer.sign("").await, Err(Error::Signing(_))));
    }
}
