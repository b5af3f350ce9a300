//! Ed25519 keypairs in Solana's 64-byte layout

use ed25519_dalek::SigningKey;
use thiserror::Error;

/// Length of a Solana keypair file / byte array (secret ‖ public)
pub const KEYPAIR_LENGTH: usize = ed25519_dalek::KEYPAIR_LENGTH;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Ed25519Error {
    #[error("Keypair must be 64 bytes, got {0}")]
    InvalidLength(usize),
    #[error("Public half does not belong to the secret half")]
    MismatchedPublicKey,
}

/// An Ed25519 keypair as written by `solana-keygen`
#[derive(Clone)]
pub struct Ed25519Keypair {
    signing_key: SigningKey,
}

impl Ed25519Keypair {
    /// Create from raw 32-byte seed (private key)
    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: SigningKey::from_bytes(seed),
        }
    }

    /// Parse the 64-byte layout, checking the public half against the secret
    pub fn from_keypair_bytes(bytes: &[u8]) -> Result<Self, Ed25519Error> {
        let bytes: &[u8; KEYPAIR_LENGTH] = bytes
            .try_into()
            .map_err(|_| Ed25519Error::InvalidLength(bytes.len()))?;
        let signing_key =
            SigningKey::from_keypair_bytes(bytes).map_err(|_| Ed25519Error::MismatchedPublicKey)?;
        Ok(Self { signing_key })
    }

    /// Get the full keypair bytes (64 bytes: privkey || pubkey) - Solana format
    pub fn keypair_bytes(&self) -> [u8; KEYPAIR_LENGTH] {
        self.signing_key.to_keypair_bytes()
    }

    /// Get the public key as bytes (32 bytes)
    pub fn public_key_bytes(&self) -> [u8; 32] {
        self.signing_key.verifying_key().to_bytes()
    }
}
