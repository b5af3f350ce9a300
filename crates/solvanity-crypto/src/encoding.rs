//! Base-58 encoding of keypair material for the wire

use thiserror::Error;

use crate::ed25519::{Ed25519Error, Ed25519Keypair};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("Key material is empty")]
    Empty,
    #[error("Invalid key material: {0}")]
    Keypair(#[from] Ed25519Error),
    #[error("Invalid character in base-58 input")]
    InvalidCharacter,
}

/// Base58 encode (Solana style, no checksum)
pub fn base58_encode(data: &[u8]) -> String {
    bs58::encode(data).into_string()
}

/// Base58 decode
pub fn base58_decode(input: &str) -> Result<Vec<u8>, KeyError> {
    bs58::decode(input)
        .into_vec()
        .map_err(|_| KeyError::InvalidCharacter)
}

/// Encode a 64-byte Solana keypair as the base-58 private key string wallets import.
///
/// Nothing is encoded unless the bytes form a consistent keypair.
pub fn encode_private_key(keypair_bytes: &[u8]) -> Result<String, KeyError> {
    if keypair_bytes.is_empty() {
        return Err(KeyError::Empty);
    }
    let keypair = Ed25519Keypair::from_keypair_bytes(keypair_bytes)?;
    Ok(base58_encode(&keypair.keypair_bytes()))
}

/// Inverse of [`encode_private_key`]
pub fn decode_private_key(encoded: &str) -> Result<Vec<u8>, KeyError> {
    let bytes = base58_decode(encoded)?;
    if bytes.is_empty() {
        return Err(KeyError::Empty);
    }
    Ed25519Keypair::from_keypair_bytes(&bytes)?;
    Ok(bytes)
}

/// Base-58 address of the public half of a keypair
pub fn public_key_base58(keypair_bytes: &[u8]) -> Result<String, KeyError> {
    let keypair = Ed25519Keypair::from_keypair_bytes(keypair_bytes)?;
    Ok(base58_encode(&keypair.public_key_bytes()))
}
