//! SolVanity Crypto Primitives
//!
//! Keypair validation and the base-58 wire encoding for private keys.

pub mod ed25519;
pub mod encoding;

pub use self::ed25519::{Ed25519Error, Ed25519Keypair, KEYPAIR_LENGTH};
pub use self::encoding::{
    base58_decode, base58_encode, decode_private_key, encode_private_key, public_key_base58,
    KeyError,
};
