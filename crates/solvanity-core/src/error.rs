//! Failures of a single grind request

use std::path::PathBuf;

use solvanity_crypto::KeyError;
use solvanity_pattern::ConstraintError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GrindError {
    #[error("Invalid constraints: {0}")]
    InvalidConstraints(#[from] ConstraintError),

    #[error("Failed to start {}: {source}", .program.display())]
    ProcessSpawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    ProcessNonZeroExit(String),

    #[error("Failed to extract pubkey or private key from command output")]
    ResultNotFound,

    #[error("Error reading keypair file {}: {reason}", .path.display())]
    KeyFileRead { path: PathBuf, reason: String },

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(#[from] KeyError),

    #[error("Reported pubkey {reported} does not match the key material ({derived})")]
    PubkeyMismatch { reported: String, derived: String },

    #[error("Search exceeded the {0}s runtime limit")]
    TimedOut(u64),

    #[error("Client disconnected")]
    Disconnected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GrindError {
    /// Whether the failure happened before any process was started
    pub fn is_rejection(&self) -> bool {
        matches!(self, GrindError::InvalidConstraints(_))
    }
}
