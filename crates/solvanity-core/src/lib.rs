//! SolVanity Core Engine
//!
//! Drives `solana-keygen grind` for one request: spawns it, relays its output
//! as stream events, and recovers the found keypair.

mod error;
mod event;
mod extract;
mod process;
mod session;
mod stats;

pub use error::GrindError;
pub use event::{EncodedResult, StreamEvent};
pub use extract::{extract, read_keypair_file, KeyMaterial, RawResult};
pub use process::{tool_version, GrindProcess, LogLine, OutputStream, ProcessEvent, ToolCommand};
pub use session::{GrindSession, SessionConfig};
pub use stats::RunStats;

// Re-exports for convenience
pub use solvanity_crypto::{decode_private_key, encode_private_key, KeyError};
pub use solvanity_pattern::{
    ConstraintError, Invocation, MnemonicLanguage, SearchConstraints, WordCount,
};
