//! Recovery of the found keypair from grinder output
//!
//! Two output shapes are understood, tried in order:
//!
//! 1. inline: `pubkey: <address>` and `private key: [1,2,...]` lines
//! 2. file reference: `Wrote keypair to <address>.json`, where the file holds
//!    the keypair as a JSON byte array. The file is read once and always deleted.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::GrindError;

pub const PUBKEY_LABEL: &str = "pubkey:";
pub const PRIVATE_KEY_LABEL: &str = "private key:";
pub const KEYPAIR_FILE_MARKER: &str = "Wrote keypair to";

/// What the output says, before any file is touched
#[derive(Clone, PartialEq, Eq)]
pub enum RawResult {
    Inline {
        pubkey: String,
        private_key_bytes: Vec<u8>,
    },
    ViaFile {
        pubkey: String,
        keypair_path: PathBuf,
    },
}

/// A public key with its keypair bytes
#[derive(Clone, PartialEq, Eq)]
pub struct KeyMaterial {
    pub pubkey: String,
    pub private_key_bytes: Vec<u8>,
}

impl fmt::Debug for RawResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawResult::Inline {
                pubkey,
                private_key_bytes,
            } => f
                .debug_struct("Inline")
                .field("pubkey", pubkey)
                .field("private_key_bytes", &format_args!("<{} bytes>", private_key_bytes.len()))
                .finish(),
            RawResult::ViaFile {
                pubkey,
                keypair_path,
            } => f
                .debug_struct("ViaFile")
                .field("pubkey", pubkey)
                .field("keypair_path", keypair_path)
                .finish(),
        }
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("pubkey", &self.pubkey)
            .field("private_key_bytes", &format_args!("<{} bytes>", self.private_key_bytes.len()))
            .finish()
    }
}

/// Find a result in the tool's stdout. Relative keypair paths resolve against `work_dir`.
pub fn extract(stdout: &str, work_dir: &Path) -> Result<RawResult, GrindError> {
    if let Some(inline) = extract_inline(stdout) {
        return Ok(inline);
    }
    if let Some(via_file) = extract_file_reference(stdout, work_dir) {
        return Ok(via_file);
    }
    Err(GrindError::ResultNotFound)
}

fn extract_inline(stdout: &str) -> Option<RawResult> {
    let pubkey = labeled_value(stdout, PUBKEY_LABEL).filter(|p| !p.is_empty())?;
    let private_key_bytes = labeled_value(stdout, PRIVATE_KEY_LABEL).and_then(parse_byte_list)?;

    Some(RawResult::Inline {
        pubkey: pubkey.to_string(),
        private_key_bytes,
    })
}

fn labeled_value<'a>(stdout: &'a str, label: &str) -> Option<&'a str> {
    stdout
        .lines()
        .map(str::trim_start)
        .find_map(|line| line.strip_prefix(label))
        .map(str::trim)
}

/// Parse `[1, 2, 3]` into bytes; anything malformed yields `None`
fn parse_byte_list(text: &str) -> Option<Vec<u8>> {
    let inner = text.trim().strip_prefix('[')?.strip_suffix(']')?;
    let bytes = inner
        .split(',')
        .map(|value| value.trim().parse::<u8>().ok())
        .collect::<Option<Vec<u8>>>()?;
    if bytes.is_empty() {
        None
    } else {
        Some(bytes)
    }
}

fn extract_file_reference(stdout: &str, work_dir: &Path) -> Option<RawResult> {
    stdout.lines().find_map(|line| {
        let start = line.find(KEYPAIR_FILE_MARKER)? + KEYPAIR_FILE_MARKER.len();
        let reported = line[start..].trim();
        if reported.is_empty() {
            return None;
        }

        let reported = Path::new(reported);
        let pubkey = reported.file_stem()?.to_str()?.to_string();
        let keypair_path = if reported.is_absolute() {
            reported.to_path_buf()
        } else {
            work_dir.join(reported)
        };

        Some(RawResult::ViaFile {
            pubkey,
            keypair_path,
        })
    })
}

impl RawResult {
    pub fn pubkey(&self) -> &str {
        match self {
            RawResult::Inline { pubkey, .. } | RawResult::ViaFile { pubkey, .. } => pubkey,
        }
    }

    /// Turn the result into key material, reading (and deleting) the keypair file if needed
    pub fn resolve(self) -> Result<KeyMaterial, GrindError> {
        match self {
            RawResult::Inline {
                pubkey,
                private_key_bytes,
            } => Ok(KeyMaterial {
                pubkey,
                private_key_bytes,
            }),
            RawResult::ViaFile {
                pubkey,
                keypair_path,
            } => {
                let private_key_bytes = read_keypair_file(&keypair_path)?;
                Ok(KeyMaterial {
                    pubkey,
                    private_key_bytes,
                })
            }
        }
    }
}

/// Read a keypair file once and delete it whatever the outcome of the read
pub fn read_keypair_file(path: &Path) -> Result<Vec<u8>, GrindError> {
    let read = fs::read_to_string(path)
        .map_err(|e| e.to_string())
        .and_then(|content| serde_json::from_str::<Vec<u8>>(&content).map_err(|e| e.to_string()));

    match fs::remove_file(path) {
        Ok(()) => debug!("Deleted keypair file: {}", path.display()),
        Err(e) => warn!("Could not delete keypair file {}: {}", path.display(), e),
    }

    read.map_err(|reason| GrindError::KeyFileRead {
        path: path.to_path_buf(),
        reason,
    })
}
