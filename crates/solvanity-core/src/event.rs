//! Events streamed to the caller as newline-delimited JSON

use std::fmt;

use serde::{Deserialize, Serialize};

/// The only key value ever handed to a caller
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodedResult {
    pub pubkey: String,
    pub private_key: String,
}

impl fmt::Debug for EncodedResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedResult")
            .field("pubkey", &self.pubkey)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// One line of the response body.
///
/// `log` events carry tool output and always come first. A stream ends with
/// at most one `result` or one `error`; a stream without `result` failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Log {
        message: String,
    },
    Result {
        pubkey: String,
        #[serde(rename = "privateKey")]
        private_key: String,
    },
    Error {
        message: String,
    },
}

impl StreamEvent {
    pub fn log(message: impl Into<String>) -> Self {
        StreamEvent::Log {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StreamEvent::Error {
            message: message.into(),
        }
    }

    /// Serialize as one NDJSON line, trailing newline included
    pub fn to_line(&self) -> serde_json::Result<String> {
        let mut line = serde_json::to_string(self)?;
        line.push('\n');
        Ok(line)
    }
}

impl From<EncodedResult> for StreamEvent {
    fn from(result: EncodedResult) -> Self {
        StreamEvent::Result {
            pubkey: result.pubkey,
            private_key: result.private_key,
        }
    }
}
