use std::io;
use std::time::Duration;

use thiserror::Error;

/// Errors arising from wire framing and field decoding.
#[derive(Debug, Error)]
pub enum WireError {
    #[error("frame shorter than the 8-byte header ({len} bytes)")]
    ShortFrame { len: usize },

    #[error("response code is the unknown-answer sentinel (13)")]
    UnknownAnswer,

    #[error("payload too short for {msg_type}: need {need} bytes, got {got}{}", format_raw_suffix(raw))]
    PayloadTooShort {
        msg_type: &'static str,
        need: usize,
        got: usize,
        raw: Vec<u8>,
    },

    #[error("invalid string payload: {0}")]
    InvalidString(#[from] std::string::FromUtf8Error),

    #[error("{msg_type} decode failed: {reason}")]
    Decode {
        msg_type: &'static str,
        reason: String,
    },
}

impl WireError {
    pub(crate) fn payload_too_short(msg_type: &'static str, need: usize, got: usize) -> Self {
        Self::PayloadTooShort {
            msg_type,
            need,
            got,
            raw: Vec::new(),
        }
    }

    pub(crate) fn decode(msg_type: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            msg_type,
            reason: reason.into(),
        }
    }

    /// Attach raw payload bytes to a `PayloadTooShort` error for diagnostics.
    pub fn with_raw(self, payload: &[u8]) -> Self {
        match self {
            Self::PayloadTooShort {
                msg_type,
                need,
                got,
                ..
            } => Self::PayloadTooShort {
                msg_type,
                need,
                got,
                raw: payload.to_vec(),
            },
            other => other,
        }
    }
}

fn format_raw_suffix(raw: &[u8]) -> String {
    if raw.is_empty() {
        return String::new();
    }
    let limit = 16;
    let hex: String = raw.iter().take(limit).map(|b| format!("{b:02X}")).collect();
    let ellipsis = if raw.len() > limit { "..." } else { "" };
    format!(" | {hex}{ellipsis}")
}

pub type Result<T> = std::result::Result<T, WireError>;

/// Errors from the UDP broadcast discovery probe.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("UDP I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("no gateway responded within {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("discovery response too short ({len} bytes, minimum 12)")]
    TooShort { len: usize },

    #[error("discovery checksum mismatch (expected 2, got {got})")]
    Checksum { got: u32 },
}

/// Errors from a gateway session: TCP I/O, handshake, and per-call mismatches.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("TCP I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("wire protocol error: {0}")]
    Wire(#[from] WireError),

    #[error("call timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("connection closed by gateway")]
    Disconnected,

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("unexpected response code: expected {expected}, got {got}")]
    Unexpected { expected: u16, got: u16 },
}

impl SessionError {
    /// True if retrying the same call after reconnecting is plausible.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SessionError::Timeout { .. } | SessionError::Disconnected
        )
    }
}

/// Errors surfaced by the device bridge facade.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("invalid bridge configuration: {0}")]
    Config(String),

    #[error("gateway discovery failed: {0}")]
    Discovery(#[from] DiscoveryError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("no device with key {0:?}")]
    NotFound(String),
}
