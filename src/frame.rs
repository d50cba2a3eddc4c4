//! Frame header parsing and encoding.
//!
//! Wire format: an 8-byte header followed by the payload.
//!
//! ```text
//! [2B reserved=0] [2B message code, LE] [4B payload length, LE] [payload...]
//! ```
//!
//! No byte stuffing, no checksum — the payload length is trusted and the
//! session reads exactly that many bytes. Message code 13 is the gateway's
//! "unknown answer" sentinel rather than a real response.

use crate::error::{Result, WireError};

pub const HEADER_LEN: usize = 8;

/// Message code the gateway sends back when it does not recognize a request.
pub const CODE_UNKNOWN_ANSWER: u16 = 13;

/// A parsed frame header: message code and declared payload length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub code: u16,
    pub payload_len: u32,
}

impl Header {
    /// Parse the fixed 8-byte header. `wire` must be at least [`HEADER_LEN`]
    /// bytes; any trailing bytes are ignored.
    pub fn parse(wire: &[u8]) -> Result<Self> {
        if wire.len() < HEADER_LEN {
            return Err(WireError::ShortFrame { len: wire.len() });
        }
        let code = u16::from_le_bytes([wire[2], wire[3]]);
        let payload_len = u32::from_le_bytes([wire[4], wire[5], wire[6], wire[7]]);
        Ok(Self { code, payload_len })
    }

    /// Encode the header: 2 reserved zero bytes, the message code, then the
    /// payload length.
    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut buf = [0u8; HEADER_LEN];
        buf[2..4].copy_from_slice(&self.code.to_le_bytes());
        buf[4..8].copy_from_slice(&self.payload_len.to_le_bytes());
        buf
    }
}

/// A complete decoded frame: message code plus payload bytes.
#[derive(Debug, Clone)]
pub struct Frame {
    pub code: u16,
    pub payload: Vec<u8>,
}

impl Frame {
    pub fn new(code: u16, payload: Vec<u8>) -> Self {
        Self { code, payload }
    }

    /// Parse a complete wire frame (header + payload already concatenated).
    ///
    /// The declared payload length is advisory only: the gateway is known to
    /// under- and over-advertise it in practice, so the payload is simply
    /// every byte following the header. Field decoders are themselves
    /// resilient to a payload shorter than they expect (see [`crate::codec`]).
    pub fn parse(wire: &[u8]) -> Result<Self> {
        let header = Header::parse(wire)?;
        if header.code == CODE_UNKNOWN_ANSWER {
            return Err(WireError::UnknownAnswer);
        }
        Ok(Self {
            code: header.code,
            payload: wire[HEADER_LEN..].to_vec(),
        })
    }

    /// Encode into a complete wire frame: header followed by payload.
    pub fn encode(&self) -> Vec<u8> {
        let header = Header {
            code: self.code,
            payload_len: self.payload.len() as u32,
        };
        let mut wire = Vec::with_capacity(HEADER_LEN + self.payload.len());
        wire.extend_from_slice(&header.encode());
        wire.extend_from_slice(&self.payload);
        wire
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_round_trip() {
        let header = Header {
            code: 14,
            payload_len: 5,
        };
        let wire = header.encode();
        assert_eq!(Header::parse(&wire).unwrap(), header);
    }

    #[test]
    fn header_reserved_bytes_are_zero() {
        let header = Header {
            code: 27,
            payload_len: 0,
        };
        let wire = header.encode();
        assert_eq!(&wire[0..2], &[0, 0]);
    }

    #[test]
    fn frame_round_trip() {
        let frame = Frame::new(15, vec![1, 2, 3, 4]);
        let wire = frame.encode();
        let parsed = Frame::parse(&wire).unwrap();
        assert_eq!(parsed.code, frame.code);
        assert_eq!(parsed.payload, frame.payload);
    }

    #[test]
    fn empty_payload() {
        let frame = Frame::new(8121, vec![]);
        let wire = frame.encode();
        assert_eq!(wire.len(), HEADER_LEN);
        let parsed = Frame::parse(&wire).unwrap();
        assert!(parsed.payload.is_empty());
    }

    #[test]
    fn header_too_short() {
        assert!(matches!(
            Header::parse(&[0, 0, 14, 0]),
            Err(WireError::ShortFrame { len: 4 })
        ));
    }

    #[test]
    fn declared_length_longer_than_buffer_is_not_an_error() {
        // The gateway is known to over-advertise; the payload is whatever
        // bytes actually follow the header, not a slice sized by N.
        let mut wire = Header {
            code: 12533,
            payload_len: 10,
        }
        .encode()
        .to_vec();
        wire.extend_from_slice(&[1, 2, 3]);
        let parsed = Frame::parse(&wire).unwrap();
        assert_eq!(parsed.payload, vec![1, 2, 3]);
    }

    #[test]
    fn encode_version_query_matches_literal_bytes() {
        let wire = Frame::new(8120, Vec::new()).encode();
        assert_eq!(wire, [0x00, 0x00, 0xb8, 0x1f, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn decode_version_answer_matches_literal_bytes() {
        let wire = [0x00, 0x00, 0xb9, 0x1f, 0x04, 0x00, 0x00, 0x00, 0x01, 0x02, 0x03, 0x04];
        let frame = Frame::parse(&wire).unwrap();
        assert_eq!(frame.code, 8121);
        assert_eq!(frame.payload, vec![0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn unknown_answer_sentinel() {
        let frame = Header {
            code: CODE_UNKNOWN_ANSWER,
            payload_len: 0,
        }
        .encode();
        assert!(matches!(Frame::parse(&frame), Err(WireError::UnknownAnswer)));
    }
}
