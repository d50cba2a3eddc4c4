//! UDP broadcast discovery of a gateway on the local network.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use tracing::debug;

use crate::error::DiscoveryError;

pub const DISCOVERY_PORT: u16 = 1444;
pub const DISCOVERY_BROADCAST: &str = "255.255.255.255";
const EXPECTED_CHECKSUM: u32 = 2;
const PROBE: [u8; 8] = [1, 0, 0, 0, 0, 0, 0, 0];

/// A gateway found by [`discover`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayInfo {
    pub ip: String,
    pub port: u16,
    pub gateway_type: u8,
    pub subtype: u8,
    pub name: String,
}

impl GatewayInfo {
    /// Parse `ip:port` into a socket address. Fails only if the gateway sent
    /// a malformed IP octet string, which the checksum-gated parse above
    /// should already rule out.
    pub fn addr(&self) -> Option<SocketAddr> {
        format!("{}:{}", self.ip, self.port).parse().ok()
    }
}

/// Broadcast the discovery probe and wait up to `timeout` for a reply.
pub fn discover(timeout: Duration) -> Result<GatewayInfo, DiscoveryError> {
    let socket = UdpSocket::bind("0.0.0.0:0")?;
    socket.set_broadcast(true)?;
    socket.set_read_timeout(Some(timeout))?;

    let dest = format!("{DISCOVERY_BROADCAST}:{DISCOVERY_PORT}");
    socket.send_to(&PROBE, dest)?;
    debug!(?timeout, "sent discovery broadcast");

    let mut buf = [0u8; 4096];
    let (n, _) = socket.recv_from(&mut buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut => {
            DiscoveryError::Timeout { timeout }
        }
        _ => DiscoveryError::Io(e),
    })?;

    parse_response(&buf[..n])
}

fn parse_response(buf: &[u8]) -> Result<GatewayInfo, DiscoveryError> {
    if buf.len() < 12 {
        return Err(DiscoveryError::TooShort { len: buf.len() });
    }

    let checksum = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]);
    if checksum != EXPECTED_CHECKSUM {
        return Err(DiscoveryError::Checksum { got: checksum });
    }

    let ip = format!("{}.{}.{}.{}", buf[4], buf[5], buf[6], buf[7]);
    let port = u16::from_le_bytes([buf[8], buf[9]]);
    let gateway_type = buf[10];
    let subtype = buf[11];

    // Name is meant to be NUL-terminated; if no NUL shows up, treat the
    // remaining bytes as the name verbatim rather than failing discovery
    // over a cosmetic field.
    let name_bytes = &buf[12..];
    let name = match name_bytes.iter().position(|&b| b == 0) {
        Some(i) => String::from_utf8_lossy(&name_bytes[..i]).into_owned(),
        None => String::from_utf8_lossy(name_bytes).into_owned(),
    };

    Ok(GatewayInfo {
        ip,
        port,
        gateway_type,
        subtype,
        name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_response(name: &[u8]) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(&EXPECTED_CHECKSUM.to_le_bytes());
        buf.extend_from_slice(&[192, 168, 1, 50]);
        buf.extend_from_slice(&6681u16.to_le_bytes());
        buf.push(2); // type
        buf.push(0); // subtype
        buf.extend_from_slice(name);
        buf
    }

    #[test]
    fn parses_null_terminated_name() {
        let mut name = b"EasyTouch".to_vec();
        name.push(0);
        name.extend_from_slice(b"garbage");
        let info = parse_response(&sample_response(&name)).unwrap();
        assert_eq!(info.ip, "192.168.1.50");
        assert_eq!(info.port, 6681);
        assert_eq!(info.name, "EasyTouch");
    }

    #[test]
    fn falls_back_to_verbatim_name_without_nul() {
        let info = parse_response(&sample_response(b"EasyTouch")).unwrap();
        assert_eq!(info.name, "EasyTouch");
    }

    #[test]
    fn rejects_bad_checksum() {
        let mut buf = sample_response(b"x");
        buf[0] = 9;
        assert!(matches!(
            parse_response(&buf),
            Err(DiscoveryError::Checksum { got: 9 })
        ));
    }

    #[test]
    fn parses_literal_scenario_response() {
        let buf = [
            0x02, 0x00, 0x00, 0x00, 0x0a, 0x00, 0x00, 0x05, 0xa1, 0x05, 0x00, 0x00, 0x4a, 0x6f,
            0x65, 0x00,
        ];
        let info = parse_response(&buf).unwrap();
        assert_eq!(info.ip, "10.0.0.5");
        assert_eq!(info.port, 1441);
        assert_eq!(info.gateway_type, 0);
        assert_eq!(info.subtype, 0);
        assert_eq!(info.name, "Joe");
    }

    #[test]
    fn rejects_short_response() {
        assert!(matches!(
            parse_response(&[0; 4]),
            Err(DiscoveryError::TooShort { len: 4 })
        ));
    }
}
