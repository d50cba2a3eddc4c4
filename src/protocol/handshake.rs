//! Connect string and login payload construction.

use crate::codec;

/// Sent immediately after the TCP connection opens. No framing, no response.
pub const CONNECT_STRING: &str = "CONNECTSERVERHOST\r\n\r\n";

pub const LOGIN_SCHEMA: u32 = 348;
pub const LOGIN_CONNECTION_TYPE: u32 = 0;
pub const LOGIN_CLIENT_VERSION: &str = "Android";
/// Default login password shipped by the gateway firmware.
pub const LOGIN_PASSWORD: &str = "mypassword";
pub const LOGIN_PID: u32 = 2;

/// Build the login request payload:
/// `u32 schema ‖ u32 connection_type ‖ string client_version ‖ string password ‖ u8 0 ‖ u32 pid`.
pub fn build_login_payload() -> Vec<u8> {
    let mut buf = Vec::new();
    codec::write_u32(&mut buf, LOGIN_SCHEMA);
    codec::write_u32(&mut buf, LOGIN_CONNECTION_TYPE);
    codec::write_string(&mut buf, LOGIN_CLIENT_VERSION);
    codec::write_string(&mut buf, LOGIN_PASSWORD);
    buf.push(0);
    codec::write_u32(&mut buf, LOGIN_PID);
    buf
}
