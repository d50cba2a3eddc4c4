//! Message codes and request procedures.
//!
//! Each procedure writes one framed request through a [`Session`] and
//! validates that the response carries the expected answer code, mapping a
//! mismatch to [`SessionError::Unexpected`].

pub mod config;
pub mod handshake;
pub mod status;

use std::time::Duration;

use crate::codec;
use crate::error::SessionError;
use crate::session::Session;

pub const CHALLENGE_QUERY: u16 = 14;
pub const CHALLENGE_ANSWER: u16 = 15;
pub const LOGIN_QUERY: u16 = 27;
pub const LOGIN_ANSWER: u16 = 28;
pub const VERSION_QUERY: u16 = 8120;
pub const VERSION_ANSWER: u16 = 8121;
pub const STATUS_QUERY: u16 = 12526;
pub const STATUS_ANSWER: u16 = 12527;
pub const BUTTON_PRESS_QUERY: u16 = 12530;
pub const BUTTON_PRESS_ANSWER: u16 = 12531;
pub const CONFIG_QUERY: u16 = 12532;
pub const CONFIG_ANSWER: u16 = 12533;

fn expect(expected: u16, got: u16) -> Result<(), SessionError> {
    if got == expected {
        Ok(())
    } else {
        Err(SessionError::Unexpected { expected, got })
    }
}

/// Ask the gateway for its firmware version string. Used only to confirm
/// liveness; the answer payload itself is not otherwise interpreted.
pub fn query_version(session: &mut Session, timeout: Duration) -> Result<String, SessionError> {
    let frame = session.call(VERSION_QUERY, Vec::new(), timeout)?;
    expect(VERSION_ANSWER, frame.code)?;
    let (version, _) = codec::read_string(&frame.payload, 0);
    Ok(version)
}

/// Fetch the controller configuration and circuit catalog.
pub fn query_config(
    session: &mut Session,
    timeout: Duration,
) -> Result<config::ConfigurationAnswer, SessionError> {
    let payload = vec![0u8; 8];
    let frame = session.call(CONFIG_QUERY, payload, timeout)?;
    expect(CONFIG_ANSWER, frame.code)?;
    Ok(config::decode(&frame.payload)?)
}

/// Fetch current body temperatures, circuit states, and chemistry readings.
pub fn query_status(
    session: &mut Session,
    timeout: Duration,
) -> Result<status::StatusAnswer, SessionError> {
    let payload = vec![0u8; 4];
    let frame = session.call(STATUS_QUERY, payload, timeout)?;
    expect(STATUS_ANSWER, frame.code)?;
    Ok(status::decode(&frame.payload)?)
}

/// Press (toggle) a circuit by id, setting it to `state` (0 = off, 1 = on).
pub fn set_circuit(
    session: &mut Session,
    circuit_id: i32,
    state: i32,
    timeout: Duration,
) -> Result<(), SessionError> {
    let mut payload = Vec::with_capacity(12);
    codec::write_u32(&mut payload, 0);
    codec::write_u32(&mut payload, circuit_id as u32);
    codec::write_u32(&mut payload, state as u32);
    let frame = session.call(BUTTON_PRESS_QUERY, payload, timeout)?;
    expect(BUTTON_PRESS_ANSWER, frame.code)?;
    Ok(())
}
