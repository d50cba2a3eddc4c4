//! TCP session to a pool-automation gateway: connect, challenge/login
//! handshake, and a synchronous request/response primitive.
//!
//! No application logic beyond the handshake itself — request procedures in
//! [`crate::protocol`] drive [`Session::call`] to do the real work.

use std::io::{self, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::SessionError;
use crate::frame::Frame;
use crate::protocol::{self, handshake};

/// Position in the connect/challenge/login state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    TcpOpen,
    Hello,
    Challenged,
    Authenticated,
}

/// One TCP connection to a gateway, taken through the handshake to
/// `Authenticated` by [`Session::connect`] and released by [`Session::close`]
/// (or by `Drop`).
pub struct Session {
    addr: SocketAddr,
    stream: Option<TcpStream>,
    state: SessionState,
}

impl Session {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            stream: None,
            state: SessionState::Disconnected,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Dial the gateway and run the full handshake, applying `timeout` as a
    /// single combined deadline spanning the connect-string write, the
    /// challenge exchange, and the login exchange. Leaves the session
    /// `Authenticated` on success; on any failure the TCP connection is
    /// closed before the error is returned.
    pub fn connect(&mut self, timeout: Duration) -> Result<(), SessionError> {
        debug!(addr = %self.addr, ?timeout, "connecting to gateway");
        let stream = TcpStream::connect_timeout(&self.addr, timeout)?;
        stream.set_nodelay(true).ok();
        self.stream = Some(stream);
        self.state = SessionState::TcpOpen;

        let deadline = Instant::now() + timeout;
        if let Err(err) = self.handshake(deadline, timeout) {
            warn!(addr = %self.addr, %err, "handshake failed, closing connection");
            self.close();
            return Err(err);
        }

        if let Some(stream) = &self.stream {
            stream.set_read_timeout(None)?;
            stream.set_write_timeout(None)?;
        }
        debug!(addr = %self.addr, "session authenticated");
        Ok(())
    }

    fn handshake(&mut self, deadline: Instant, timeout: Duration) -> Result<(), SessionError> {
        self.write_raw(handshake::CONNECT_STRING.as_bytes(), deadline, timeout)?;
        self.state = SessionState::Hello;

        let reply = self.exchange(protocol::CHALLENGE_QUERY, Vec::new(), deadline, timeout)?;
        expect_code(protocol::CHALLENGE_ANSWER, reply.code)?;
        self.state = SessionState::Challenged;

        let reply = self.exchange(
            protocol::LOGIN_QUERY,
            handshake::build_login_payload(),
            deadline,
            timeout,
        )?;
        expect_code(protocol::LOGIN_ANSWER, reply.code)?;
        self.state = SessionState::Authenticated;
        Ok(())
    }

    /// Send a framed request and return the response frame. Applies
    /// `timeout` as a single combined deadline spanning the write and the
    /// read; fails with [`SessionError::Disconnected`] if the session has
    /// no live stream.
    pub fn call(&mut self, code: u16, payload: Vec<u8>, timeout: Duration) -> Result<Frame, SessionError> {
        if self.state != SessionState::Authenticated {
            return Err(SessionError::Disconnected);
        }
        let deadline = Instant::now() + timeout;
        let result = self.exchange(code, payload, deadline, timeout);
        if let Some(stream) = &self.stream {
            stream.set_read_timeout(None).ok();
            stream.set_write_timeout(None).ok();
        }
        result
    }

    /// Idempotent: releases the TCP connection, if any, and resets state.
    pub fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(std::net::Shutdown::Both);
        }
        self.state = SessionState::Disconnected;
    }

    fn write_raw(&mut self, bytes: &[u8], deadline: Instant, timeout: Duration) -> Result<(), SessionError> {
        let stream = self.stream.as_mut().ok_or(SessionError::Disconnected)?;
        stream.set_write_timeout(Some(remaining(deadline, timeout)?))?;
        stream.write_all(bytes).map_err(|e| map_timeout(e, timeout))?;
        Ok(())
    }

    /// Write one framed message and read one response frame, mapping a
    /// read/write timeout to [`SessionError::Timeout`]. Both the write and
    /// the read draw down the same `deadline` rather than each getting a
    /// fresh `timeout` window.
    fn exchange(
        &mut self,
        code: u16,
        payload: Vec<u8>,
        deadline: Instant,
        timeout: Duration,
    ) -> Result<Frame, SessionError> {
        let wire = Frame::new(code, payload).encode();
        let stream = self.stream.as_mut().ok_or(SessionError::Disconnected)?;

        stream.set_write_timeout(Some(remaining(deadline, timeout)?))?;
        stream.write_all(&wire).map_err(|e| map_timeout(e, timeout))?;

        // A single read of up to 2048 bytes is sufficient in practice for
        // every response this protocol produces.
        stream.set_read_timeout(Some(remaining(deadline, timeout)?))?;
        let mut buf = [0u8; 2048];
        let n = stream.read(&mut buf).map_err(|e| map_timeout(e, timeout))?;
        if n == 0 {
            return Err(SessionError::Disconnected);
        }
        Ok(Frame::parse(&buf[..n])?)
    }
}

/// Time left until `deadline`, or [`SessionError::Timeout`] if it has
/// already passed. `set_read_timeout`/`set_write_timeout` reject a
/// zero `Duration`, so a deadline that's already elapsed must fail here
/// rather than be handed to the socket as-is.
fn remaining(deadline: Instant, timeout: Duration) -> Result<Duration, SessionError> {
    let now = Instant::now();
    if now >= deadline {
        return Err(SessionError::Timeout { timeout });
    }
    Ok(deadline - now)
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
    }
}

fn map_timeout(err: io::Error, timeout: Duration) -> SessionError {
    match err.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => SessionError::Timeout { timeout },
        _ => SessionError::Io(err),
    }
}

fn expect_code(expected: u16, got: u16) -> Result<(), SessionError> {
    if got == expected {
        Ok(())
    } else {
        Err(SessionError::Unexpected { expected, got })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;

    /// Spins up a one-shot gateway that answers the challenge and login
    /// handshake, then verifies `Session::connect` reaches `Authenticated`.
    #[test]
    fn connect_runs_full_handshake() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            // CONNECTSERVERHOST\r\n\r\n — read and discard.
            let mut connect_buf = [0u8; 22];
            stream.read_exact(&mut connect_buf).unwrap();

            let mut header = [0u8; 8];
            stream.read_exact(&mut header).unwrap();
            let declared = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
            let mut payload = vec![0u8; declared];
            stream.read_exact(&mut payload).unwrap();
            stream
                .write_all(&Frame::new(protocol::CHALLENGE_ANSWER, Vec::new()).encode())
                .unwrap();

            let mut header = [0u8; 8];
            stream.read_exact(&mut header).unwrap();
            let declared = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
            let mut payload = vec![0u8; declared];
            stream.read_exact(&mut payload).unwrap();
            stream
                .write_all(&Frame::new(protocol::LOGIN_ANSWER, Vec::new()).encode())
                .unwrap();
        });

        let mut session = Session::new(addr);
        session.connect(Duration::from_secs(2)).unwrap();
        assert_eq!(session.state(), SessionState::Authenticated);
        server.join().unwrap();
    }

    /// A slow challenge step that eats most of the handshake's timeout
    /// budget must leave too little for the login step — the two steps
    /// share one deadline rather than each getting a fresh `timeout`.
    #[test]
    fn handshake_deadline_is_combined_not_per_step() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut connect_buf = [0u8; 22];
            stream.read_exact(&mut connect_buf).unwrap();

            let mut header = [0u8; 8];
            stream.read_exact(&mut header).unwrap();
            let declared = u32::from_le_bytes([header[4], header[5], header[6], header[7]]) as usize;
            let mut payload = vec![0u8; declared];
            stream.read_exact(&mut payload).unwrap();

            // Burns most of the combined deadline before answering the
            // challenge at all.
            std::thread::sleep(Duration::from_millis(150));
            stream
                .write_all(&Frame::new(protocol::CHALLENGE_ANSWER, Vec::new()).encode())
                .unwrap();

            // Never reaches the login exchange; `connect` should already
            // have timed out by now.
        });

        let mut session = Session::new(addr);
        let err = session.connect(Duration::from_millis(200)).unwrap_err();
        assert!(matches!(err, SessionError::Timeout { .. }));
        assert_eq!(session.state(), SessionState::Disconnected);

        server.join().unwrap();
    }

    #[test]
    fn call_on_disconnected_session_fails() {
        let mut session = Session::new("127.0.0.1:1".parse().unwrap());
        let err = session.call(8120, Vec::new(), Duration::from_millis(10)).unwrap_err();
        assert!(matches!(err, SessionError::Disconnected));
    }
}
