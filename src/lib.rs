//! Client library and device bridge for a LAN pool-automation gateway's
//! binary protocol: discovery, session handshake, wire codec, structured
//! decoders, and a cached device model behind a refresh policy.

pub mod bridge;
pub mod codec;
pub mod config;
pub mod discovery;
pub mod error;
pub mod frame;
pub mod model;
pub mod protocol;
pub mod session;

pub use bridge::Bridge;
pub use config::BridgeConfig;
pub use error::{BridgeError, DiscoveryError, SessionError, WireError};
pub use frame::Frame;
pub use session::{Session, SessionState};
