//! Environment-driven bridge configuration.

use std::time::Duration;

/// Bridge-level configuration read from the process environment.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Gateway host, if already known. Empty means "run discovery".
    pub gateway_ip: String,
    /// Gateway port, if already known. Zero means "run discovery".
    pub gateway_port: u16,
    /// Minimum interval between automatic status refreshes.
    pub refresh_interval: Duration,
}

impl BridgeConfig {
    /// Read `GATEWAY_IP`, `GATEWAY_PORT`, and `REFRESH_INTERVAL_SEC` from the
    /// environment, falling back to defaults (empty host/port 0 triggers
    /// discovery; a 30-second refresh interval) for anything unset or
    /// unparseable.
    pub fn from_env() -> Self {
        let gateway_ip = std::env::var("GATEWAY_IP").unwrap_or_default();
        let gateway_port = std::env::var("GATEWAY_PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        let refresh_interval = std::env::var("REFRESH_INTERVAL_SEC")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Self {
            gateway_ip,
            gateway_port,
            refresh_interval,
        }
    }

    /// `true` if both the host and port are configured, meaning discovery
    /// can be skipped.
    pub fn has_fixed_endpoint(&self) -> bool {
        !self.gateway_ip.is_empty() && self.gateway_port != 0
    }
}
