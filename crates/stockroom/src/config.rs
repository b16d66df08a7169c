//! Server configuration.

use serde::{Deserialize, Serialize};
use stockroom_auth::{HasherConfig, SessionConfig};

/// Everything a Stockroom server needs to start.
///
/// Every field has a default, so a partial config file (or none at all)
/// is fine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockroomConfig {
    /// Address the WebSocket listener binds to.
    ///
    /// Default: `127.0.0.1:8080`.
    pub bind_addr: String,

    /// Session lifetime and sweep interval.
    pub session: SessionConfig,

    /// Argon2id cost parameters for password hashing.
    pub hasher: HasherConfig,

    /// Create the demo account and its sample products on startup.
    ///
    /// Default: `false`.
    pub seed_demo_data: bool,

    /// Close a connection that sends nothing for this many seconds.
    /// 0 keeps idle connections open forever.
    ///
    /// Default: 300 (5 minutes).
    pub idle_timeout_secs: u64,
}

impl Default for StockroomConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            session: SessionConfig::default(),
            hasher: HasherConfig::default(),
            seed_demo_data: false,
            idle_timeout_secs: 300,
        }
    }
}

impl StockroomConfig {
    /// Overlays `STOCKROOM_BIND` and `STOCKROOM_SEED_DEMO` from the
    /// process environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Overlays values looked up through `lookup`. Unset or unparseable
    /// values leave the current setting alone.
    pub fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        if let Some(addr) = lookup("STOCKROOM_BIND") {
            if !addr.trim().is_empty() {
                self.bind_addr = addr.trim().to_string();
            }
        }
        if let Some(flag) = lookup("STOCKROOM_SEED_DEMO") {
            if let Some(seed) = parse_flag(&flag) {
                self.seed_demo_data = seed;
            }
        }
        self
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
