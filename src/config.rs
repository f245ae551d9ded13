//! Engine and vehicle configuration
//!
//! The engine itself is configured by [`ClientConfig`]. Which sessions,
//! security levels and key material apply to a given ECU is vehicle data
//! owned by the caller; [`VehicleConfig`] and friends are the typed shape of
//! those tables, loadable from TOML:
//!
//! ```toml
//! name = "mazda3_2015"
//!
//! [buses]
//! hs = 500000
//! ms = 125000
//!
//! [modules.rbcm]
//! address = 0x7B7
//! bus = "ms"
//!
//! [modules.rbcm.security.config]
//! session = 0x03
//! level = 0x03
//! algorithm = 70
//! key = [0x4B, 0x30, 0x32, 0x31, 0x36, 0x00]
//! ```

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables for the session engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Initial per-exchange timeout.
    #[serde(default = "default_timeout_ms")]
    pub default_timeout_ms: u64,
    /// Wall-clock bound on the response-pending retry loop. Flash erases
    /// legitimately take a while; raise this for programming sessions.
    #[serde(default = "default_pending_deadline_ms")]
    pub pending_deadline_ms: u64,
    /// Ask for confirmation before every request.
    #[serde(default)]
    pub step_by_step: bool,
}

fn default_timeout_ms() -> u64 {
    2000
}

fn default_pending_deadline_ms() -> u64 {
    30000
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            default_timeout_ms: default_timeout_ms(),
            pending_deadline_ms: default_pending_deadline_ms(),
            step_by_step: false,
        }
    }
}

impl ClientConfig {
    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn pending_deadline(&self) -> Duration {
        Duration::from_millis(self.pending_deadline_ms)
    }
}

/// Session and security-access parameters for one privilege level of one
/// module (e.g. "config", "io_control", "reprog").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityProfile {
    /// Diagnostic session type to enter first.
    pub session: u8,
    /// SecurityAccess seed-request level; 0 means no handshake needed.
    #[serde(default)]
    pub level: u8,
    /// Seed-key algorithm id (see [`crate::security::algorithm`]).
    #[serde(default = "default_algorithm")]
    pub algorithm: u16,
    /// Vehicle secret for the seed-key transform (5 bytes, or 6 with a
    /// zero pad).
    #[serde(default)]
    pub key: Vec<u8>,
}

fn default_algorithm() -> u16 {
    crate::security::ALGORITHM_FORD_COMMON_14229
}

/// One ECU on the vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Diagnostic CAN address of the module; the tester address is
    /// conventionally `address + 8`.
    pub address: u16,
    /// Name of the bus the module sits on (key into [`VehicleConfig::buses`]).
    pub bus: String,
    /// Named security profiles for this module.
    #[serde(default)]
    pub security: HashMap<String, SecurityProfile>,
}

/// Per-vehicle module and bus tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleConfig {
    pub name: String,
    /// Bus name to bitrate in bit/s.
    #[serde(default)]
    pub buses: HashMap<String, u32>,
    #[serde(default)]
    pub modules: HashMap<String, ModuleConfig>,
}

impl VehicleConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(input)?)
    }
}
