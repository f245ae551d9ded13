//! uds-session - synchronous ISO 14229 (UDS) diagnostic session engine
//!
//! This crate drives validated request/reply exchanges with an ECU over an
//! abstract blocking transport, and ships the codecs a diagnostic tool needs
//! around them: a bit-addressable view over packed configuration records and
//! the seed-key transform for the Security Access handshake.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                       UdsClient                       │
//! │  per-service operations, echo validation,             │
//! │  response-pending retry, segmented upload             │
//! │                                                       │
//! │   ┌──────────────┐   ┌───────────────┐                │
//! │   │ security     │   │ bitfield      │                │
//! │   │ (seed-key)   │   │ (record view) │                │
//! │   └──────────────┘   └───────────────┘                │
//! │                          │                            │
//! │                   ┌──────┴──────┐                     │
//! │                   │  Transport  │  (J2534/ISO-TP,     │
//! │                   │   (trait)   │   below this crate) │
//! │                   └─────────────┘                     │
//! └───────────────────────────────────────────────────────┘
//! ```
//!
//! Everything is synchronous and half-duplex: one blocking exchange per
//! request, no shared state across operations beyond the transport handle.
//! Hosts embedding this in a threaded program must serialize operations on
//! a given transport.

pub mod bitfield;
pub mod config;
pub mod security;
pub mod transport;
pub mod uds;

pub use bitfield::{BitFieldError, LsbReversedBits, MsbFirstBits};
pub use config::{ClientConfig, ConfigError, ModuleConfig, SecurityProfile, VehicleConfig};
pub use security::{SecurityError, SeedKeyAlgorithm};
pub use transport::{MockTransport, Transport, TransportError};
pub use uds::{
    AutoConfirm, ConfirmPolicy, Message, NegativeResponse, NegativeResponseCode, Reply, UdsClient,
    UdsError,
};
