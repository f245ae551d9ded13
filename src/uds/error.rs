//! Session engine errors

use thiserror::Error;

use super::NegativeResponseCode;
use crate::security::SecurityError;
use crate::transport::TransportError;

/// Terminal outcomes of a diagnostic operation.
///
/// The response-pending code (0x78) never surfaces here; the engine absorbs
/// it into the retry loop. Everything else is reported to the caller, and
/// nothing is retried automatically.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UdsError {
    /// Step-by-step confirmation declined; nothing was sent.
    #[error("cancelled by user before sending service 0x{0:02X}")]
    Cancelled(u8),

    /// The ECU explicitly rejected the request.
    #[error("negative response {nrc} (0x{nrc:02X}) for service 0x{service_id:02X}")]
    NegativeResponse {
        service_id: u8,
        nrc: NegativeResponseCode,
    },

    /// The reply frame is structurally broken (empty, truncated).
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The reply is well-formed but echoes the wrong service id or
    /// sub-parameter for the request that was sent.
    #[error("unexpected reply: {0}")]
    UnexpectedReply(String),

    /// Upload flow control violated (block counter or size).
    #[error("transfer sequence error: {0}")]
    Sequence(String),

    /// The response-pending deadline elapsed without a definitive reply.
    #[error("response pending deadline exceeded")]
    Timeout,

    /// Seed-key derivation or algorithm selection failed.
    #[error("security access failed: {0}")]
    Security(#[from] SecurityError),

    /// The transport failed; fatal, never retried.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
