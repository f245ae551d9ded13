//! Transport boundary for UDS communication
//!
//! The engine talks to an ECU through a single blocking primitive: hand the
//! framed request bytes to the transport, wait up to a timeout, receive the
//! framed reply bytes. Bus addressing, ISO-TP segmentation and reconnection
//! all live below this trait (J2534/SocketCAN adapters, out of scope here);
//! the crate ships only the trait and a scripted mock for tests.

mod error;
pub mod mock;

pub use error::TransportError;
pub use mock::MockTransport;

use std::time::Duration;

/// One blocking request/reply exchange with an ECU.
///
/// `reply[0]` is the effective service id (reply mask or negative-response
/// marker already applied by the framing layer); the rest is the payload.
/// The exchange is strictly half-duplex: implementations must not be used
/// for more than one in-flight request at a time.
pub trait Transport: Send + Sync {
    fn exchange(&self, request: &[u8], timeout: Duration) -> Result<Vec<u8>, TransportError>;
}
