//! Scripted mock transport for tests
//!
//! Plays back a FIFO of exchanges: each entry optionally asserts the request
//! bytes it expects and yields either a reply or a transport error. Every
//! call is recorded with its timeout so tests can assert on retry behavior.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

use super::{Transport, TransportError};

/// One recorded `exchange` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub request: Vec<u8>,
    pub timeout: Duration,
}

struct Exchange {
    expect: Option<Vec<u8>>,
    outcome: Result<Vec<u8>, TransportError>,
}

/// Scripted transport: replies are served in the order they were enqueued.
#[derive(Default)]
pub struct MockTransport {
    script: Mutex<VecDeque<Exchange>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a reply for a request that must match `expect` exactly.
    pub fn expect(&self, expect: &[u8], reply: &[u8]) {
        self.script.lock().push_back(Exchange {
            expect: Some(expect.to_vec()),
            outcome: Ok(reply.to_vec()),
        });
    }

    /// Enqueue a reply served to whatever request arrives next.
    pub fn reply_with(&self, reply: &[u8]) {
        self.script.lock().push_back(Exchange {
            expect: None,
            outcome: Ok(reply.to_vec()),
        });
    }

    /// Enqueue a negative response `[0x7F, service_id, nrc]`.
    pub fn reply_negative(&self, service_id: u8, nrc: u8) {
        self.reply_with(&[0x7F, service_id, nrc]);
    }

    /// Enqueue a transport-level failure.
    pub fn fail_with(&self, error: TransportError) {
        self.script.lock().push_back(Exchange {
            expect: None,
            outcome: Err(error),
        });
    }

    /// All calls observed so far, in order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// True when every scripted exchange has been consumed.
    pub fn script_exhausted(&self) -> bool {
        self.script.lock().is_empty()
    }
}

impl Transport for MockTransport {
    fn exchange(&self, request: &[u8], timeout: Duration) -> Result<Vec<u8>, TransportError> {
        self.calls.lock().push(RecordedCall {
            request: request.to_vec(),
            timeout,
        });

        let entry = self
            .script
            .lock()
            .pop_front()
            .ok_or_else(|| TransportError::ReceiveFailed("mock script exhausted".into()))?;

        if let Some(expected) = entry.expect {
            if expected != request {
                return Err(TransportError::SendFailed(format!(
                    "unexpected request {}, script wanted {}",
                    hex::encode(request),
                    hex::encode(&expected)
                )));
            }
        }
        entry.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serves_replies_in_order() {
        let mock = MockTransport::new();
        mock.expect(&[0x10, 0x03], &[0x50, 0x03]);
        mock.reply_with(&[0x62, 0xDE, 0x01, 0xAA]);

        let t = Duration::from_millis(2000);
        assert_eq!(mock.exchange(&[0x10, 0x03], t).unwrap(), [0x50, 0x03]);
        assert_eq!(
            mock.exchange(&[0x22, 0xDE, 0x01], t).unwrap(),
            [0x62, 0xDE, 0x01, 0xAA]
        );
        assert!(mock.script_exhausted());
        assert_eq!(mock.calls().len(), 2);
    }

    #[test]
    fn mismatched_request_fails() {
        let mock = MockTransport::new();
        mock.expect(&[0x10, 0x03], &[0x50, 0x03]);
        let err = mock
            .exchange(&[0x10, 0x01], Duration::from_millis(100))
            .unwrap_err();
        assert!(matches!(err, TransportError::SendFailed(_)));
    }
}
