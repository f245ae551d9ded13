//! Request/reply message model
//!
//! A [`Message`] is a service id plus opaque payload. Raw reply bytes parse
//! into a [`Reply`], which recognizes the negative-response envelope
//! `[0x7F, original_service_id, nrc]` and surfaces everything else as a
//! positive message whose service id the caller validates against the
//! request (`request_sid | REPLY_MASK`).

use super::{service_id, NegativeResponseCode, UdsError};

/// A UDS request or positive reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub service_id: u8,
    pub payload: Vec<u8>,
}

impl Message {
    pub fn new(service_id: u8, payload: Vec<u8>) -> Self {
        Self {
            service_id,
            payload,
        }
    }

    /// Frame as raw bytes: service id then payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(1 + self.payload.len());
        bytes.push(self.service_id);
        bytes.extend_from_slice(&self.payload);
        bytes
    }
}

/// The ECU explicitly rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NegativeResponse {
    /// Service id echoed from the rejected request.
    pub service_id: u8,
    pub nrc: NegativeResponseCode,
}

/// A parsed reply frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Positive(Message),
    Negative(NegativeResponse),
}

impl Reply {
    /// Parse raw reply bytes as delivered by the transport.
    pub fn from_raw(raw: &[u8]) -> Result<Self, UdsError> {
        let (&sid, rest) = raw
            .split_first()
            .ok_or_else(|| UdsError::InvalidResponse("empty reply frame".into()))?;

        if sid == service_id::NEGATIVE_RESPONSE {
            if rest.len() < 2 {
                return Err(UdsError::InvalidResponse(format!(
                    "negative response too short: {}",
                    hex::encode(raw)
                )));
            }
            return Ok(Reply::Negative(NegativeResponse {
                service_id: rest[0],
                nrc: NegativeResponseCode::from(rest[1]),
            }));
        }

        Ok(Reply::Positive(Message::new(sid, rest.to_vec())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_reply_splits_sid_and_payload() {
        let reply = Reply::from_raw(&[0x62, 0xDE, 0x01, 0xAA]).unwrap();
        assert_eq!(
            reply,
            Reply::Positive(Message::new(0x62, vec![0xDE, 0x01, 0xAA]))
        );
    }

    #[test]
    fn negative_reply_recognized() {
        let reply = Reply::from_raw(&[0x7F, 0x22, 0x31]).unwrap();
        assert_eq!(
            reply,
            Reply::Negative(NegativeResponse {
                service_id: 0x22,
                nrc: NegativeResponseCode::RequestOutOfRange,
            })
        );
    }

    #[test]
    fn truncated_negative_reply_rejected() {
        assert!(matches!(
            Reply::from_raw(&[0x7F, 0x22]),
            Err(UdsError::InvalidResponse(_))
        ));
    }

    #[test]
    fn empty_frame_rejected() {
        assert!(matches!(
            Reply::from_raw(&[]),
            Err(UdsError::InvalidResponse(_))
        ));
    }

    #[test]
    fn message_framing_round_trip() {
        let msg = Message::new(0x2E, vec![0xDE, 0x00, 0x01]);
        assert_eq!(msg.to_bytes(), [0x2E, 0xDE, 0x00, 0x01]);
    }
}
