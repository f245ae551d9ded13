//! Diagnostic session client
//!
//! [`UdsClient`] turns semantic diagnostic operations into validated
//! request/reply exchanges over a [`Transport`]. Every operation builds a
//! request frame, drives it through [`UdsClient::send`] and checks that the
//! reply echoes the parameters of the request before handing the payload
//! back to the caller.
//!
//! The send loop absorbs exactly one condition: a negative response with
//! the response-pending code (0x78) echoing the request's service id. The
//! ECU is telling us to keep waiting (flash erases take a while), so the
//! exchange is retried with the timeout doubled each round, bounded by the
//! configured wall-clock deadline. Every other failure is terminal.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use super::layout::{did, dsc, rdtci, sa, transfer, upload};
use super::{service_id, NegativeResponseCode, Reply, UdsError, REPLY_MASK};
use crate::config::{ClientConfig, SecurityProfile};
use crate::security;
use crate::transport::Transport;

/// Gate consulted before each request when step-by-step mode is on.
///
/// A shell wires this to an interactive prompt; declining aborts the
/// operation with [`UdsError::Cancelled`] before anything reaches the bus.
pub trait ConfirmPolicy: Send + Sync {
    fn confirm(&self, request: &[u8]) -> bool;
}

/// Default policy: never blocks, every request goes out.
pub struct AutoConfirm;

impl ConfirmPolicy for AutoConfirm {
    fn confirm(&self, _request: &[u8]) -> bool {
        true
    }
}

/// Session engine for one ECU over one transport.
///
/// Stateless across operations apart from the transport handle and
/// configuration; the transport must not be shared with another in-flight
/// exchange.
pub struct UdsClient {
    transport: Arc<dyn Transport>,
    config: ClientConfig,
    confirm: Box<dyn ConfirmPolicy>,
}

impl UdsClient {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_config(transport, ClientConfig::default())
    }

    pub fn with_config(transport: Arc<dyn Transport>, config: ClientConfig) -> Self {
        Self {
            transport,
            config,
            confirm: Box::new(AutoConfirm),
        }
    }

    /// Replace the confirmation gate (used with `step_by_step`).
    pub fn with_confirm(mut self, confirm: Box<dyn ConfirmPolicy>) -> Self {
        self.confirm = confirm;
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Send one request and return the validated positive-reply payload.
    ///
    /// Response-pending negative replies restart the exchange with the
    /// timeout doubled until `pending_deadline` elapses.
    pub fn send(&self, sid: u8, payload: &[u8], timeout: Duration) -> Result<Vec<u8>, UdsError> {
        let mut request = Vec::with_capacity(1 + payload.len());
        request.push(sid);
        request.extend_from_slice(payload);

        if self.config.step_by_step && !self.confirm.confirm(&request) {
            info!(service = format_args!("0x{sid:02X}"), "request declined");
            return Err(UdsError::Cancelled(sid));
        }

        let deadline = Instant::now() + self.config.pending_deadline();
        let mut timeout = timeout;
        loop {
            debug!(
                request = %hex::encode(&request),
                timeout_ms = timeout.as_millis() as u64,
                "sending"
            );
            let raw = self.transport.exchange(&request, timeout)?;
            debug!(reply = %hex::encode(&raw), "received");

            match Reply::from_raw(&raw)? {
                Reply::Negative(neg)
                    if neg.nrc == NegativeResponseCode::ResponsePending
                        && neg.service_id == sid =>
                {
                    if Instant::now() >= deadline {
                        return Err(UdsError::Timeout);
                    }
                    timeout = timeout.saturating_mul(2);
                    debug!(
                        timeout_ms = timeout.as_millis() as u64,
                        "response pending, waiting longer"
                    );
                }
                Reply::Negative(neg) => {
                    return Err(UdsError::NegativeResponse {
                        service_id: neg.service_id,
                        nrc: neg.nrc,
                    })
                }
                Reply::Positive(msg) => {
                    if msg.service_id != sid | REPLY_MASK {
                        return Err(UdsError::UnexpectedReply(format!(
                            "service 0x{:02X} answered with 0x{:02X}",
                            sid, msg.service_id
                        )));
                    }
                    return Ok(msg.payload);
                }
            }
        }
    }

    fn send_default(&self, sid: u8, payload: &[u8]) -> Result<Vec<u8>, UdsError> {
        self.send(sid, payload, self.config.default_timeout())
    }

    fn check_echo(&self, what: &str, sent: u8, echoed: Option<&u8>) -> Result<(), UdsError> {
        match echoed {
            Some(&e) if e == sent => Ok(()),
            Some(&e) => Err(UdsError::UnexpectedReply(format!(
                "{what} echo 0x{e:02X} does not match requested 0x{sent:02X}"
            ))),
            None => Err(UdsError::InvalidResponse(format!("reply lacks {what} echo"))),
        }
    }

    fn check_did_echo(&self, sent: u16, payload: &[u8]) -> Result<(), UdsError> {
        if payload.len() < did::ID_LEN {
            return Err(UdsError::InvalidResponse("reply lacks DID echo".into()));
        }
        let echoed = u16::from_be_bytes([payload[did::ID_OFFSET], payload[did::ID_OFFSET + 1]]);
        if echoed != sent {
            return Err(UdsError::UnexpectedReply(format!(
                "DID echo 0x{echoed:04X} does not match requested 0x{sent:04X}"
            )));
        }
        Ok(())
    }

    /// DiagnosticSessionControl (0x10). Returns the session parameter
    /// record that follows the echoed session type.
    pub fn diagnostic_session_control(&self, session: u8) -> Result<Vec<u8>, UdsError> {
        let payload = self.send_default(service_id::DIAGNOSTIC_SESSION_CONTROL, &[session])?;
        self.check_echo("session type", session, payload.get(dsc::TYPE_OFFSET))?;
        Ok(payload[dsc::PARAMETER_RECORD_OFFSET..].to_vec())
    }

    /// SecurityAccess (0x27) seed request. Returns the seed bytes.
    pub fn security_access_request_seed(&self, level: u8) -> Result<Vec<u8>, UdsError> {
        let payload = self.send_default(service_id::SECURITY_ACCESS, &[level])?;
        self.check_echo("security level", level, payload.get(sa::TYPE_OFFSET))?;
        Ok(payload[sa::SEED_OFFSET..].to_vec())
    }

    /// SecurityAccess (0x27) key submission. The key sub-function is always
    /// the seed level plus one.
    pub fn security_access_send_key(&self, level: u8, key: &[u8]) -> Result<(), UdsError> {
        let sub_function = level + 1;
        let mut request = vec![sub_function];
        request.extend_from_slice(key);
        let payload = self.send_default(service_id::SECURITY_ACCESS, &request)?;
        self.check_echo("security level", sub_function, payload.get(sa::TYPE_OFFSET))
    }

    /// Enter a session and, when the profile requires it, run the complete
    /// seed-key handshake for its security level.
    pub fn unlock(&self, profile: &SecurityProfile) -> Result<(), UdsError> {
        self.diagnostic_session_control(profile.session)?;
        if profile.level == 0 {
            return Ok(());
        }

        let algorithm = security::algorithm(profile.algorithm, &profile.key)?;
        let seed = self.security_access_request_seed(profile.level)?;
        if seed.iter().all(|&b| b == 0) {
            debug!(level = profile.level, "zero seed, security already unlocked");
            return Ok(());
        }
        let key = algorithm.compute(&seed)?;
        self.security_access_send_key(profile.level, &key)?;
        info!(
            session = profile.session,
            level = profile.level,
            "security access granted"
        );
        Ok(())
    }

    /// ReadDataByIdentifier (0x22). Returns the data record.
    pub fn read_data_by_id(&self, data_id: u16) -> Result<Vec<u8>, UdsError> {
        let payload = self.send_default(service_id::READ_DATA_BY_ID, &data_id.to_be_bytes())?;
        self.check_did_echo(data_id, &payload)?;
        Ok(payload[did::RECORD_OFFSET..].to_vec())
    }

    /// WriteDataByIdentifier (0x2E).
    pub fn write_data_by_id(&self, data_id: u16, data: &[u8]) -> Result<(), UdsError> {
        let mut request = data_id.to_be_bytes().to_vec();
        request.extend_from_slice(data);
        let payload = self.send_default(service_id::WRITE_DATA_BY_ID, &request)?;
        self.check_did_echo(data_id, &payload)
    }

    /// InputOutputControlByIdentifier (0x2F). Returns the control status
    /// record following the echoed DID.
    pub fn io_control_by_id(
        &self,
        data_id: u16,
        parameter: u8,
        state: &[u8],
    ) -> Result<Vec<u8>, UdsError> {
        let mut request = data_id.to_be_bytes().to_vec();
        request.push(parameter);
        request.extend_from_slice(state);
        let payload = self.send_default(service_id::IO_CONTROL_BY_ID, &request)?;
        self.check_did_echo(data_id, &payload)?;
        Ok(payload[did::RECORD_OFFSET..].to_vec())
    }

    /// ReadDTCInformation (0x19). Returns the report record following the
    /// echoed sub-function.
    pub fn read_dtc_info(&self, sub_function: u8, status_mask: u8) -> Result<Vec<u8>, UdsError> {
        let payload =
            self.send_default(service_id::READ_DTC_INFO, &[sub_function, status_mask])?;
        self.check_echo("report type", sub_function, payload.get(rdtci::TYPE_OFFSET))?;
        Ok(payload[rdtci::RECORD_OFFSET..].to_vec())
    }

    /// ClearDiagnosticInformation (0x14) for a 3-byte DTC group.
    pub fn clear_diagnostic_info(&self, group: u32) -> Result<(), UdsError> {
        let group_bytes = [
            (group >> 16) as u8,
            (group >> 8) as u8,
            group as u8,
        ];
        let payload = self.send_default(service_id::CLEAR_DIAGNOSTIC_INFO, &group_bytes)?;
        if payload.len() >= 3 && payload[..3] != group_bytes {
            return Err(UdsError::UnexpectedReply(format!(
                "group echo {} does not match requested {}",
                hex::encode(&payload[..3]),
                hex::encode(group_bytes)
            )));
        }
        Ok(())
    }

    /// CommunicationControl (0x28).
    pub fn communication_control(&self, control_type: u8, comm_type: u8) -> Result<(), UdsError> {
        let payload =
            self.send_default(service_id::COMMUNICATION_CONTROL, &[control_type, comm_type])?;
        self.check_echo("control type", control_type, payload.first())
    }

    /// ControlDTCSetting (0x85).
    pub fn control_dtc_setting(&self, action: u8) -> Result<(), UdsError> {
        let payload = self.send_default(service_id::CONTROL_DTC_SETTING, &[action])?;
        self.check_echo("DTC setting", action, payload.first())
    }

    /// ECUReset (0x11). Returns whatever follows the echoed reset type
    /// (e.g. a power-down time).
    pub fn ecu_reset(&self, reset: u8) -> Result<Vec<u8>, UdsError> {
        let payload = self.send_default(service_id::ECU_RESET, &[reset])?;
        self.check_echo("reset type", reset, payload.first())?;
        Ok(payload[1..].to_vec())
    }

    /// TesterPresent (0x3E).
    pub fn tester_present(&self) -> Result<(), UdsError> {
        let payload = self.send_default(service_id::TESTER_PRESENT, &[0x00])?;
        self.check_echo("sub-function", 0x00, payload.first())
    }

    /// RequestUpload (0x35). `address` and `size` carry the value and the
    /// number of bytes (1..=8) it occupies on the wire, big-endian.
    /// Returns the usable per-block payload limit (the ECU's
    /// maxNumberOfBlockLength minus the 2 bytes of service id and counter).
    pub fn request_upload(
        &self,
        address: (u64, u8),
        size: (u64, u8),
    ) -> Result<u64, UdsError> {
        let (addr, addr_width) = address;
        let (total, size_width) = size;
        assert!((1..=8).contains(&addr_width), "address width out of range");
        assert!((1..=8).contains(&size_width), "size width out of range");

        // dataFormatIdentifier 0x00: no compression, no encryption.
        let mut request = vec![0x00, (size_width << 4) | addr_width];
        request.extend_from_slice(&addr.to_be_bytes()[8 - addr_width as usize..]);
        request.extend_from_slice(&total.to_be_bytes()[8 - size_width as usize..]);

        let payload = self.send_default(service_id::REQUEST_UPLOAD, &request)?;
        let length_format = *payload.get(upload::LENGTH_FORMAT_OFFSET).ok_or_else(|| {
            UdsError::InvalidResponse("upload reply lacks length format identifier".into())
        })?;
        let width = (length_format >> 4) as usize;
        if width == 0 || payload.len() < upload::MAX_BLOCK_OFFSET + width {
            return Err(UdsError::InvalidResponse(format!(
                "upload reply lacks a {width}-byte max block length"
            )));
        }

        let mut max_block = 0u64;
        for &b in &payload[upload::MAX_BLOCK_OFFSET..upload::MAX_BLOCK_OFFSET + width] {
            max_block = (max_block << 8) | u64::from(b);
        }
        Ok(max_block.saturating_sub(2))
    }

    /// TransferData (0x36) for one block. Returns the block data after
    /// validating the echoed sequence counter.
    pub fn transfer_data(&self, counter: u8) -> Result<Vec<u8>, UdsError> {
        let payload = self.send_default(service_id::TRANSFER_DATA, &[counter])?;
        match payload.get(transfer::COUNTER_OFFSET) {
            Some(&echo) if echo == counter => Ok(payload[transfer::DATA_OFFSET..].to_vec()),
            Some(&echo) => Err(UdsError::Sequence(format!(
                "block counter echo 0x{echo:02X}, expected 0x{counter:02X}"
            ))),
            None => Err(UdsError::InvalidResponse(
                "transfer reply lacks block counter".into(),
            )),
        }
    }

    /// RequestTransferExit (0x37).
    pub fn request_transfer_exit(&self) -> Result<(), UdsError> {
        self.send_default(service_id::REQUEST_TRANSFER_EXIT, &[])?;
        Ok(())
    }

    /// Segmented memory upload: RequestUpload, then TransferData blocks
    /// with a wrapping one-byte sequence counter until `size.0` bytes have
    /// arrived, then RequestTransferExit.
    ///
    /// Any counter mismatch, oversize block or overrun past the requested
    /// size aborts the whole upload; there is no resume.
    pub fn upload(&self, address: (u64, u8), size: (u64, u8)) -> Result<Vec<u8>, UdsError> {
        let block_limit = self.request_upload(address, size)?;
        let total = size.0 as usize;
        info!(
            address = format_args!("0x{:X}", address.0),
            size = total,
            block_limit,
            "upload started"
        );

        let mut data = Vec::with_capacity(total);
        let mut counter: u8 = 1;
        while data.len() < total {
            let block = self.transfer_data(counter)?;
            if block.is_empty() {
                return Err(UdsError::Sequence(format!(
                    "empty transfer block 0x{counter:02X}"
                )));
            }
            if block.len() as u64 > block_limit {
                return Err(UdsError::Sequence(format!(
                    "block 0x{counter:02X} carries {} bytes, limit is {block_limit}",
                    block.len()
                )));
            }
            if data.len() + block.len() > total {
                return Err(UdsError::Sequence(format!(
                    "block 0x{counter:02X} overruns the requested {total} bytes"
                )));
            }
            data.extend_from_slice(&block);
            debug!(received = data.len(), total, "upload progress");
            counter = counter.wrapping_add(1);
        }

        self.request_transfer_exit()?;
        info!(size = data.len(), "upload complete");
        Ok(data)
    }
}
