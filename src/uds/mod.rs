//! UDS (ISO 14229) protocol layer
//!
//! Service id and sub-function constants, the request/reply message model,
//! and the session client that drives validated exchanges over a transport.

pub mod dtc;

mod client;
mod error;
mod message;
mod nrc;

pub use client::{AutoConfirm, ConfirmPolicy, UdsClient};
pub use error::UdsError;
pub use message::{Message, NegativeResponse, Reply};
pub use nrc::NegativeResponseCode;

/// OR'd into the request service id to form the positive-reply service id.
pub const REPLY_MASK: u8 = 0x40;

/// UDS service ids used by this engine.
pub mod service_id {
    pub const DIAGNOSTIC_SESSION_CONTROL: u8 = 0x10;
    pub const ECU_RESET: u8 = 0x11;
    pub const CLEAR_DIAGNOSTIC_INFO: u8 = 0x14;
    pub const READ_DTC_INFO: u8 = 0x19;
    pub const READ_DATA_BY_ID: u8 = 0x22;
    pub const SECURITY_ACCESS: u8 = 0x27;
    pub const COMMUNICATION_CONTROL: u8 = 0x28;
    pub const WRITE_DATA_BY_ID: u8 = 0x2E;
    pub const IO_CONTROL_BY_ID: u8 = 0x2F;
    pub const REQUEST_UPLOAD: u8 = 0x35;
    pub const TRANSFER_DATA: u8 = 0x36;
    pub const REQUEST_TRANSFER_EXIT: u8 = 0x37;
    pub const TESTER_PRESENT: u8 = 0x3E;
    pub const CONTROL_DTC_SETTING: u8 = 0x85;
    /// First byte of a negative response frame.
    pub const NEGATIVE_RESPONSE: u8 = 0x7F;
}

/// DiagnosticSessionControl (0x10) session types.
pub mod session_type {
    pub const DEFAULT: u8 = 0x01;
    pub const PROGRAMMING: u8 = 0x02;
    pub const EXTENDED_DIAGNOSTIC: u8 = 0x03;
}

/// SecurityAccess (0x27) seed-request sub-function levels.
///
/// Odd values request a seed; the matching key submission is always
/// `level + 1`.
pub mod security_level {
    /// Programming-session seed request.
    pub const SEED: u8 = 0x01;
    /// Extended-session seed request (configuration / I/O control).
    pub const SEED_2: u8 = 0x03;
}

/// ECUReset (0x11) reset types.
pub mod reset_type {
    pub const HARD_RESET: u8 = 0x01;
    pub const KEY_OFF_ON_RESET: u8 = 0x02;
    pub const SOFT_RESET: u8 = 0x03;
}

/// CommunicationControl (0x28) control types.
pub mod comm_control {
    pub const ENABLE_RX_AND_TX: u8 = 0x00;
    pub const ENABLE_RX_DISABLE_TX: u8 = 0x01;
    pub const DISABLE_RX_ENABLE_TX: u8 = 0x02;
    pub const DISABLE_RX_AND_TX: u8 = 0x03;

    /// communicationType byte: normal application messages.
    pub const COMM_TYPE_NORMAL: u8 = 0x01;
}

/// ControlDTCSetting (0x85) actions.
pub mod dtc_setting {
    pub const ON: u8 = 0x01;
    pub const OFF: u8 = 0x02;
}

/// InputOutputControlByIdentifier (0x2F) control parameters.
pub mod io_control_param {
    pub const RETURN_CONTROL_TO_ECU: u8 = 0x00;
    pub const RESET_TO_DEFAULT: u8 = 0x01;
    pub const FREEZE_CURRENT_STATE: u8 = 0x02;
    pub const SHORT_TERM_ADJUSTMENT: u8 = 0x03;
}

/// Reply payload layouts, payload-relative byte offsets per service.
///
/// One named constant per field replaces offset arithmetic at call sites;
/// multi-byte fields are big-endian.
pub mod layout {
    /// DiagnosticSessionControl reply: `[session_type, parameter_record…]`.
    pub mod dsc {
        pub const TYPE_OFFSET: usize = 0;
        pub const PARAMETER_RECORD_OFFSET: usize = 1;
    }

    /// SecurityAccess reply: `[level, seed_or_nothing…]`.
    pub mod sa {
        pub const TYPE_OFFSET: usize = 0;
        pub const SEED_OFFSET: usize = 1;
    }

    /// Read/WriteDataByIdentifier reply: `[did_hi, did_lo, record…]`.
    pub mod did {
        pub const ID_OFFSET: usize = 0;
        pub const ID_LEN: usize = 2;
        pub const RECORD_OFFSET: usize = 2;
    }

    /// ReadDTCInformation reply: `[sub_function, record…]`.
    pub mod rdtci {
        pub const TYPE_OFFSET: usize = 0;
        pub const RECORD_OFFSET: usize = 1;
    }

    /// RequestUpload reply: `[length_format_id, max_block_len…]`.
    pub mod upload {
        pub const LENGTH_FORMAT_OFFSET: usize = 0;
        pub const MAX_BLOCK_OFFSET: usize = 1;
    }

    /// TransferData reply: `[sequence_counter, data…]`.
    pub mod transfer {
        pub const COUNTER_OFFSET: usize = 0;
        pub const DATA_OFFSET: usize = 1;
    }
}
