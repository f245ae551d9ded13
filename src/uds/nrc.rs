//! Negative response codes (ISO 14229-1)

use std::fmt;

/// NRC byte of a negative response.
///
/// Only [`ResponsePending`](Self::ResponsePending) is ever absorbed by the
/// engine; every other code terminates the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NegativeResponseCode {
    GeneralReject,
    ServiceNotSupported,
    SubFunctionNotSupported,
    IncorrectMessageLengthOrFormat,
    ResponseTooLong,
    BusyRepeatRequest,
    ConditionsNotCorrect,
    RequestSequenceError,
    RequestOutOfRange,
    SecurityAccessDenied,
    InvalidKey,
    ExceededNumberOfAttempts,
    RequiredTimeDelayNotExpired,
    UploadDownloadNotAccepted,
    TransferDataSuspended,
    GeneralProgrammingFailure,
    WrongBlockSequenceCounter,
    /// Request correctly received, response pending (RCRRP).
    ResponsePending,
    SubFunctionNotSupportedInActiveSession,
    ServiceNotSupportedInActiveSession,
    /// Reserved or manufacturer-specific code.
    Other(u8),
}

impl NegativeResponseCode {
    fn name(&self) -> &'static str {
        match self {
            Self::GeneralReject => "GeneralReject",
            Self::ServiceNotSupported => "ServiceNotSupported",
            Self::SubFunctionNotSupported => "SubFunctionNotSupported",
            Self::IncorrectMessageLengthOrFormat => "IncorrectMessageLengthOrFormat",
            Self::ResponseTooLong => "ResponseTooLong",
            Self::BusyRepeatRequest => "BusyRepeatRequest",
            Self::ConditionsNotCorrect => "ConditionsNotCorrect",
            Self::RequestSequenceError => "RequestSequenceError",
            Self::RequestOutOfRange => "RequestOutOfRange",
            Self::SecurityAccessDenied => "SecurityAccessDenied",
            Self::InvalidKey => "InvalidKey",
            Self::ExceededNumberOfAttempts => "ExceededNumberOfAttempts",
            Self::RequiredTimeDelayNotExpired => "RequiredTimeDelayNotExpired",
            Self::UploadDownloadNotAccepted => "UploadDownloadNotAccepted",
            Self::TransferDataSuspended => "TransferDataSuspended",
            Self::GeneralProgrammingFailure => "GeneralProgrammingFailure",
            Self::WrongBlockSequenceCounter => "WrongBlockSequenceCounter",
            Self::ResponsePending => "ResponsePending",
            Self::SubFunctionNotSupportedInActiveSession => {
                "SubFunctionNotSupportedInActiveSession"
            }
            Self::ServiceNotSupportedInActiveSession => "ServiceNotSupportedInActiveSession",
            Self::Other(_) => "Other",
        }
    }
}

impl From<u8> for NegativeResponseCode {
    fn from(value: u8) -> Self {
        match value {
            0x10 => Self::GeneralReject,
            0x11 => Self::ServiceNotSupported,
            0x12 => Self::SubFunctionNotSupported,
            0x13 => Self::IncorrectMessageLengthOrFormat,
            0x14 => Self::ResponseTooLong,
            0x21 => Self::BusyRepeatRequest,
            0x22 => Self::ConditionsNotCorrect,
            0x24 => Self::RequestSequenceError,
            0x31 => Self::RequestOutOfRange,
            0x33 => Self::SecurityAccessDenied,
            0x35 => Self::InvalidKey,
            0x36 => Self::ExceededNumberOfAttempts,
            0x37 => Self::RequiredTimeDelayNotExpired,
            0x70 => Self::UploadDownloadNotAccepted,
            0x71 => Self::TransferDataSuspended,
            0x72 => Self::GeneralProgrammingFailure,
            0x73 => Self::WrongBlockSequenceCounter,
            0x78 => Self::ResponsePending,
            0x7E => Self::SubFunctionNotSupportedInActiveSession,
            0x7F => Self::ServiceNotSupportedInActiveSession,
            other => Self::Other(other),
        }
    }
}

impl From<NegativeResponseCode> for u8 {
    fn from(nrc: NegativeResponseCode) -> Self {
        use NegativeResponseCode::*;
        match nrc {
            GeneralReject => 0x10,
            ServiceNotSupported => 0x11,
            SubFunctionNotSupported => 0x12,
            IncorrectMessageLengthOrFormat => 0x13,
            ResponseTooLong => 0x14,
            BusyRepeatRequest => 0x21,
            ConditionsNotCorrect => 0x22,
            RequestSequenceError => 0x24,
            RequestOutOfRange => 0x31,
            SecurityAccessDenied => 0x33,
            InvalidKey => 0x35,
            ExceededNumberOfAttempts => 0x36,
            RequiredTimeDelayNotExpired => 0x37,
            UploadDownloadNotAccepted => 0x70,
            TransferDataSuspended => 0x71,
            GeneralProgrammingFailure => 0x72,
            WrongBlockSequenceCounter => 0x73,
            ResponsePending => 0x78,
            SubFunctionNotSupportedInActiveSession => 0x7E,
            ServiceNotSupportedInActiveSession => 0x7F,
            Other(v) => v,
        }
    }
}

impl fmt::UpperHex for NegativeResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::UpperHex::fmt(&u8::from(*self), f)
    }
}

impl fmt::Display for NegativeResponseCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Other(v) => write!(f, "Other(0x{v:02X})"),
            named => f.write_str(named.name()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_round_trip() {
        for byte in 0x00..=0xFFu8 {
            let nrc = NegativeResponseCode::from(byte);
            assert_eq!(u8::from(nrc), byte);
        }
    }

    #[test]
    fn pending_code_is_0x78() {
        assert_eq!(
            NegativeResponseCode::from(0x78),
            NegativeResponseCode::ResponsePending
        );
    }

    #[test]
    fn display_names() {
        assert_eq!(
            NegativeResponseCode::SecurityAccessDenied.to_string(),
            "SecurityAccessDenied"
        );
        assert_eq!(
            NegativeResponseCode::Other(0x93).to_string(),
            "Other(0x93)"
        );
    }
}
