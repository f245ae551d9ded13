//! DTC helpers for ReadDTCInformation (0x19) and ClearDiagnosticInformation
//! (0x14)

use serde::Serialize;

/// Sub-function codes for ReadDTCInformation (0x19).
pub mod sub_function {
    /// Report number of DTCs matching a status mask.
    pub const REPORT_NUMBER_OF_DTC_BY_STATUS_MASK: u8 = 0x01;
    /// Report DTCs matching a status mask.
    pub const REPORT_DTC_BY_STATUS_MASK: u8 = 0x02;
    /// Report supported DTCs.
    pub const REPORT_SUPPORTED_DTC: u8 = 0x0A;
}

/// DTC group addresses for ClearDiagnosticInformation (0x14).
pub mod dtc_group {
    /// All groups (clear everything).
    pub const ALL: u32 = 0xFFFFFF;
    pub const POWERTRAIN: u32 = 0x000000;
    pub const CHASSIS: u32 = 0x400000;
    pub const BODY: u32 = 0x800000;
    pub const NETWORK: u32 = 0xC00000;
}

/// Status byte bits per ISO 14229-1.
pub mod status_bit {
    pub const TEST_FAILED: u8 = 0x01;
    pub const PENDING_DTC: u8 = 0x04;
    pub const CONFIRMED_DTC: u8 = 0x08;

    /// Faults failing now or confirmed and stored.
    pub const ACTIVE_MASK: u8 = TEST_FAILED | CONFIRMED_DTC;
}

/// One trouble code with its status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Dtc {
    pub high: u8,
    pub mid: u8,
    pub low: u8,
    pub status: u8,
}

impl Dtc {
    pub fn new(high: u8, mid: u8, low: u8, status: u8) -> Self {
        Self {
            high,
            mid,
            low,
            status,
        }
    }

    /// SAE J2012 code string, e.g. `P0101` or `U0100`.
    pub fn code_string(&self) -> String {
        let prefix = match (self.high >> 6) & 0x03 {
            0 => 'P',
            1 => 'C',
            2 => 'B',
            _ => 'U',
        };
        format!(
            "{}{}{:01X}{:02X}",
            prefix,
            (self.high >> 4) & 0x03,
            self.high & 0x0F,
            self.mid
        )
    }

    pub fn is_active(&self) -> bool {
        self.status & status_bit::ACTIVE_MASK != 0
    }
}

/// Parse the record of a report-DTC-by-status-mask reply (the payload after
/// the echoed sub-function): `[availability_mask, (hi mid lo status)…]`.
/// A trailing partial record is ignored, as ECUs pad with nothing.
pub fn parse_status_mask_record(record: &[u8]) -> Option<(u8, Vec<Dtc>)> {
    let (&availability, rest) = record.split_first()?;
    let dtcs = rest
        .chunks_exact(4)
        .map(|c| Dtc::new(c[0], c[1], c[2], c[3]))
        .collect();
    Some((availability, dtcs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_string_per_category() {
        assert_eq!(Dtc::new(0x01, 0x01, 0x00, 0x00).code_string(), "P0101");
        assert_eq!(Dtc::new(0x44, 0x20, 0x00, 0x00).code_string(), "C0420");
        assert_eq!(Dtc::new(0x92, 0x34, 0x00, 0x00).code_string(), "B1234");
        assert_eq!(Dtc::new(0xC1, 0x00, 0x00, 0x00).code_string(), "U0100");
    }

    #[test]
    fn active_status() {
        assert!(Dtc::new(0, 0, 0, 0x09).is_active());
        assert!(!Dtc::new(0, 0, 0, 0x04).is_active());
    }

    #[test]
    fn parse_report_record() {
        let record = [0xFF, 0x01, 0x23, 0x45, 0x09, 0x06, 0x78, 0x90, 0x28];
        let (availability, dtcs) = parse_status_mask_record(&record).unwrap();
        assert_eq!(availability, 0xFF);
        assert_eq!(dtcs.len(), 2);
        assert_eq!(dtcs[0], Dtc::new(0x01, 0x23, 0x45, 0x09));
        assert!(dtcs[0].is_active());
    }

    #[test]
    fn empty_record_rejected() {
        assert!(parse_status_mask_record(&[]).is_none());
    }
}
